// HTTP surface over the session manager
// One route per session operation; errors map to JSON bodies with the
// status code the error kind dictates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthError;
use crate::models::{
    AuthProvider, IdentityResponse, PhoneSendRequest, PhoneVerifyRequest, SignInRequest,
    SignUpRequest,
};
use crate::session::{SessionManager, SessionSnapshot};

type HandlerError = (StatusCode, Json<Value>);

fn auth_error(error: AuthError) -> HandlerError {
    (
        error.status_code(),
        Json(json!({ "error": error.to_string() })),
    )
}

/// Current session snapshot
pub async fn get_session(
    State(manager): State<Arc<SessionManager>>,
) -> Json<SessionSnapshot> {
    Json(manager.snapshot())
}

pub async fn register(
    State(manager): State<Arc<SessionManager>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<IdentityResponse>, HandlerError> {
    info!("registration request for {}", payload.email);

    let identity = manager
        .sign_up_with_email(&payload.email, &payload.password, &payload.name)
        .await
        .map_err(auth_error)?;

    Ok(Json(identity.into()))
}

pub async fn login(
    State(manager): State<Arc<SessionManager>>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<IdentityResponse>, HandlerError> {
    info!("login request for {}", payload.email);

    let identity = manager
        .sign_in_with_password(&payload.email, &payload.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(identity.into()))
}

pub async fn provider_login(
    State(manager): State<Arc<SessionManager>>,
    Path(provider): Path<String>,
) -> Result<Json<IdentityResponse>, HandlerError> {
    let provider = AuthProvider::parse(&provider)
        .filter(|p| p.is_third_party())
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Unknown provider '{}'", provider) })),
            )
        })?;

    info!("provider login via {}", provider);

    let identity = manager
        .sign_in_with_provider(provider)
        .await
        .map_err(auth_error)?;

    Ok(Json(identity.into()))
}

pub async fn send_phone_code(
    State(manager): State<Arc<SessionManager>>,
    Json(payload): Json<PhoneSendRequest>,
) -> Result<StatusCode, HandlerError> {
    manager
        .send_phone_verification(&payload.phone)
        .await
        .map_err(auth_error)?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn verify_phone_code(
    State(manager): State<Arc<SessionManager>>,
    Json(payload): Json<PhoneVerifyRequest>,
) -> Result<Json<IdentityResponse>, HandlerError> {
    let identity = manager
        .verify_phone_code(&payload.phone, &payload.code)
        .await
        .map_err(auth_error)?;

    Ok(Json(identity.into()))
}

pub async fn logout(State(manager): State<Arc<SessionManager>>) -> StatusCode {
    manager.sign_out().await;
    StatusCode::NO_CONTENT
}
