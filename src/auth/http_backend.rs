// Remote credential backend over HTTP
// Speaks a GoTrue-style REST surface: password grant, signup, OTP
// dispatch/verify, provider token grant, logout. All vendor payloads are
// parsed into typed structs here; the session manager never sees them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{AuthProvider, HttpBackendConfig, Identity};

use super::backend::{BackendError, CredentialBackend};

pub struct HttpCredentialBackend {
    config: HttpBackendConfig,
    client: reqwest::Client,
    /// Bearer token for the active remote session
    access_token: RwLock<Option<String>>,
}

/// User record as the credential service returns it
#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: RemoteUserMetadata,
    #[serde(default)]
    app_metadata: RemoteAppMetadata,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteUserMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteAppMetadata {
    #[serde(default)]
    provider: Option<String>,
}

/// Token-bearing response from grant and verify endpoints
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: RemoteUser,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error_description", alias = "msg", alias = "message")]
    error: Option<String>,
}

impl HttpCredentialBackend {
    pub fn new(config: HttpBackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            config,
            client,
            access_token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_transport_error(err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::ConnectionError(err.to_string())
        }
    }

    /// Translate a non-success response into a typed rejection
    async fn rejection(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.unwrap_or_default(),
            Err(_) => String::new(),
        };

        if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
            return BackendError::Timeout;
        }
        if status.is_server_error() {
            return BackendError::ConnectionError(format!(
                "credential service returned {}",
                status
            ));
        }

        BackendError::Rejected(message)
    }

    fn map_remote_user(user: RemoteUser, fallback_provider: AuthProvider) -> Identity {
        let email = user.email.unwrap_or_default();
        let provider = user
            .app_metadata
            .provider
            .as_deref()
            .and_then(AuthProvider::parse)
            .unwrap_or(fallback_provider);

        Identity {
            id: user.id,
            display_name: Identity::display_name_for(user.user_metadata.name.as_deref(), &email),
            email,
            profile_image_url: user.user_metadata.avatar_url,
            phone: user.phone,
            provider,
            created_at: user.created_at,
        }
    }

    async fn post_for_token(
        &self,
        path: &str,
        body: serde_json::Value,
        fallback_provider: AuthProvider,
    ) -> Result<Identity, BackendError> {
        let response = self
            .client
            .post(self.url(path))
            .header("apikey", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::ProtocolError(e.to_string()))?;

        *self.access_token.write().await = Some(token.access_token);
        Ok(Self::map_remote_user(token.user, fallback_provider))
    }
}

#[async_trait]
impl CredentialBackend for HttpCredentialBackend {
    async fn get_existing_session(&self) -> Result<Option<Identity>, BackendError> {
        let token = match self.access_token.read().await.clone() {
            Some(token) => token,
            None => return Ok(None),
        };

        let response = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Remote session expired; forget the stale token
            *self.access_token.write().await = None;
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let user: RemoteUser = response
            .json()
            .await
            .map_err(|e| BackendError::ProtocolError(e.to_string()))?;

        Ok(Some(Self::map_remote_user(user, AuthProvider::Email)))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, BackendError> {
        debug!("password sign-in for {}", email);
        self.post_for_token(
            "token?grant_type=password",
            json!({ "email": email, "password": password }),
            AuthProvider::Email,
        )
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, BackendError> {
        debug!("signup for {}", email);
        self.post_for_token(
            "signup",
            json!({
                "email": email,
                "password": password,
                "data": { "name": name }
            }),
            AuthProvider::Email,
        )
        .await
    }

    async fn start_provider_auth(
        &self,
        provider: AuthProvider,
    ) -> Result<Identity, BackendError> {
        debug!("provider token grant via {}", provider);
        self.post_for_token(
            "token?grant_type=provider",
            json!({ "provider": provider.as_str() }),
            provider,
        )
        .await
    }

    async fn send_otp(&self, phone: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("otp"))
            .header("apikey", &self.config.api_key)
            .json(&json!({ "phone": phone }))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn verify_otp(&self, phone: &str, code: &str) -> Result<Identity, BackendError> {
        self.post_for_token(
            "verify",
            json!({ "type": "sms", "phone": phone, "token": code }),
            AuthProvider::Phone,
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.access_token.write().await.take();
        let token = match token {
            Some(token) => token,
            // Nothing to revoke remotely
            None => return Ok(()),
        };

        let response = self
            .client
            .post(self.url("logout"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            warn!("logout returned {}", response.status());
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}
