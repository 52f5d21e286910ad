use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapchef_auth::config;
use snapchef_auth::handlers;
use snapchef_auth::models::AppConfig;
use snapchef_auth::session::SessionManager;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapchef_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load agent configuration
    let app_config = match config::load_config_with_fallback() {
        Ok(config) => {
            tracing::info!("✓ Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::warn!(
                "⚠ {}. Running in offline demo mode: no credential backend, \
                 no provider credentials, default persistence.",
                e
            );
            Arc::new(AppConfig::default())
        }
    };

    // Build the session manager and restore any previous session
    let manager = Arc::new(SessionManager::from_config(&app_config));
    manager.subscribe(|identity| match identity {
        Some(identity) => tracing::info!(
            "auth state changed: signed in as {} via {}",
            identity.id,
            identity.provider
        ),
        None => tracing::info!("auth state changed: signed out"),
    });
    manager.initialize().await;

    // Build the agent routes
    let app = Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/session", get(handlers::auth::get_session))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route(
            "/api/v1/auth/provider/:provider",
            post(handlers::auth::provider_login),
        )
        .route(
            "/api/v1/auth/phone/send",
            post(handlers::auth::send_phone_code),
        )
        .route(
            "/api/v1/auth/phone/verify",
            post(handlers::auth::verify_phone_code),
        )
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .with_state(manager)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Run the agent
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 4810)));

    tracing::info!("🚀 Starting SnapChef auth agent on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
