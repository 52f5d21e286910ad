// Credential backend capability boundary
// The session manager only ever sees typed results from this trait; vendor
// payload parsing stays inside the backend implementations.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::{AuthProvider, BackendConfig, Identity};

use super::http_backend::HttpCredentialBackend;
use super::mock_backend::MockCredentialBackend;

/// External service performing actual authentication
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// Existing remote session, if the backend still holds one
    async fn get_existing_session(&self) -> Result<Option<Identity>, BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, BackendError>;

    /// Run the provider's interactive OAuth-style flow to completion
    async fn start_provider_auth(&self, provider: AuthProvider)
        -> Result<Identity, BackendError>;

    async fn send_otp(&self, phone: &str) -> Result<(), BackendError>;

    async fn verify_otp(&self, phone: &str, code: &str) -> Result<Identity, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Failures at the credential backend boundary
#[derive(Debug, Clone)]
pub enum BackendError {
    /// The backend rejected the credentials, code, or request
    Rejected(String),
    /// The user abandoned an interactive flow
    Cancelled,
    ConnectionError(String),
    /// The backend answered with a payload we could not interpret
    ProtocolError(String),
    Timeout,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            BackendError::Cancelled => write!(f, "Flow cancelled by user"),
            BackendError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            BackendError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
            BackendError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// Message suitable for surfacing to callers
    pub fn message(&self) -> String {
        match self {
            BackendError::Rejected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Create the configured credential backend.
///
/// Returns `None` when no backend is configured; the session manager then
/// runs with local mock fallbacks only.
pub fn create_credential_backend(config: &BackendConfig) -> Option<Arc<dyn CredentialBackend>> {
    match config {
        BackendConfig::None => None,
        BackendConfig::Mock(mock_config) => {
            Some(Arc::new(MockCredentialBackend::new(mock_config.clone())))
        }
        BackendConfig::Http(http_config) => {
            Some(Arc::new(HttpCredentialBackend::new(http_config.clone())))
        }
    }
}
