// Typed authentication failures surfaced to callers

use axum::http::StatusCode;

use crate::models::AuthProvider;

/// Every way an authentication operation can fail.
///
/// Each variant renders a non-empty human-readable message even when the
/// backend supplied none; callers present the message as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Provider has no client credentials configured; no network call was made
    NotConfigured(AuthProvider),
    InvalidCredentials,
    SignupFailed(String),
    InvalidCode,
    /// Verification attempted for a phone with no pending OTP dispatch
    NoPendingVerification,
    SmsFailed(String),
    /// The user cancelled an interactive provider flow
    Cancelled,
    ProviderFailed(AuthProvider, String),
    /// Saving, loading, or clearing the local identity record failed
    Persistence(String),
    Timeout,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured(_) => StatusCode::PRECONDITION_FAILED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::SignupFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCode => StatusCode::UNAUTHORIZED,
            AuthError::NoPendingVerification => StatusCode::CONFLICT,
            AuthError::SmsFailed(_) => StatusCode::BAD_GATEWAY,
            AuthError::Cancelled => StatusCode::BAD_REQUEST,
            AuthError::ProviderFailed(_, _) => StatusCode::BAD_GATEWAY,
            AuthError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// Substitute default text when the backend gave an empty message
fn message_or(message: &str, fallback: &'static str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotConfigured(provider) => write!(
                f,
                "{} sign-in is not configured; add a client ID for it",
                provider
            ),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::SignupFailed(msg) => write!(
                f,
                "{}",
                message_or(msg, "Failed to create account. Please try again.")
            ),
            AuthError::InvalidCode => write!(f, "Invalid verification code"),
            AuthError::NoPendingVerification => {
                write!(f, "No verification code was requested for this phone number")
            }
            AuthError::SmsFailed(msg) => write!(
                f,
                "{}",
                message_or(msg, "Failed to send verification code")
            ),
            AuthError::Cancelled => write!(f, "Sign-in was cancelled"),
            AuthError::ProviderFailed(provider, msg) => {
                let fallback = format!("Failed to sign in with {}", provider);
                let msg = msg.trim();
                if msg.is_empty() {
                    write!(f, "{}", fallback)
                } else {
                    write!(f, "{}", msg)
                }
            }
            AuthError::Persistence(msg) => write!(
                f,
                "{}",
                message_or(msg, "Failed to save session data")
            ),
            AuthError::Timeout => write!(f, "The authentication service did not respond in time"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_has_a_nonempty_message() {
        let errors = vec![
            AuthError::NotConfigured(AuthProvider::Google),
            AuthError::InvalidCredentials,
            AuthError::SignupFailed(String::new()),
            AuthError::InvalidCode,
            AuthError::NoPendingVerification,
            AuthError::SmsFailed(String::new()),
            AuthError::Cancelled,
            AuthError::ProviderFailed(AuthProvider::Twitter, String::new()),
            AuthError::Persistence(String::new()),
            AuthError::Timeout,
        ];

        for error in errors {
            assert!(!error.to_string().trim().is_empty(), "{:?}", error);
        }
    }

    #[test]
    fn test_backend_message_is_carried_through() {
        let error = AuthError::SignupFailed("email already registered".to_string());
        assert_eq!(error.to_string(), "email already registered");

        let error = AuthError::ProviderFailed(AuthProvider::Google, "consent denied".to_string());
        assert_eq!(error.to_string(), "consent denied");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::NotConfigured(AuthProvider::Google).status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::NoPendingVerification.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AuthError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }
}
