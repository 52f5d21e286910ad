use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Method used to establish an identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
    Apple,
    Twitter,
    Phone,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
            AuthProvider::Apple => "apple",
            AuthProvider::Twitter => "twitter",
            AuthProvider::Phone => "phone",
        }
    }

    /// Parse a provider name as it appears in config keys and URL paths
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "email" => Some(AuthProvider::Email),
            "google" => Some(AuthProvider::Google),
            "apple" => Some(AuthProvider::Apple),
            "twitter" => Some(AuthProvider::Twitter),
            "phone" => Some(AuthProvider::Phone),
            _ => None,
        }
    }

    /// Whether this provider uses an interactive third-party OAuth flow
    pub fn is_third_party(&self) -> bool {
        matches!(
            self,
            AuthProvider::Google | AuthProvider::Apple | AuthProvider::Twitter
        )
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated user record held by the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Stable per-backend unique identifier; non-empty, immutable
    pub id: String,
    /// May be synthesized for non-email flows (e.g. "<phone>@phone.local")
    pub email: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub phone: Option<String>,
    /// Set exactly once at creation
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Display name fallback chain: explicit name, email local-part, "User"
    pub fn display_name_for(name: Option<&str>, email: &str) -> String {
        match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => email
                .split('@')
                .next()
                .filter(|part| !part.is_empty())
                .unwrap_or("User")
                .to_string(),
        }
    }
}
