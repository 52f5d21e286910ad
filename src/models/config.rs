use serde::{Deserialize, Serialize};

use super::identity::AuthProvider;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Authentication configuration (backend + provider credentials)
    #[serde(default)]
    pub auth: AuthConfig,
    /// Local identity persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// HTTP agent settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            persistence: PersistenceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let BackendConfig::Http(http) = &self.auth.backend {
            if http.base_url.trim().is_empty() {
                return Err("http backend requires a non-empty base_url".to_string());
            }
            if http.api_key.trim().is_empty() {
                return Err("http backend requires a non-empty api_key".to_string());
            }
        }

        for (name, provider) in [
            ("google", &self.auth.providers.google),
            ("apple", &self.auth.providers.apple),
            ("twitter", &self.auth.providers.twitter),
        ] {
            if let Some(credentials) = provider {
                if credentials.client_id.trim().is_empty() {
                    return Err(format!(
                        "provider '{}' is configured with an empty client_id",
                        name
                    ));
                }
            }
        }

        if let PersistenceConfig::File { path } = &self.persistence {
            if path.trim().is_empty() {
                return Err("file persistence requires a non-empty path".to_string());
            }
        }

        Ok(())
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Credential backend; `none` runs the agent in offline demo mode
    #[serde(default)]
    pub backend: BackendConfig,
    /// Third-party provider credentials; absence gates the provider flow
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Selectable credential backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// No backend configured; sign-in falls back to deterministic
    /// mock identities. Development only.
    None,
    /// Seeded in-memory backend for demos and tests
    Mock(MockBackendConfig),
    /// Remote credential service over HTTP
    Http(HttpBackendConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::None
    }
}

/// Configuration for the HTTP credential backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    /// Base URL of the credential service (e.g. "https://auth.example.com/v1")
    pub base_url: String,
    /// Service API key, sent on every request
    pub api_key: String,
    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

/// Configuration for the seeded mock backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockBackendConfig {
    /// Users the mock will authenticate
    #[serde(default)]
    pub users: Vec<MockUser>,
    /// The one-time code the mock accepts for phone verification
    #[serde(default = "default_accepted_otp")]
    pub accepted_otp_code: String,
    /// Artificial latency per call, for exercising in-flight state
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            accepted_otp_code: default_accepted_otp(),
            latency_ms: None,
        }
    }
}

fn default_accepted_otp() -> String {
    "000000".to_string()
}

/// A user seeded into the mock backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Third-party provider credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub google: Option<ProviderCredentials>,
    pub apple: Option<ProviderCredentials>,
    pub twitter: Option<ProviderCredentials>,
}

impl ProvidersConfig {
    /// Client ID for a provider, if configured
    pub fn client_id(&self, provider: AuthProvider) -> Option<&str> {
        let credentials = match provider {
            AuthProvider::Google => self.google.as_ref(),
            AuthProvider::Apple => self.apple.as_ref(),
            AuthProvider::Twitter => self.twitter.as_ref(),
            AuthProvider::Email | AuthProvider::Phone => None,
        };
        credentials.map(|c| c.client_id.as_str())
    }
}

/// OAuth-style client credentials for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
}

/// Local identity persistence backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PersistenceConfig {
    /// JSON record on disk, surviving process restarts
    File { path: String },
    /// In-memory only; identity is lost on restart
    Memory,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig::File {
            path: "snapchef-session.json".to_string(),
        }
    }
}

/// HTTP agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1:4810 — the agent is a localhost sidecar)
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:4810".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(config.auth.backend, BackendConfig::None));
    }

    #[test]
    fn test_http_backend_requires_base_url() {
        let mut config = AppConfig::default();
        config.auth.backend = BackendConfig::Http(HttpBackendConfig {
            base_url: "".to_string(),
            api_key: "key".to_string(),
            request_timeout_secs: 10,
        });

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("base_url"));
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let mut config = AppConfig::default();
        config.auth.providers.google = Some(ProviderCredentials {
            client_id: "  ".to_string(),
        });

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("google"));
    }

    #[test]
    fn test_provider_client_id_lookup() {
        let mut providers = ProvidersConfig::default();
        providers.google = Some(ProviderCredentials {
            client_id: "google-client".to_string(),
        });

        assert_eq!(
            providers.client_id(AuthProvider::Google),
            Some("google-client")
        );
        assert_eq!(providers.client_id(AuthProvider::Apple), None);
        // Email and phone flows never carry client credentials
        assert_eq!(providers.client_id(AuthProvider::Email), None);
        assert_eq!(providers.client_id(AuthProvider::Phone), None);
    }
}
