use crate::models::AppConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Arc<AppConfig>, String> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    let config: AppConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse YAML config: {}", e))?;

    config.validate()?;

    info!(
        "Configuration loaded: backend={}, providers=[{}]",
        match &config.auth.backend {
            crate::models::BackendConfig::None => "none",
            crate::models::BackendConfig::Mock(_) => "mock",
            crate::models::BackendConfig::Http(_) => "http",
        },
        configured_providers(&config).join(", ")
    );

    Ok(Arc::new(config))
}

fn configured_providers(config: &AppConfig) -> Vec<&'static str> {
    let providers = &config.auth.providers;
    let mut names = Vec::new();
    if providers.google.is_some() {
        names.push("google");
    }
    if providers.apple.is_some() {
        names.push("apple");
    }
    if providers.twitter.is_some() {
        names.push("twitter");
    }
    names
}

/// Load configuration with fallback options
pub fn load_config_with_fallback() -> Result<Arc<AppConfig>, String> {
    // Try loading from environment variable first
    if let Ok(config_path) = std::env::var("CONFIG_PATH") {
        match load_config(&config_path) {
            Ok(config) => return Ok(config),
            Err(e) => warn!(
                "Failed to load config from CONFIG_PATH ({}): {}",
                config_path, e
            ),
        }
    }

    // Try common config file locations
    let paths = vec!["config.yaml", "config.yml", "./config.yaml", "./config.yml"];

    for path in paths {
        if Path::new(path).exists() {
            match load_config(path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from '{}': {}", path, e),
            }
        }
    }

    Err(
        "No configuration file found. Please create a config.yaml file or set CONFIG_PATH \
         environment variable. See config.example.yaml for an example configuration."
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthProvider, BackendConfig, PersistenceConfig};

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
auth:
  backend:
    type: http
    base_url: "https://auth.example.com/v1"
    api_key: "service-key"
  providers:
    google:
      client_id: "google-client-id"
    twitter:
      client_id: "twitter-client-id"
persistence:
  type: file
  path: "/tmp/snapchef-session.json"
server:
  bind: "127.0.0.1:4810"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert!(matches!(config.auth.backend, BackendConfig::Http(_)));
        assert_eq!(
            config.auth.providers.client_id(AuthProvider::Google),
            Some("google-client-id")
        );
        assert_eq!(config.auth.providers.client_id(AuthProvider::Apple), None);
        assert!(matches!(
            config.persistence,
            PersistenceConfig::File { .. }
        ));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert!(matches!(config.auth.backend, BackendConfig::None));
        assert!(config.auth.providers.google.is_none());
    }

    #[test]
    fn test_parse_mock_backend_config() {
        let yaml = r#"
auth:
  backend:
    type: mock
    users:
      - id: "user-1"
        email: "chef@example.com"
        name: "Chef"
    accepted_otp_code: "000000"
persistence:
  type: memory
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        match &config.auth.backend {
            BackendConfig::Mock(mock) => {
                assert_eq!(mock.users.len(), 1);
                assert_eq!(mock.accepted_otp_code, "000000");
            }
            other => panic!("expected mock backend, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let yaml = r#"
auth:
  backend:
    type: http
    base_url: ""
    api_key: "key"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
