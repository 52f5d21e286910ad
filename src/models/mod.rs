pub mod api;
pub mod config;
pub mod identity;

pub use api::{
    IdentityResponse, PhoneSendRequest, PhoneVerifyRequest, SignInRequest, SignUpRequest,
};
pub use config::{
    AppConfig, AuthConfig, BackendConfig, HttpBackendConfig, MockBackendConfig, MockUser,
    PersistenceConfig, ProviderCredentials, ProvidersConfig, ServerConfig,
};
pub use identity::{AuthProvider, Identity};
