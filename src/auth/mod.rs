pub mod backend;
pub mod error;
pub mod http_backend;
pub mod mock_backend;

pub use backend::{create_credential_backend, BackendError, CredentialBackend};
pub use error::AuthError;
pub use http_backend::HttpCredentialBackend;
pub use mock_backend::{CallCounts, MockCredentialBackend};
