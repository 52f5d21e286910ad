// Seeded in-memory credential backend for demos and tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{AuthProvider, Identity, MockBackendConfig, MockUser};

use super::backend::{BackendError, CredentialBackend};

/// Per-operation call counts, snapshotted for assertions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_existing_session: usize,
    pub sign_in_with_password: usize,
    pub sign_up: usize,
    pub start_provider_auth: usize,
    pub send_otp: usize,
    pub verify_otp: usize,
    pub sign_out: usize,
}

#[derive(Default)]
struct CallCounters {
    get_existing_session: AtomicUsize,
    sign_in_with_password: AtomicUsize,
    sign_up: AtomicUsize,
    start_provider_auth: AtomicUsize,
    send_otp: AtomicUsize,
    verify_otp: AtomicUsize,
    sign_out: AtomicUsize,
}

/// Mock credential backend.
///
/// Authenticates the seeded users (any password works, matching the
/// development semantics of a stub identity source), accepts one
/// configured OTP code, and remembers the active session so that
/// `get_existing_session` behaves like a real remote session store.
pub struct MockCredentialBackend {
    config: MockBackendConfig,
    users: RwLock<Vec<MockUser>>,
    active_session: RwLock<Option<Identity>>,
    fail_sign_out: AtomicBool,
    calls: CallCounters,
}

impl MockCredentialBackend {
    pub fn new(config: MockBackendConfig) -> Self {
        let users = config.users.clone();
        Self {
            config,
            users: RwLock::new(users),
            active_session: RwLock::new(None),
            fail_sign_out: AtomicBool::new(false),
            calls: CallCounters::default(),
        }
    }

    /// Make subsequent `sign_out` calls fail with a connection error
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of how many times each operation was invoked
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get_existing_session: self.calls.get_existing_session.load(Ordering::SeqCst),
            sign_in_with_password: self.calls.sign_in_with_password.load(Ordering::SeqCst),
            sign_up: self.calls.sign_up.load(Ordering::SeqCst),
            start_provider_auth: self.calls.start_provider_auth.load(Ordering::SeqCst),
            send_otp: self.calls.send_otp.load(Ordering::SeqCst),
            verify_otp: self.calls.verify_otp.load(Ordering::SeqCst),
            sign_out: self.calls.sign_out.load(Ordering::SeqCst),
        }
    }

    /// Seed a remote session, as if the user signed in on a previous run
    pub async fn set_existing_session(&self, identity: Identity) {
        *self.active_session.write().await = Some(identity);
    }

    async fn simulate_latency(&self) {
        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn identity_for(user: &MockUser, provider: AuthProvider) -> Identity {
        Identity {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: Identity::display_name_for(user.name.as_deref(), &user.email),
            profile_image_url: user.profile_image_url.clone(),
            phone: user.phone.clone(),
            provider,
            created_at: Utc::now(),
        }
    }

    async fn remember_session(&self, identity: &Identity) {
        *self.active_session.write().await = Some(identity.clone());
    }
}

#[async_trait]
impl CredentialBackend for MockCredentialBackend {
    async fn get_existing_session(&self) -> Result<Option<Identity>, BackendError> {
        self.calls
            .get_existing_session
            .fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.active_session.read().await.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, BackendError> {
        self.calls
            .sign_in_with_password
            .fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let users = self.users.read().await;
        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or_else(|| BackendError::Rejected("Invalid login credentials".to_string()))?;

        let identity = Self::identity_for(user, AuthProvider::Email);
        drop(users);
        self.remember_session(&identity).await;
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<Identity, BackendError> {
        self.calls.sign_up.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(BackendError::Rejected(
                "A user with this email address has already been registered".to_string(),
            ));
        }

        let user = MockUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: Some(name.to_string()),
            phone: None,
            profile_image_url: None,
        };
        let identity = Self::identity_for(&user, AuthProvider::Email);
        users.push(user);
        drop(users);

        self.remember_session(&identity).await;
        Ok(identity)
    }

    async fn start_provider_auth(
        &self,
        provider: AuthProvider,
    ) -> Result<Identity, BackendError> {
        self.calls
            .start_provider_auth
            .fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let identity = Identity {
            id: format!("mock-{}-user", provider),
            email: format!("user@{}.example", provider),
            display_name: format!("{} User", capitalize(provider.as_str())),
            profile_image_url: None,
            phone: None,
            provider,
            created_at: Utc::now(),
        };
        self.remember_session(&identity).await;
        Ok(identity)
    }

    async fn send_otp(&self, phone: &str) -> Result<(), BackendError> {
        self.calls.send_otp.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        debug!("mock backend: dispatching OTP to {}", phone);
        Ok(())
    }

    async fn verify_otp(&self, phone: &str, code: &str) -> Result<Identity, BackendError> {
        self.calls.verify_otp.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if code != self.config.accepted_otp_code {
            return Err(BackendError::Rejected(
                "Token has expired or is invalid".to_string(),
            ));
        }

        let users = self.users.read().await;
        let identity = match users.iter().find(|u| u.phone.as_deref() == Some(phone)) {
            Some(user) => Self::identity_for(user, AuthProvider::Phone),
            None => Identity {
                id: uuid::Uuid::new_v4().to_string(),
                email: format!("{}@phone.local", phone),
                display_name: "Phone User".to_string(),
                profile_image_url: None,
                phone: Some(phone.to_string()),
                provider: AuthProvider::Phone,
                created_at: Utc::now(),
            },
        };
        drop(users);

        self.remember_session(&identity).await;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.calls.sign_out.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(BackendError::ConnectionError(
                "mock backend unreachable".to_string(),
            ));
        }

        *self.active_session.write().await = None;
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_backend() -> MockCredentialBackend {
        MockCredentialBackend::new(MockBackendConfig {
            users: vec![MockUser {
                id: "user-1".to_string(),
                email: "chef@example.com".to_string(),
                name: Some("Chef".to_string()),
                phone: Some("+15551234567".to_string()),
                profile_image_url: None,
            }],
            accepted_otp_code: "000000".to_string(),
            latency_ms: None,
        })
    }

    #[tokio::test]
    async fn test_password_sign_in_for_seeded_user() {
        let backend = seeded_backend();

        let identity = backend
            .sign_in_with_password("chef@example.com", "any-password")
            .await
            .unwrap();

        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.display_name, "Chef");
        assert_eq!(identity.provider, AuthProvider::Email);
    }

    #[tokio::test]
    async fn test_unknown_email_is_rejected() {
        let backend = seeded_backend();

        let result = backend
            .sign_in_with_password("stranger@example.com", "pw")
            .await;

        assert!(matches!(result, Err(BackendError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email() {
        let backend = seeded_backend();

        let result = backend.sign_up("chef@example.com", "pw", "Chef").await;
        assert!(matches!(result, Err(BackendError::Rejected(_))));

        let identity = backend
            .sign_up("new@example.com", "pw", "Newcomer")
            .await
            .unwrap();
        assert_eq!(identity.display_name, "Newcomer");
    }

    #[tokio::test]
    async fn test_session_is_remembered_until_sign_out() {
        let backend = seeded_backend();
        assert!(backend.get_existing_session().await.unwrap().is_none());

        backend
            .sign_in_with_password("chef@example.com", "pw")
            .await
            .unwrap();
        assert!(backend.get_existing_session().await.unwrap().is_some());

        backend.sign_out().await.unwrap();
        assert!(backend.get_existing_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_otp_verification() {
        let backend = seeded_backend();

        backend.send_otp("+15551234567").await.unwrap();

        let wrong = backend.verify_otp("+15551234567", "111111").await;
        assert!(matches!(wrong, Err(BackendError::Rejected(_))));

        let identity = backend.verify_otp("+15551234567", "000000").await.unwrap();
        assert_eq!(identity.id, "user-1");
        assert_eq!(identity.provider, AuthProvider::Phone);

        // Unseeded phones still verify, with a synthesized identity
        let identity = backend.verify_otp("+19998887777", "000000").await.unwrap();
        assert_eq!(identity.email, "+19998887777@phone.local");
    }

    #[tokio::test]
    async fn test_call_counters() {
        let backend = seeded_backend();

        backend
            .sign_in_with_password("chef@example.com", "pw")
            .await
            .unwrap();
        backend.send_otp("+15551234567").await.unwrap();
        backend.send_otp("+15551234567").await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.sign_in_with_password, 1);
        assert_eq!(calls.send_otp, 2);
        assert_eq!(calls.verify_otp, 0);
    }

    #[tokio::test]
    async fn test_failing_sign_out() {
        let backend = seeded_backend();
        backend.set_fail_sign_out(true);

        let result = backend.sign_out().await;
        assert!(matches!(result, Err(BackendError::ConnectionError(_))));
    }
}
