// Session manager: reconciles every credential flow into one session

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::auth::backend::{BackendError, CredentialBackend};
use crate::auth::{create_credential_backend, AuthError};
use crate::models::{AppConfig, AuthProvider, Identity, ProvidersConfig};
use crate::persistence::{create_identity_store, IdentityStore};

use super::types::{
    SessionSnapshot, SessionState, SubscriberCallback, SubscriberHandle, SubscriberRegistry,
};

/// Owns the current authenticated identity and mediates every sign-in,
/// sign-up and sign-out flow.
///
/// Constructed once at process start and shared by reference; state is
/// mutated only from within its own operation bodies. The state lock is
/// held for synchronous sections only, never across a backend or
/// persistence await — two overlapping operations therefore interleave
/// and the last one to complete wins, which callers must expect.
pub struct SessionManager {
    backend: Option<Arc<dyn CredentialBackend>>,
    store: Arc<dyn IdentityStore>,
    providers: ProvidersConfig,
    state: Mutex<SessionState>,
    subscribers: Mutex<SubscriberRegistry>,
    initialized: AtomicBool,
}

impl SessionManager {
    pub fn new(
        backend: Option<Arc<dyn CredentialBackend>>,
        store: Arc<dyn IdentityStore>,
        providers: ProvidersConfig,
    ) -> Self {
        Self {
            backend,
            store,
            providers,
            state: Mutex::new(SessionState::default()),
            subscribers: Mutex::new(SubscriberRegistry::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Build the manager from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let backend = create_credential_backend(&config.auth.backend);
        if backend.is_none() {
            warn!("no credential backend configured; sign-in will use local mock identities");
        }
        let store = create_identity_store(&config.persistence);
        Self::new(backend, store, config.auth.providers.clone())
    }

    /// Restore the session: backend session first, then the locally
    /// persisted identity. Idempotent per process lifetime; always ends in
    /// a ready state and fires exactly one notification, identity or not.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("session already initialized; ignoring repeat call");
            return;
        }

        self.set_loading(true);
        let mut resolved: Option<Identity> = None;

        if let Some(backend) = &self.backend {
            match backend.get_existing_session().await {
                Ok(Some(identity)) => {
                    info!("restored remote session for {}", identity.id);
                    resolved = Some(identity);
                }
                Ok(None) => debug!("no remote session"),
                Err(e) => warn!("remote session lookup failed: {}", e),
            }
        }

        if resolved.is_none() {
            match self.store.load().await {
                Ok(Some(identity)) => {
                    info!("restored persisted identity {}", identity.id);
                    resolved = Some(identity);
                }
                Ok(None) => debug!("no persisted identity"),
                Err(e) => warn!("could not read persisted identity: {}", e),
            }
        }

        {
            let mut state = self.state.lock().unwrap();
            state.current_identity = resolved;
            state.is_loading = false;
        }
        self.notify();
    }

    /// Synchronous snapshot of the authenticated identity
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.lock().unwrap().current_identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().unwrap();
        SessionSnapshot {
            identity: state.current_identity.clone(),
            is_loading: state.is_loading,
            pending_phone_verification: state.pending_phone_verification.clone(),
        }
    }

    /// Register a state-change subscriber. The callback is invoked
    /// immediately with the current identity, then once per change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberHandle
    where
        F: Fn(Option<Identity>) + Send + Sync + 'static,
    {
        let callback: SubscriberCallback = Arc::new(callback);
        let handle = self.subscribers.lock().unwrap().add(callback.clone());
        callback(self.current_identity());
        handle
    }

    pub fn unsubscribe(&self, handle: SubscriberHandle) -> bool {
        self.subscribers.lock().unwrap().remove(handle)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.set_loading(true);
        let result = match &self.backend {
            Some(backend) => backend
                .sign_in_with_password(email, password)
                .await
                .map_err(|e| match e {
                    BackendError::Timeout => AuthError::Timeout,
                    _ => AuthError::InvalidCredentials,
                }),
            None => Ok(Self::mock_email_identity(email, None)),
        };
        self.finish_sign_in(result).await
    }

    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, AuthError> {
        self.set_loading(true);
        let result = match &self.backend {
            Some(backend) => {
                backend
                    .sign_up(email, password, name)
                    .await
                    .map_err(|e| match e {
                        BackendError::Timeout => AuthError::Timeout,
                        other => AuthError::SignupFailed(other.message()),
                    })
            }
            None => Ok(Self::mock_email_identity(email, Some(name))),
        };
        self.finish_sign_in(result).await
    }

    /// Sign in through a third-party provider. Requires a configured
    /// client ID; without one the backend is never contacted.
    pub async fn sign_in_with_provider(
        &self,
        provider: AuthProvider,
    ) -> Result<Identity, AuthError> {
        if self.providers.client_id(provider).is_none() {
            return Err(AuthError::NotConfigured(provider));
        }

        self.set_loading(true);
        let result = match &self.backend {
            Some(backend) => {
                backend
                    .start_provider_auth(provider)
                    .await
                    .map_err(|e| match e {
                        BackendError::Cancelled => AuthError::Cancelled,
                        BackendError::Timeout => AuthError::Timeout,
                        other => AuthError::ProviderFailed(provider, other.message()),
                    })
            }
            None => Ok(Self::mock_provider_identity(provider)),
        };
        self.finish_sign_in(result).await
    }

    /// Dispatch a one-time code. A side-channel operation: it does not
    /// touch the identity and so does not toggle the loading flag.
    pub async fn send_phone_verification(&self, phone: &str) -> Result<(), AuthError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AuthError::SmsFailed("A phone number is required".to_string()));
        }

        match &self.backend {
            Some(backend) => backend.send_otp(phone).await.map_err(|e| match e {
                BackendError::Timeout => AuthError::Timeout,
                other => AuthError::SmsFailed(other.message()),
            })?,
            None => info!("no credential backend; simulating SMS dispatch to {}", phone),
        }

        // A new dispatch replaces any previously pending number
        self.state.lock().unwrap().pending_phone_verification = Some(phone.to_string());
        Ok(())
    }

    /// Verify the one-time code for the pending phone number. A phone
    /// other than the pending one is rejected before any backend call.
    pub async fn verify_phone_code(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Identity, AuthError> {
        {
            let state = self.state.lock().unwrap();
            if state.pending_phone_verification.as_deref() != Some(phone) {
                return Err(AuthError::NoPendingVerification);
            }
        }

        self.set_loading(true);
        let result = match &self.backend {
            Some(backend) => backend.verify_otp(phone, code).await.map_err(|e| match e {
                BackendError::Timeout => AuthError::Timeout,
                _ => AuthError::InvalidCode,
            }),
            None => Ok(Self::mock_phone_identity(phone)),
        };

        if result.is_ok() {
            self.state.lock().unwrap().pending_phone_verification = None;
        }
        self.finish_sign_in(result).await
    }

    /// Sign out. Backend and persistence failures are logged and
    /// swallowed: leaving the caller signed in after asking to sign out
    /// is the worse failure mode.
    pub async fn sign_out(&self) {
        self.set_loading(true);

        if let Some(backend) = &self.backend {
            if let Err(e) = backend.sign_out().await {
                warn!("backend sign-out failed: {}", e);
            }
        }
        if let Err(e) = self.store.clear().await {
            warn!("could not clear persisted identity: {}", e);
        }

        {
            let mut state = self.state.lock().unwrap();
            state.current_identity = None;
            state.pending_phone_verification = None;
            state.is_loading = false;
        }
        info!("signed out");
        self.notify();
    }

    /// Persist and adopt the identity a flow produced, or restore a
    /// consistent ready state on failure. The loading flag is cleared in
    /// every path before control returns and before subscribers fire.
    async fn finish_sign_in(
        &self,
        result: Result<Identity, AuthError>,
    ) -> Result<Identity, AuthError> {
        let identity = match result {
            Ok(identity) => identity,
            Err(e) => {
                self.set_loading(false);
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&identity).await {
            warn!("could not persist identity {}: {}", identity.id, e);
            self.set_loading(false);
            return Err(AuthError::Persistence(e.to_string()));
        }

        {
            let mut state = self.state.lock().unwrap();
            state.current_identity = Some(identity.clone());
            state.is_loading = false;
        }
        info!("signed in as {} via {}", identity.id, identity.provider);
        self.notify();
        Ok(identity)
    }

    fn set_loading(&self, loading: bool) {
        self.state.lock().unwrap().is_loading = loading;
    }

    /// Deliver the current identity to every subscriber, outside all locks
    fn notify(&self) {
        let identity = self.current_identity();
        let callbacks = self.subscribers.lock().unwrap().callbacks();
        for callback in callbacks {
            callback(identity.clone());
        }
    }

    /// Deterministic identity for offline email sign-in: the id is the
    /// hex SHA-256 of the email. Predictable by construction; a
    /// development convenience, not a security mechanism.
    fn mock_email_identity(email: &str, name: Option<&str>) -> Identity {
        Identity {
            id: hex::encode(Sha256::digest(email.as_bytes())),
            email: email.to_string(),
            display_name: Identity::display_name_for(name, email),
            profile_image_url: None,
            phone: None,
            provider: AuthProvider::Email,
            created_at: chrono::Utc::now(),
        }
    }

    fn mock_provider_identity(provider: AuthProvider) -> Identity {
        let display_name = match provider {
            AuthProvider::Google => "Google User",
            AuthProvider::Apple => "Apple User",
            AuthProvider::Twitter => "Twitter User",
            _ => "User",
        };
        Identity {
            id: format!("{}_{}", provider, uuid::Uuid::new_v4().simple()),
            display_name: display_name.to_string(),
            email: format!("user@{}.example", provider),
            profile_image_url: None,
            phone: None,
            provider,
            created_at: chrono::Utc::now(),
        }
    }

    fn mock_phone_identity(phone: &str) -> Identity {
        Identity {
            id: hex::encode(Sha256::digest(phone.as_bytes())),
            email: format!("{}@phone.local", phone),
            display_name: "Phone User".to_string(),
            profile_image_url: None,
            phone: Some(phone.to_string()),
            provider: AuthProvider::Phone,
            created_at: chrono::Utc::now(),
        }
    }
}
