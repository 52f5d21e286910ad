use snapchef_auth::auth::{AuthError, CredentialBackend, MockCredentialBackend};
use snapchef_auth::models::{
    AuthProvider, MockBackendConfig, MockUser, ProviderCredentials, ProvidersConfig,
};
use snapchef_auth::persistence::memory::MemoryIdentityStore;
use snapchef_auth::persistence::IdentityStore;
use snapchef_auth::session::SessionManager;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn seeded_config() -> MockBackendConfig {
    MockBackendConfig {
        users: vec![MockUser {
            id: "user-1".to_string(),
            email: "chef@example.com".to_string(),
            name: Some("Chef".to_string()),
            phone: Some("+15551234567".to_string()),
            profile_image_url: None,
        }],
        accepted_otp_code: "000000".to_string(),
        latency_ms: None,
    }
}

/// Full lifecycle against the mock backend: restore, sign in, phone flow,
/// sign out — asserting the notification stream along the way.
#[tokio::test]
async fn test_full_session_lifecycle() {
    let backend = Arc::new(MockCredentialBackend::new(seeded_config()));
    let store = Arc::new(MemoryIdentityStore::new());
    let manager = Arc::new(SessionManager::new(
        Some(backend.clone() as Arc<dyn CredentialBackend>),
        store.clone() as Arc<dyn IdentityStore>,
        ProvidersConfig::default(),
    ));

    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    manager.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    notifications.store(0, Ordering::SeqCst);

    // Nothing to restore
    manager.initialize().await;
    assert!(manager.current_identity().is_none());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    // Password sign-in adopts and persists
    let identity = manager
        .sign_in_with_password("chef@example.com", "any-password")
        .await
        .unwrap();
    assert_eq!(identity.id, "user-1");
    assert_eq!(store.load().await.unwrap().unwrap().id, "user-1");
    assert_eq!(notifications.load(Ordering::SeqCst), 2);

    // Phone flow replaces the identity wholesale
    manager
        .send_phone_verification("+15551234567")
        .await
        .unwrap();
    let phone_identity = manager
        .verify_phone_code("+15551234567", "000000")
        .await
        .unwrap();
    assert_eq!(phone_identity.provider, AuthProvider::Phone);
    assert_eq!(manager.current_identity().unwrap().id, phone_identity.id);
    assert_eq!(notifications.load(Ordering::SeqCst), 3);

    // Sign-out clears everything and still notifies
    manager.sign_out().await;
    assert!(manager.current_identity().is_none());
    assert!(store.load().await.unwrap().is_none());
    assert_eq!(notifications.load(Ordering::SeqCst), 4);
}

/// Restart simulation: a second manager over the same store restores the
/// identity the first one persisted, without a backend session.
#[tokio::test]
async fn test_identity_survives_restart_via_persistence() {
    let store = Arc::new(MemoryIdentityStore::new());

    let first = SessionManager::new(
        None,
        store.clone() as Arc<dyn IdentityStore>,
        ProvidersConfig::default(),
    );
    first
        .sign_in_with_password("chef@example.com", "pw")
        .await
        .unwrap();
    let persisted_id = first.current_identity().unwrap().id;

    // "Restart": fresh manager, same store
    let second = SessionManager::new(
        None,
        store as Arc<dyn IdentityStore>,
        ProvidersConfig::default(),
    );
    second.initialize().await;

    assert_eq!(second.current_identity().unwrap().id, persisted_id);
}

/// A remote session beats the locally persisted identity during restore.
#[tokio::test]
async fn test_remote_session_wins_on_initialize() {
    let backend = Arc::new(MockCredentialBackend::new(seeded_config()));
    let store = Arc::new(MemoryIdentityStore::new());

    // Remote and local disagree
    let remote = backend
        .sign_in_with_password("chef@example.com", "pw")
        .await
        .unwrap();
    let local = SessionManager::new(
        None,
        store.clone() as Arc<dyn IdentityStore>,
        ProvidersConfig::default(),
    );
    local
        .sign_in_with_password("someone-else@example.com", "pw")
        .await
        .unwrap();

    let manager = SessionManager::new(
        Some(backend as Arc<dyn CredentialBackend>),
        store as Arc<dyn IdentityStore>,
        ProvidersConfig::default(),
    );
    manager.initialize().await;

    assert_eq!(manager.current_identity().unwrap().id, remote.id);
}

/// Provider gating end to end: unconfigured rejects without backend
/// traffic, configured completes the flow.
#[tokio::test]
async fn test_provider_gating_and_flow() {
    let backend = Arc::new(MockCredentialBackend::new(seeded_config()));
    let store = Arc::new(MemoryIdentityStore::new());

    let providers = ProvidersConfig {
        google: Some(ProviderCredentials {
            client_id: "google-client".to_string(),
        }),
        apple: None,
        twitter: None,
    };
    let manager = SessionManager::new(
        Some(backend.clone() as Arc<dyn CredentialBackend>),
        store as Arc<dyn IdentityStore>,
        providers,
    );

    let rejected = manager.sign_in_with_provider(AuthProvider::Apple).await;
    assert_eq!(
        rejected.unwrap_err(),
        AuthError::NotConfigured(AuthProvider::Apple)
    );
    assert_eq!(backend.calls().start_provider_auth, 0);

    let identity = manager
        .sign_in_with_provider(AuthProvider::Google)
        .await
        .unwrap();
    assert_eq!(identity.provider, AuthProvider::Google);
    assert_eq!(backend.calls().start_provider_auth, 1);
}

/// Offline demo mode: every flow works without a backend and the email
/// fallback is stable across calls.
#[tokio::test]
async fn test_offline_demo_mode_flows() {
    let manager = SessionManager::new(
        None,
        Arc::new(MemoryIdentityStore::new()),
        ProvidersConfig::default(),
    );

    let first = manager
        .sign_in_with_password("chef@example.com", "x")
        .await
        .unwrap();
    let second = manager
        .sign_in_with_password("chef@example.com", "y")
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let signup = manager
        .sign_up_with_email("baker@example.com", "pw", "Baker")
        .await
        .unwrap();
    assert_eq!(signup.display_name, "Baker");

    manager
        .send_phone_verification("+15551234567")
        .await
        .unwrap();
    let phone = manager
        .verify_phone_code("+15551234567", "999999")
        .await
        .unwrap();
    assert_eq!(phone.email, "+15551234567@phone.local");

    manager.sign_out().await;
    assert!(manager.current_identity().is_none());
}
