//! End-to-end session flows through the store runtime.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use eventos_app::auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState};
use eventos_data::backend::{AuthUser, IdentityProvider};
use eventos_data::mocks::{MemoryBlobStorage, MemoryDocumentStore, MemoryIdentityProvider};
use eventos_data::repository::USERS;
use eventos_data::{AuthRepository, BackendConfig, UserId};
use eventos_runtime::Store;
use eventos_testing::{init_test_tracing, test_clock};
use std::sync::Arc;
use std::time::Duration;

type AuthStore = Store<
    AuthState,
    AuthAction,
    AuthEnvironment<MemoryIdentityProvider, MemoryDocumentStore, MemoryBlobStorage>,
    AuthReducer<MemoryIdentityProvider, MemoryDocumentStore, MemoryBlobStorage>,
>;

struct Harness {
    store: AuthStore,
    identity: MemoryIdentityProvider,
    documents: MemoryDocumentStore,
}

fn harness(identity: MemoryIdentityProvider) -> Harness {
    init_test_tracing();
    let documents = MemoryDocumentStore::new();
    let clock = Arc::new(test_clock());
    let repository = AuthRepository::new(
        identity.clone(),
        documents.clone(),
        MemoryBlobStorage::default(),
        clock.clone(),
        BackendConfig::default().with_profile_write_timeout(Duration::from_millis(100)),
    );
    let store = Store::new(
        AuthState::default(),
        AuthReducer::new(),
        AuthEnvironment::new(repository, clock),
    );
    Harness {
        store,
        identity,
        documents,
    }
}

impl Harness {
    async fn run(&self, action: AuthAction) -> AuthState {
        self.store.send(action).await.unwrap().wait().await;
        self.store.state(Clone::clone).await
    }
}

fn sign_up(name: &str) -> AuthAction {
    AuthAction::SignUpWithEmail {
        email: "ana@example.com".to_string(),
        password: "secret123".to_string(),
        name: name.to_string(),
    }
}

#[tokio::test]
async fn sign_up_loads_stored_profile() {
    let h = harness(MemoryIdentityProvider::new());
    let state = h.run(sign_up("Ana")).await;

    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.info_message.as_deref(), Some("Registration successful!"));
    assert_eq!(state.current_user.unwrap().name, "Ana");
    assert_eq!(h.documents.document_count(USERS).unwrap(), 1);
}

#[tokio::test]
async fn sign_up_survives_profile_write_failure() {
    let h = harness(MemoryIdentityProvider::new());
    h.documents.fail_collection(USERS, "PERMISSION_DENIED");

    let state = h.run(sign_up("Ana")).await;

    assert!(state.is_authenticated);
    assert!(state.error_message.is_none());
    // Fallback profile built from the provider's display name.
    assert_eq!(state.current_user.unwrap().name, "Ana");
}

#[tokio::test]
async fn sign_up_survives_slow_profile_write() {
    let h = harness(MemoryIdentityProvider::new());
    h.documents.delay_writes(USERS, Duration::from_secs(10));

    let state = h.run(sign_up("Ana")).await;

    assert!(state.is_authenticated);
    assert_eq!(state.info_message.as_deref(), Some("Registration successful!"));
}

#[tokio::test]
async fn duplicate_sign_up_reports_provider_error() {
    let identity = MemoryIdentityProvider::new()
        .with_account("ana@example.com", "secret123", Some("Ana"))
        .unwrap();
    let h = harness(identity);

    let state = h.run(sign_up("Ana")).await;

    assert!(!state.is_authenticated);
    assert!(state.error_message.unwrap().contains("already in use"));
}

#[tokio::test]
async fn sign_in_with_wrong_password() {
    let identity = MemoryIdentityProvider::new()
        .with_account("ana@example.com", "secret123", Some("Ana"))
        .unwrap();
    let h = harness(identity);

    let state = h
        .run(AuthAction::SignInWithEmail {
            email: "ana@example.com".into(),
            password: "wrong".into(),
        })
        .await;

    assert!(!state.is_authenticated);
    assert!(state.error_message.is_some());
}

#[tokio::test]
async fn sign_in_without_profile_document_uses_provider_user() {
    let identity = MemoryIdentityProvider::new()
        .with_account("ana@example.com", "secret123", None)
        .unwrap();
    let h = harness(identity);

    let state = h
        .run(AuthAction::SignInWithEmail {
            email: "ana@example.com".into(),
            password: "secret123".into(),
        })
        .await;

    let user = state.current_user.unwrap();
    assert_eq!(user.name, "User");
    assert_eq!(user.email, "ana@example.com");
}

#[tokio::test]
async fn federated_sign_in_creates_profile() {
    let google_user = AuthUser {
        uid: UserId::new("google-42"),
        email: Some("gabe@example.com".into()),
        display_name: Some("Gabe".into()),
        photo_url: Some("https://example.com/gabe.png".into()),
    };
    let identity = MemoryIdentityProvider::new()
        .with_federated_token("id-token", google_user)
        .unwrap();
    let h = harness(identity);

    let state = h
        .run(AuthAction::SignInWithFederatedToken {
            id_token: "id-token".into(),
        })
        .await;

    assert!(state.is_authenticated);
    let user = state.current_user.unwrap();
    assert_eq!(user.name, "Gabe");
    assert_eq!(user.photo_url.as_deref(), Some("https://example.com/gabe.png"));
    assert_eq!(h.documents.document_count(USERS).unwrap(), 1);
}

#[tokio::test]
async fn profile_update_creates_missing_document() {
    let identity = MemoryIdentityProvider::new();
    identity
        .create_user_with_email("ana@example.com", "secret123")
        .await
        .unwrap();
    let h = harness(identity);

    h.run(AuthAction::CheckSession).await;
    assert_eq!(h.documents.document_count(USERS).unwrap(), 0);

    let state = h
        .run(AuthAction::UpdateProfile {
            name: Some("Ana María".into()),
            photo: Some(vec![0xFF, 0xD8]),
        })
        .await;

    let user = state.current_user.unwrap();
    assert_eq!(user.name, "Ana María");
    assert!(user.photo_url.unwrap().contains("profile_images/"));
    assert_eq!(state.info_message.as_deref(), Some("Profile updated successfully"));
    assert_eq!(h.documents.document_count(USERS).unwrap(), 1);
}

#[tokio::test]
async fn password_change_and_sign_out() {
    let h = harness(MemoryIdentityProvider::new());
    h.run(sign_up("Ana")).await;

    let state = h
        .run(AuthAction::UpdatePassword {
            new_password: "new-secret".into(),
        })
        .await;
    assert_eq!(state.info_message.as_deref(), Some("Password updated successfully"));
    assert_eq!(h.identity.password_of("ana@example.com").as_deref(), Some("new-secret"));

    let state = h.run(AuthAction::SignOut).await;
    assert_eq!(state, AuthState::default());
    assert!(h.identity.current_user().is_none());
}
