//! Session store against the mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use kasra_core::GroupId;
use kasra_integration_tests::{EMAIL, MockBackend, PASSWORD, TAKEN_EMAIL, TOKEN};
use kasra_storefront::session::{AuthError, SessionState};
use kasra_storefront::storage::{KeyValueStore, MemoryStore, keys};

#[tokio::test]
async fn test_login_loads_profile_roles_and_groups() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    state.session().login(EMAIL, PASSWORD).await.unwrap();

    let session = state.session().session();
    assert_eq!(session.state, SessionState::Authenticated);
    let user = session.user.as_ref().unwrap();
    assert_eq!(user.id.as_u32(), 7);
    assert_eq!(user.username, "sara");
    assert_eq!(session.roles, vec!["admin".to_string()]);
    assert!(session.is_admin());
    assert_eq!(session.group_ids(), vec![GroupId::new(2), GroupId::new(1)]);
    assert!(state.session().has_token());
}

#[tokio::test]
async fn test_login_normalizes_email_case() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    state
        .session()
        .login("  Sara@Example.COM ", PASSWORD)
        .await
        .unwrap();
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let err = state.session().login(EMAIL, "nope").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(!state.session().is_authenticated());
    assert!(!state.session().has_token());
}

#[tokio::test]
async fn test_register_signs_in() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    state
        .session()
        .register("sara", "new@example.com", PASSWORD)
        .await
        .unwrap();
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn test_register_conflict_surfaces_backend_message() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let err = state
        .session()
        .register("sara", TAKEN_EMAIL, PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Api {
            status: 409,
            message: "Email already exists".to_string(),
        }
    );
    assert!(!state.session().has_token());
}

#[tokio::test]
async fn test_hydrate_restores_session_after_restart() {
    let backend = MockBackend::start().await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let first = backend.app_state_with(Arc::clone(&store));
    first.session().login(EMAIL, PASSWORD).await.unwrap();

    let second = backend.app_state_with(store);
    assert_eq!(second.session().session().state, SessionState::Anonymous);
    second.session().hydrate().await.unwrap();
    assert!(second.session().is_authenticated());
    assert!(second.session().is_admin());
}

#[tokio::test]
async fn test_refresh_unauthorized_clears_token_and_user() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    state.session().login(EMAIL, PASSWORD).await.unwrap();
    assert!(state.session().user().is_some());

    backend.state().revoked.store(true, Ordering::SeqCst);
    let err = state.session().refresh_profile().await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert!(!state.session().is_authenticated());
    assert!(state.session().user().is_none());
    assert!(!state.session().has_token());
}

#[tokio::test]
async fn test_hydrate_with_stale_token_ends_anonymous() {
    let backend = MockBackend::start().await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, "expired").unwrap();

    let state = backend.app_state_with(Arc::clone(&store));
    let err = state.session().hydrate().await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(state.session().session().state, SessionState::Anonymous);
    assert_eq!(store.get(keys::TOKEN).unwrap(), None);
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let backend = MockBackend::start().await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = backend.app_state_with(Arc::clone(&store));
    state.session().login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some(TOKEN));

    state.session().logout();

    assert!(!state.session().is_authenticated());
    assert_eq!(store.get(keys::TOKEN).unwrap(), None);
    let err = state.api().get_wallet().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_logout_during_refresh_stays_signed_out() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    state.session().login(EMAIL, PASSWORD).await.unwrap();

    backend.state().hold_profile.store(true, Ordering::SeqCst);
    let refreshing = {
        let state = state.clone();
        tokio::spawn(async move { state.session().refresh_profile().await })
    };
    backend.state().profile_requested.notified().await;

    state.session().logout();
    backend.state().release_profile.notify_one();

    let err = refreshing.await.unwrap().unwrap_err();
    assert_eq!(err, AuthError::MissingToken);
    assert!(!state.session().is_authenticated());
    assert!(state.session().user().is_none());
    assert!(!state.session().has_token());
}
