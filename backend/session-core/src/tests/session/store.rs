// Store behavior that needs no identity endpoint. Network-backed flows live
// in integration_tests/session.

use crate::error::{RequestError, SessionError};
use crate::storage::MemoryTokenStorage;
use crate::{SessionStore, SessionStoreBuilder};

use common::BearerToken;
use models::{SessionSnapshot, SessionStatus};

use std::sync::{Arc, Mutex};

use reqwest::Method;

fn store_without_api(storage: MemoryTokenStorage) -> SessionStore {
    SessionStore::builder()
        .with_storage(storage)
        .build()
        .expect("store should build")
}

/// **VALUE**: Verifies the builder refuses to run without storage.
///
/// **BUG THIS CATCHES**: Would catch a store that silently never persists anything.
#[test]
fn given_no_storage_when_building_then_returns_build_error() {
    // GIVEN/WHEN: Building without storage
    let result = SessionStoreBuilder::default()
        .with_api_base_path("https://api.example")
        .build();

    // THEN: Build error
    assert!(matches!(result, Err(SessionError::Build { .. })));
}

/// **VALUE**: Verifies a fresh store starts in `loading` with no token.
#[test]
fn given_new_store_when_reading_then_state_is_loading() {
    // GIVEN/WHEN: A new store
    let store = store_without_api(MemoryTokenStorage::new());

    // THEN
    assert!(store.is_loading());
    assert!(store.token().is_none());
    assert!(!store.is_initialized());
    assert!(!store.is_authenticated_sync());
}

/// **VALUE**: Verifies validation fails closed when no API base path is configured.
///
/// **WHY THIS MATTERS**: A misconfigured deployment must never authenticate anyone.
///
/// **BUG THIS CATCHES**: Would catch treating "cannot validate" as "valid".
#[tokio::test]
async fn given_no_api_base_path_when_setting_token_then_status_is_invalid_token() {
    // GIVEN: A store with no API base path
    let storage = Arc::new(MemoryTokenStorage::with_token("old"));
    let store = SessionStore::builder()
        .with_shared_storage(storage.clone())
        .build()
        .expect("store should build");

    // WHEN: Offering a token
    store
        .set_token(BearerToken::new("candidate"), Some(String::from("https://host.example")))
        .await;

    // THEN: Rejected, persisted slot emptied, origin recorded
    assert!(store.has_invalid_token());
    assert!(store.token().is_none());
    assert_eq!(store.parent_origin().as_deref(), Some("https://host.example"));
    assert!(storage.peek().is_none());
}

/// **VALUE**: Verifies clear always lands on `unauthenticated` and empties storage.
#[tokio::test]
async fn given_any_state_when_clearing_then_unauthenticated_without_origin() {
    // GIVEN: A store that recorded an origin during a rejected push
    let storage = Arc::new(MemoryTokenStorage::new());
    let store = SessionStore::builder()
        .with_shared_storage(storage.clone())
        .build()
        .expect("store should build");
    store
        .set_token(BearerToken::new("t"), Some(String::from("https://host.example")))
        .await;

    // WHEN: Clearing
    store.clear_auth();

    // THEN
    assert_eq!(store.snapshot(), SessionSnapshot::unauthenticated());
    assert!(store.has_no_token());
    assert!(storage.peek().is_none());
}

/// **VALUE**: Verifies refresh is a no-op without a token.
///
/// **BUG THIS CATCHES**: Would catch refresh demoting `unauthenticated` to `invalid_token`.
#[tokio::test]
async fn given_no_token_when_refreshing_then_returns_false_and_state_is_untouched() {
    // GIVEN: An initialized store with nothing persisted
    let store = store_without_api(MemoryTokenStorage::new());
    store.initialize().await;
    let before = store.snapshot();

    // WHEN: Refreshing
    let refreshed = store.refresh_auth().await;

    // THEN
    assert!(!refreshed);
    assert_eq!(store.snapshot(), before);
}

/// **VALUE**: Verifies subscribers get an immediate replay and then only real changes.
///
/// **WHY THIS MATTERS**: Consumers render from the replay; duplicate notifications cause churn.
///
/// **BUG THIS CATCHES**: Would catch a missing replay or notifying on no-op commits.
#[tokio::test]
async fn given_subscriber_when_state_changes_then_receives_replay_and_changes_only() {
    // GIVEN: A subscriber on a fresh store
    let store = store_without_api(MemoryTokenStorage::new());
    let seen: Arc<Mutex<Vec<SessionStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store.subscribe(move |snapshot| {
        sink.lock().expect("sink lock").push(snapshot.status);
    });

    // WHEN: Initializing, then clearing twice (second clear changes nothing)
    store.initialize().await;
    store.clear_auth();
    store.clear_auth();

    // THEN: Replay (loading), then the settled status once
    let seen = seen.lock().expect("sink lock").clone();
    assert_eq!(seen, vec![SessionStatus::Loading, SessionStatus::Unauthenticated]);
}

#[tokio::test]
async fn given_dropped_subscription_when_state_changes_then_listener_is_not_called() {
    // GIVEN: A subscription that is released right away
    let store = store_without_api(MemoryTokenStorage::new());
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let subscription = store.subscribe(move |_| *counter.lock().expect("counter lock") += 1);
    assert_eq!(store.subscriber_count(), 1);
    subscription.unsubscribe();

    // WHEN: The state changes
    store.initialize().await;

    // THEN: Only the replay call happened
    assert_eq!(*calls.lock().expect("counter lock"), 1);
    assert_eq!(store.subscriber_count(), 0);
}

/// **VALUE**: Verifies the watch channel mirrors commits.
#[tokio::test]
async fn given_watch_receiver_when_initializing_then_sees_settled_state() {
    // GIVEN: A receiver taken before initialization
    let store = store_without_api(MemoryTokenStorage::new());
    let mut receiver = store.watch();
    assert_eq!(receiver.borrow().status, SessionStatus::Loading);

    // WHEN: Initializing
    store.initialize().await;

    // THEN: The receiver observes the change
    assert!(receiver.has_changed().expect("sender alive"));
    assert_eq!(receiver.borrow_and_update().status, SessionStatus::Unauthenticated);
}

/// **VALUE**: Verifies authorized requests require an authenticated session.
///
/// **BUG THIS CATCHES**: Would catch sending requests with no Authorization header.
#[tokio::test]
async fn given_unauthenticated_store_when_building_request_then_returns_not_authenticated() {
    // GIVEN: An initialized, unauthenticated store
    let store = SessionStore::builder()
        .with_api_base_path("https://api.example")
        .with_storage(MemoryTokenStorage::new())
        .build()
        .expect("store should build");

    // WHEN: Asking for a request
    let result = store.authorized_request(Method::GET, "/jobs").await;

    // THEN
    assert!(matches!(result, Err(RequestError::NotAuthenticated { .. })));
    assert!(store.user_id().is_none());
}

#[tokio::test]
async fn given_store_when_disposing_twice_then_second_call_is_harmless() {
    // GIVEN: An initialized store with a host channel
    let (_sender, receiver) = tokio::sync::mpsc::channel(4);
    let store = SessionStore::builder()
        .with_storage(MemoryTokenStorage::new())
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    store.initialize().await;

    // WHEN/THEN: Disposing twice does not panic
    store.dispose();
    store.dispose();
    assert!(store.is_initialized());
}
