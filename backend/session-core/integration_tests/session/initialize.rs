//! Startup synchronization: storage recovery, URL recovery, memoized init.

use crate::helpers::{
    CountingAddressBar, CountingStorage, UnreadableStorage, builder, identity_server,
};

use session_core::SessionStore;
use session_core::host::AddressBar;
use session_core::storage::MemoryTokenStorage;

use models::SessionStatus;

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// **VALUE**: Verifies a store with nothing to recover settles on `unauthenticated`.
///
/// **WHY THIS MATTERS**: First launch outside a host must still leave `loading`.
///
/// **BUG THIS CATCHES**: Would catch a store stuck in `loading` forever.
#[tokio::test]
async fn given_empty_storage_and_plain_url_when_initializing_then_settles_unauthenticated() {
    // GIVEN: Empty storage, a URL without a token, and a subscriber
    let server = identity_server(&[]).await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::new()))
        .with_address_bar(CountingAddressBar::new("https://app.example/jobs"))
        .build()
        .expect("store should build");
    let seen: Arc<Mutex<Vec<SessionStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store.subscribe(move |snapshot| {
        sink.lock().expect("sink lock").push(snapshot.status);
    });

    // WHEN: Initializing
    let status = store.initialize().await;

    // THEN: Unauthenticated, and the subscriber saw loading first
    assert_eq!(status, SessionStatus::Unauthenticated);
    assert!(store.token().is_none());
    assert_eq!(
        *seen.lock().expect("sink lock"),
        vec![SessionStatus::Loading, SessionStatus::Unauthenticated]
    );
}

/// **VALUE**: Verifies the `?auth_token=` bootstrap end to end.
///
/// **WHY THIS MATTERS**: This is how the host launches the app with a fresh session.
///
/// **BUG THIS CATCHES**: Would catch leaving the token visible in the URL, adding a
/// history entry, or not persisting the accepted token.
#[tokio::test]
async fn given_url_token_when_initializing_then_authenticates_persists_and_strips_url() {
    // GIVEN: Empty storage and a URL carrying a valid token
    let server = identity_server(&["abc"]).await;
    let storage = Arc::new(MemoryTokenStorage::new());
    let address_bar = Arc::new(CountingAddressBar::new(
        "https://app.example/jobs?tab=open&auth_token=abc",
    ));
    let store = builder(&server, storage.clone())
        .with_shared_address_bar(address_bar.clone())
        .build()
        .expect("store should build");

    // WHEN: Initializing
    let status = store.initialize().await;

    // THEN: Authenticated with the URL token, persisted, URL stripped in place
    assert_eq!(status, SessionStatus::Authenticated);
    assert_eq!(store.token().map(|t| t.as_str().to_owned()).as_deref(), Some("abc"));
    assert_eq!(storage.peek().as_deref(), Some("abc"));
    assert_eq!(
        address_bar.current_url().as_str(),
        "https://app.example/jobs?tab=open"
    );
    assert_eq!(address_bar.history_len(), 1);
    assert!(store.parent_origin().is_none());
}

/// **VALUE**: Verifies a valid persisted token restores the session.
#[tokio::test]
async fn given_valid_stored_token_when_initializing_then_authenticated() {
    // GIVEN: Storage holding a valid token
    let server = identity_server(&["stored"]).await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::with_token("stored")))
        .build()
        .expect("store should build");

    // WHEN: Initializing
    let status = store.initialize().await;

    // THEN
    assert_eq!(status, SessionStatus::Authenticated);
    assert!(store.is_authenticated_sync());
    assert!(store.is_authenticated().await);
}

/// **VALUE**: Verifies an invalid persisted token is dropped.
///
/// **WHY THIS MATTERS**: Keeping a dead token would fail validation on every launch.
///
/// **BUG THIS CATCHES**: Would catch leaving the stale token in storage.
#[tokio::test]
async fn given_invalid_stored_token_when_initializing_then_invalid_token_and_storage_cleared() {
    // GIVEN: Storage holding a token the endpoint rejects
    let server = identity_server(&[]).await;
    let storage = Arc::new(MemoryTokenStorage::with_token("expired"));
    let store = builder(&server, storage.clone())
        .build()
        .expect("store should build");

    // WHEN: Initializing
    let status = store.initialize().await;

    // THEN
    assert_eq!(status, SessionStatus::InvalidToken);
    assert!(store.has_invalid_token());
    assert!(store.token().is_none());
    assert!(storage.peek().is_none());
    assert!(!store.is_authenticated().await);
}

/// **VALUE**: Verifies the URL token wins over a different stored token.
///
/// **BUG THIS CATCHES**: Would catch running URL recovery before storage recovery.
#[tokio::test]
async fn given_stored_and_url_tokens_when_initializing_then_url_token_wins() {
    // GIVEN: Both tokens valid, different values
    let server = identity_server(&["stored", "from-url"]).await;
    let storage = Arc::new(MemoryTokenStorage::with_token("stored"));
    let store = builder(&server, storage.clone())
        .with_address_bar(CountingAddressBar::new("https://app.example/?auth_token=from-url"))
        .build()
        .expect("store should build");

    // WHEN: Initializing
    store.initialize().await;

    // THEN: The URL token is held and persisted
    assert_eq!(store.token().map(|t| t.as_str().to_owned()).as_deref(), Some("from-url"));
    assert_eq!(storage.peek().as_deref(), Some("from-url"));
    assert_eq!(store.status(), SessionStatus::Authenticated);
}

/// **VALUE**: Verifies initialization runs exactly once under concurrent callers.
///
/// **WHY THIS MATTERS**: Many consumers await readiness at startup.
///
/// **BUG THIS CATCHES**: Would catch duplicate storage reads, duplicate URL strips or
/// duplicate validations from racing initializers.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_callers_when_initializing_then_sequence_runs_once() {
    // GIVEN: Counting doubles and an endpoint that expects one validation
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/me"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let storage = Arc::new(CountingStorage::default());
    let address_bar = Arc::new(CountingAddressBar::new("https://app.example/?auth_token=once"));
    let (_sender, receiver) = tokio::sync::mpsc::channel(4);
    let store = builder(&server, storage.clone())
        .with_shared_address_bar(address_bar.clone())
        .with_host_messages(receiver)
        .build()
        .expect("store should build");

    // WHEN: Eight callers initialize at once
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.initialize().await })
        })
        .collect();
    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.expect("task should not panic"));
    }

    // THEN: Same result everywhere, each side effect happened once
    assert!(statuses.iter().all(|s| *s == SessionStatus::Authenticated));
    assert_eq!(storage.loads(), 1);
    assert_eq!(address_bar.reads(), 1);
    assert_eq!(address_bar.replacements(), 1);
    assert!(store.is_initialized());

    // AND: A later call is also a no-op
    store.initialize().await;
    assert_eq!(storage.loads(), 1);
    assert_eq!(address_bar.reads(), 1);
}

/// **VALUE**: Verifies a caller that stops waiting does not restart startup.
///
/// **WHY THIS MATTERS**: Callers wrap `initialize` in timeouts and `select!`;
/// the sequence must keep running on its own and finish exactly once.
///
/// **BUG THIS CATCHES**: Would catch startup tied to the first caller's future,
/// where a dropped caller leaves it unfinished and the next caller reads storage
/// and validates tokens again.
#[tokio::test]
async fn given_first_caller_times_out_when_initializing_again_then_sequence_runs_once() {
    // GIVEN: A slow endpoint, a stored token and a URL token
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/me"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;
    let storage = Arc::new(CountingStorage::with_token("stored"));
    let address_bar = Arc::new(CountingAddressBar::new("https://app.example/?auth_token=once"));
    let store = builder(&server, storage.clone())
        .with_shared_address_bar(address_bar.clone())
        .build()
        .expect("store should build");

    // WHEN: The first caller gives up before validation answers
    let first = tokio::time::timeout(Duration::from_millis(100), store.initialize()).await;
    assert!(first.is_err());
    assert!(!store.is_initialized());

    // AND: Another caller waits for the outcome
    let status = store.initialize().await;

    // THEN: One storage read, one URL recovery, two validations in total
    assert_eq!(status, SessionStatus::Authenticated);
    assert_eq!(store.token().map(|t| t.as_str().to_owned()).as_deref(), Some("once"));
    assert_eq!(storage.loads(), 1);
    assert_eq!(address_bar.reads(), 1);
    assert_eq!(address_bar.replacements(), 1);
    assert_eq!(storage.peek().as_deref(), Some("once"));
}

/// **VALUE**: Verifies a storage failure does not abort startup.
///
/// **BUG THIS CATCHES**: Would catch a read error leaving the store in `loading`
/// or skipping URL recovery.
#[tokio::test]
async fn given_unreadable_storage_when_initializing_then_url_recovery_still_runs() {
    // GIVEN: Failing storage and a URL token
    let server = identity_server(&["from-url"]).await;
    let store = builder(&server, Arc::new(UnreadableStorage))
        .with_address_bar(CountingAddressBar::new("https://app.example/?auth_token=from-url"))
        .build()
        .expect("store should build");

    // WHEN: Initializing
    let status = store.initialize().await;

    // THEN: The URL token still gets through
    assert_eq!(status, SessionStatus::Authenticated);
}

#[tokio::test]
async fn given_unreadable_storage_and_no_url_token_when_initializing_then_unauthenticated() {
    // GIVEN: Failing storage only
    let server = identity_server(&[]).await;
    let store = builder(&server, Arc::new(UnreadableStorage))
        .build()
        .expect("store should build");

    // WHEN/THEN
    assert_eq!(store.initialize().await, SessionStatus::Unauthenticated);
}

/// **VALUE**: Verifies the async getters wait for initialization.
#[tokio::test]
async fn given_uninitialized_store_when_calling_async_getters_then_they_initialize_first() {
    // GIVEN: A store with a valid JWT in storage
    let token = crate::helpers::jwt(serde_json::json!({"userId": "user-7"}));
    let server = identity_server(&[token.as_str()]).await;
    let store: SessionStore = builder(&server, Arc::new(MemoryTokenStorage::with_token(token.as_str())))
        .build()
        .expect("store should build");

    // WHEN: Using only async getters
    let status = store.status_async().await;
    let user_id = store.user_id_async().await;

    // THEN
    assert_eq!(status, SessionStatus::Authenticated);
    assert_eq!(user_id.as_deref(), Some("user-7"));
    assert!(store.token_async().await.is_some());
    assert!(!store.has_invalid_token_async().await);
    assert!(!store.has_no_token_async().await);
}
