//! Revalidation of a held token.

use crate::helpers::{accept_tokens, builder, identity_server};

use session_core::storage::MemoryTokenStorage;

use models::{SessionSnapshot, SessionStatus};

use std::sync::Arc;

/// **VALUE**: Verifies refresh keeps a still-valid session.
#[tokio::test]
async fn given_valid_token_when_refreshing_then_returns_true_and_stays_authenticated() {
    // GIVEN: An authenticated store
    let server = identity_server(&["good"]).await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::with_token("good")))
        .build()
        .expect("store should build");
    store.initialize().await;
    let before = store.snapshot();

    // WHEN: Refreshing
    let refreshed = store.refresh_auth().await;

    // THEN
    assert!(refreshed);
    assert_eq!(store.snapshot(), before);
}

/// **VALUE**: Verifies refresh demotes a session whose token stopped validating.
///
/// **WHY THIS MATTERS**: Tokens expire or get revoked server side while the app is open.
///
/// **BUG THIS CATCHES**: Would catch keeping a revoked token in memory or storage.
#[tokio::test]
async fn given_revoked_token_when_refreshing_then_invalid_token_and_storage_cleared() {
    // GIVEN: An authenticated store whose token is then revoked server side
    let server = identity_server(&["good"]).await;
    let storage = Arc::new(MemoryTokenStorage::with_token("good"));
    let store = builder(&server, storage.clone())
        .build()
        .expect("store should build");
    assert_eq!(store.initialize().await, SessionStatus::Authenticated);
    server.reset().await;
    accept_tokens(&server, &[]).await;

    // WHEN: Refreshing
    let refreshed = store.refresh_auth().await;

    // THEN
    assert!(!refreshed);
    assert_eq!(store.status(), SessionStatus::InvalidToken);
    assert!(store.token().is_none());
    assert!(storage.peek().is_none());
}

/// **VALUE**: Verifies `is_authenticated` short-circuits on an authenticated record.
///
/// **BUG THIS CATCHES**: Would catch a network round trip on every authentication check.
#[tokio::test]
async fn given_authenticated_store_when_checking_authentication_then_no_extra_validation() {
    // GIVEN: An authenticated store
    let server = identity_server(&["good"]).await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::with_token("good")))
        .build()
        .expect("store should build");
    store.initialize().await;
    let requests_after_init = server
        .received_requests()
        .await
        .expect("recording enabled")
        .len();

    // WHEN: Checking twice
    let first = store.is_authenticated().await;
    let second = store.is_authenticated().await;

    // THEN: True without further requests
    assert!(first && second);
    assert_eq!(
        server.received_requests().await.expect("recording enabled").len(),
        requests_after_init
    );
}

#[tokio::test]
async fn given_authenticated_store_when_clearing_then_unauthenticated() {
    // GIVEN: An authenticated store
    let server = identity_server(&["good"]).await;
    let storage = Arc::new(MemoryTokenStorage::with_token("good"));
    let store = builder(&server, storage.clone())
        .build()
        .expect("store should build");
    store.initialize().await;

    // WHEN: Clearing
    store.clear_auth();

    // THEN: Nothing held, nothing persisted, refresh has nothing to do
    assert_eq!(store.snapshot(), SessionSnapshot::unauthenticated());
    assert!(storage.peek().is_none());
    assert!(!store.refresh_auth().await);
    assert!(!store.is_authenticated().await);
}
