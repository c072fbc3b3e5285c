//! Tokens pushed by the host window after startup.

use crate::helpers::{CountingStorage, PARENT_ORIGIN, builder, identity_server, wait_for};

use session_core::host::{HostMessage, OriginPolicy};

use models::SessionStatus;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

fn auth_message(origin: &str, token: &str) -> HostMessage {
    HostMessage::new(origin, json!({"type": "CREAO_AUTH_TOKEN", "token": token}))
}

/// **VALUE**: Verifies a pushed token overrides the current one and records its origin.
///
/// **WHY THIS MATTERS**: The host rotates tokens by pushing them; the app must follow.
///
/// **BUG THIS CATCHES**: Would catch ignoring messages after startup or dropping the origin.
#[tokio::test]
async fn given_authenticated_store_when_host_pushes_token_then_new_token_and_origin_are_held() {
    // GIVEN: A store authenticated from storage, listening on a host channel
    let server = identity_server(&["stored", "pushed"]).await;
    let storage = Arc::new(CountingStorage::with_token("stored"));
    let (sender, receiver) = mpsc::channel(4);
    let store = builder(&server, storage.clone())
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    assert_eq!(store.initialize().await, SessionStatus::Authenticated);

    // WHEN: The host pushes another valid token
    sender
        .send(auth_message(PARENT_ORIGIN, "pushed"))
        .await
        .expect("listener should be running");
    let snapshot = wait_for(&store, |s| s.parent_origin.is_some()).await;

    // THEN: The pushed token is held and persisted, with its origin
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(snapshot.token.map(|t| t.as_str().to_owned()).as_deref(), Some("pushed"));
    assert_eq!(snapshot.parent_origin.as_deref(), Some(PARENT_ORIGIN));
    assert_eq!(storage.peek().as_deref(), Some("pushed"));
}

/// **VALUE**: Verifies an invalid pushed token demotes the session.
///
/// **BUG THIS CATCHES**: Would catch keeping the old token after the host sent a bad one.
#[tokio::test]
async fn given_authenticated_store_when_host_pushes_invalid_token_then_invalid_token() {
    // GIVEN: An authenticated store
    let server = identity_server(&["stored"]).await;
    let storage = Arc::new(CountingStorage::with_token("stored"));
    let (sender, receiver) = mpsc::channel(4);
    let store = builder(&server, storage.clone())
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    store.initialize().await;

    // WHEN: The host pushes a token the endpoint rejects
    sender
        .send(auth_message(PARENT_ORIGIN, "bogus"))
        .await
        .expect("listener should be running");
    let snapshot = wait_for(&store, |s| s.status == SessionStatus::InvalidToken).await;

    // THEN: No token anywhere, origin still recorded
    assert!(snapshot.token.is_none());
    assert_eq!(snapshot.parent_origin.as_deref(), Some(PARENT_ORIGIN));
    assert!(storage.peek().is_none());
}

/// **VALUE**: Verifies unrelated messages never touch the session.
///
/// **BUG THIS CATCHES**: Would catch a malformed message clearing or demoting the session.
#[tokio::test]
async fn given_unrelated_messages_when_received_then_state_is_unchanged() {
    // GIVEN: An unauthenticated store listening for messages
    let server = identity_server(&["late"]).await;
    let storage = Arc::new(CountingStorage::default());
    let (sender, receiver) = mpsc::channel(8);
    let store = builder(&server, storage)
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    assert_eq!(store.initialize().await, SessionStatus::Unauthenticated);

    // WHEN: Junk arrives, followed by a valid push
    for data in [json!({"type": "RESIZE"}), json!("hello"), json!({"type": "CREAO_AUTH_TOKEN"})] {
        sender
            .send(HostMessage::new(PARENT_ORIGIN, data))
            .await
            .expect("listener should be running");
    }
    sender
        .send(auth_message(PARENT_ORIGIN, "late"))
        .await
        .expect("listener should be running");

    // THEN: Messages are handled in order; the only transition is the valid push
    let snapshot = wait_for(&store, |s| s.status == SessionStatus::Authenticated).await;
    assert_eq!(snapshot.token.map(|t| t.as_str().to_owned()).as_deref(), Some("late"));
    assert_eq!(snapshot.parent_origin.as_deref(), Some(PARENT_ORIGIN));
}

/// **VALUE**: Verifies the origin allow-list is enforced when configured.
///
/// **WHY THIS MATTERS**: Any window could otherwise plant a token in the session.
///
/// **BUG THIS CATCHES**: Would catch validating or committing tokens from foreign origins.
#[tokio::test]
async fn given_allow_list_when_foreign_origin_pushes_token_then_it_is_ignored() {
    // GIVEN: Only PARENT_ORIGIN is allowed; both tokens would validate
    let server = identity_server(&["foreign", "trusted"]).await;
    let (sender, receiver) = mpsc::channel(4);
    let store = builder(&server, Arc::new(CountingStorage::default()))
        .with_origin_policy(OriginPolicy::from_allowed(&[String::from(PARENT_ORIGIN)]))
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    store.initialize().await;

    // WHEN: A foreign origin pushes first, then the trusted one
    sender
        .send(auth_message("https://evil.example", "foreign"))
        .await
        .expect("listener should be running");
    sender
        .send(auth_message(PARENT_ORIGIN, "trusted"))
        .await
        .expect("listener should be running");
    let snapshot = wait_for(&store, |s| s.status == SessionStatus::Authenticated).await;

    // THEN: Only the trusted token was ever validated and committed
    assert_eq!(snapshot.token.map(|t| t.as_str().to_owned()).as_deref(), Some("trusted"));
    assert_eq!(snapshot.parent_origin.as_deref(), Some(PARENT_ORIGIN));
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.iter().all(|r| {
        r.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            != Some("Bearer foreign")
    }));
}

/// **VALUE**: Verifies `dispose` stops message handling.
///
/// **BUG THIS CATCHES**: Would catch a listener that keeps mutating state after teardown.
#[tokio::test]
async fn given_disposed_store_when_host_pushes_token_then_nothing_changes() {
    // GIVEN: An initialized store, then disposed
    let server = identity_server(&["pushed"]).await;
    let (sender, receiver) = mpsc::channel(4);
    let store = builder(&server, Arc::new(CountingStorage::default()))
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    store.initialize().await;
    store.dispose();

    // WHEN: The host pushes a valid token
    let _ = sender.send(auth_message(PARENT_ORIGIN, "pushed")).await;
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // THEN: Still unauthenticated
    assert_eq!(store.status(), SessionStatus::Unauthenticated);
    assert!(server.received_requests().await.expect("recording enabled").is_empty());
}

/// **VALUE**: Verifies draining waits for queued pushes to be applied.
///
/// **WHY THIS MATTERS**: When host input ends, the last pushed token must not be lost.
///
/// **BUG THIS CATCHES**: Would catch shutdown racing ahead of the listener's final commit.
#[tokio::test]
async fn given_closed_host_channel_when_draining_then_queued_push_is_applied() {
    // GIVEN: A listening store with one queued push and a closed channel
    let server = identity_server(&["last"]).await;
    let (sender, receiver) = mpsc::channel(4);
    let store = builder(&server, Arc::new(CountingStorage::default()))
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    store.initialize().await;
    sender
        .send(auth_message(PARENT_ORIGIN, "last"))
        .await
        .expect("listener should be running");
    drop(sender);

    // WHEN: Draining
    store.drain_host_messages().await;

    // THEN: The push was committed before drain returned
    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(store.parent_origin().as_deref(), Some(PARENT_ORIGIN));
}
