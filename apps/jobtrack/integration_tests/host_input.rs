//! Host input flowing from a line reader through the store.

use jobtrack::pump::pump_host_messages;

use session_core::SessionStore;
use session_core::storage::{FileTokenStorage, TokenStorage};

use models::SessionStatus;

use tempfile::TempDir;
use tokio::sync::mpsc;

/// **VALUE**: Verifies pumped messages reach the store and are applied before shutdown.
///
/// **WHY THIS MATTERS**: This is the binary's whole runtime path for pushed tokens.
///
/// **BUG THIS CATCHES**: Would catch a pump that never forwards, or a shutdown that
/// drops the last queued message.
#[tokio::test]
async fn given_pushed_token_without_api_when_input_ends_then_store_records_rejection() {
    // GIVEN: A store with file storage and no API base path, listening for host input
    let data_dir = TempDir::new().expect("temp dir");
    let storage = FileTokenStorage::new(data_dir.path());
    let (sender, receiver) = mpsc::channel(8);
    let store = SessionStore::builder()
        .with_storage(storage.clone())
        .with_host_messages(receiver)
        .build()
        .expect("store should build");
    assert_eq!(store.initialize().await, SessionStatus::Unauthenticated);

    // WHEN: One auth token line is pumped and input ends
    let input = r#"{"origin": "https://host.example", "data": {"type": "CREAO_AUTH_TOKEN", "token": "t"}}"#;
    let forwarded = pump_host_messages(input.as_bytes(), sender).await;
    store.drain_host_messages().await;

    // THEN: The token could not be validated, so it is rejected and nothing is persisted
    assert_eq!(forwarded, 1);
    assert_eq!(store.status(), SessionStatus::InvalidToken);
    assert_eq!(store.parent_origin().as_deref(), Some("https://host.example"));
    assert!(storage.load().expect("load").is_none());
}
