//! Test helpers for session integration tests.
//!
//! - A mock identity endpoint that accepts a fixed set of tokens
//! - Storage and address bar doubles that count how often they are touched
//! - Waiting on store state through its watch channel

use session_core::error::StorageError;
use session_core::host::{AddressBar, InMemoryAddressBar};
use session_core::storage::{MemoryTokenStorage, TokenStorage};
use session_core::{SessionStore, SessionStoreBuilder};

use common::BearerToken;
use models::SessionSnapshot;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PARENT_ORIGIN: &str = "https://host.example";
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an identity endpoint that answers 200 for `valid` tokens and 401 otherwise.
pub async fn identity_server(valid: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    accept_tokens(&server, valid).await;
    server
}

/// Mount 200 responses for `valid` tokens plus a low-priority 401 fallback.
pub async fn accept_tokens(server: &MockServer, valid: &[&str]) {
    for token in valid {
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", format!("Bearer {token}")))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Builder wired to `server`, with the given storage.
pub fn builder(server: &MockServer, storage: Arc<dyn TokenStorage>) -> SessionStoreBuilder {
    SessionStore::builder()
        .with_api_base_path(server.uri())
        .with_request_timeout(Duration::from_secs(5))
        .with_shared_storage(storage)
}

/// Wait until the store's state satisfies `predicate`.
pub async fn wait_for(
    store: &SessionStore,
    predicate: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut receiver = store.watch();
    let snapshot = tokio::time::timeout(WAIT_TIMEOUT, receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for session state")
        .expect("session store dropped")
        .clone();
    snapshot
}

/// `header.payload.signature` token with the given JSON payload.
pub fn jwt(payload: serde_json::Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// Memory storage that counts reads.
#[derive(Debug, Default)]
pub struct CountingStorage {
    inner: MemoryTokenStorage,
    loads: AtomicUsize,
}

impl CountingStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            inner: MemoryTokenStorage::with_token(token),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn peek(&self) -> Option<String> {
        self.inner.peek()
    }
}

impl TokenStorage for CountingStorage {
    fn load(&self) -> Result<Option<BearerToken>, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load()
    }

    fn save(&self, token: &BearerToken) -> Result<(), StorageError> {
        self.inner.save(token)
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.inner.remove()
    }
}

/// Storage whose reads always fail.
#[derive(Debug, Default)]
pub struct UnreadableStorage;

impl TokenStorage for UnreadableStorage {
    fn load(&self) -> Result<Option<BearerToken>, StorageError> {
        Err(StorageError::read(
            "/unreadable",
            std::io::Error::other("disk unavailable"),
        ))
    }

    fn save(&self, _token: &BearerToken) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// In-memory address bar that counts reads and replacements.
#[derive(Debug)]
pub struct CountingAddressBar {
    inner: InMemoryAddressBar,
    reads: AtomicUsize,
    replacements: AtomicUsize,
}

impl CountingAddressBar {
    pub fn new(url: &str) -> Self {
        Self {
            inner: InMemoryAddressBar::parse(url).expect("test URL should parse"),
            reads: AtomicUsize::new(0),
            replacements: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::SeqCst)
    }

    pub fn history_len(&self) -> usize {
        self.inner.history_len()
    }
}

impl AddressBar for CountingAddressBar {
    fn current_url(&self) -> Url {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.current_url()
    }

    fn replace_url(&self, url: Url) {
        self.replacements.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_url(url);
    }
}
