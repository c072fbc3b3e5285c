//! The session store.
//!
//! One explicitly constructed object owns the session record for the life of
//! the composition root. The token can arrive three ways (persisted storage,
//! a one-time URL parameter, a host message) and all three go through
//! [`SessionStore::set_token`] or the equivalent storage-recovery commit.
//!
//! # State machine
//!
//! `loading` → (`authenticated` | `invalid_token` | `unauthenticated`), and
//! from there any state is re-enterable:
//!
//! - a validated incoming token moves to `authenticated`
//! - a rejected incoming token moves to `invalid_token`
//! - [`SessionStore::clear_auth`] moves to `unauthenticated`
//! - [`SessionStore::refresh_auth`] demotes to `invalid_token` when the held token stopped validating
//!
//! `authenticated` always carries a token; the other resting states never do.
//!
//! # Concurrency
//!
//! The record lives in a `tokio::sync::watch` channel. Every commit replaces
//! the whole snapshot, so the last writer wins and readers never observe a
//! torn record. Initialization runs once on its own task, started by the
//! first caller; every caller (concurrent, later, or one that gave up
//! waiting) observes the same single run through a watch channel.

pub(crate) mod builder;
pub(crate) mod listeners;
mod message_listener;
mod sync;

pub use builder::SessionStoreBuilder;
pub use listeners::Subscription;

use crate::error::RequestError;
use crate::host::{AddressBar, HostMessage, OriginPolicy};
use crate::storage::TokenStorage;
use crate::token;
use crate::validation::TokenValidator;

use common::BearerToken;
use models::{SessionSnapshot, SessionStatus};

use listeners::ListenerRegistry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use log::{debug, info, warn};
use reqwest::{Method, RequestBuilder};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Handle to the session store. Cheap to clone; all clones share one record.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    state: watch::Sender<SessionSnapshot>,
    listeners: Arc<ListenerRegistry>,
    storage: Arc<dyn TokenStorage>,
    validator: TokenValidator,
    address_bar: Arc<dyn AddressBar>,
    origin_policy: OriginPolicy,
    host_messages: Mutex<Option<mpsc::Receiver<HostMessage>>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
    startup: OnceLock<watch::Receiver<Option<SessionStatus>>>,
    commit_seq: AtomicU64,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let task = self
            .listener_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl SessionStore {
    pub fn builder() -> SessionStoreBuilder {
        SessionStoreBuilder::default()
    }

    pub(crate) fn from_parts(
        storage: Arc<dyn TokenStorage>,
        validator: TokenValidator,
        address_bar: Arc<dyn AddressBar>,
        origin_policy: OriginPolicy,
        host_messages: Option<mpsc::Receiver<HostMessage>>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::loading());

        Self {
            inner: Arc::new(SessionInner {
                state,
                listeners: Arc::new(ListenerRegistry::default()),
                storage,
                validator,
                address_bar,
                origin_policy,
                host_messages: Mutex::new(host_messages),
                listener_task: Mutex::new(None),
                startup: OnceLock::new(),
                commit_seq: AtomicU64::new(0),
            }),
        }
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Run the synchronization protocol once and return the resting status.
    ///
    /// The first call spawns the run; every call, including the first,
    /// only awaits its outcome. Dropping a caller's future does not cancel
    /// or restart the run, and no later call performs a storage read, URL
    /// inspection or listener registration of its own.
    pub async fn initialize(&self) -> SessionStatus {
        let mut outcome = self
            .inner
            .startup
            .get_or_init(|| self.spawn_startup())
            .clone();

        let settled = outcome
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|status| *status);

        settled.unwrap_or_else(|| {
            warn!("Session initialization task ended without a result");
            self.status()
        })
    }

    /// Whether [`SessionStore::initialize`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.inner
            .startup
            .get()
            .is_some_and(|outcome| outcome.borrow().is_some())
    }

    fn spawn_startup(&self) -> watch::Receiver<Option<SessionStatus>> {
        let (done, outcome) = watch::channel(None);
        let store = self.clone();

        tokio::spawn(async move {
            let status = sync::run(&store).await;
            done.send_replace(Some(status));
        });

        outcome
    }

    /// Stop listening for host messages. Safe to call more than once.
    pub fn dispose(&self) {
        let task = self
            .inner
            .listener_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            task.abort();
            info!("Host message listener stopped");
        }
    }

    /// Wait until the listener has handled every queued host message.
    ///
    /// Returns once the sending side of the host channel is closed and the
    /// queue is empty. Returns right away if no listener is running.
    pub async fn drain_host_messages(&self) {
        let task = self
            .inner
            .listener_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Host message listener ended abnormally: {e}");
            }
        }
    }

    // ============================================
    // TRANSITIONS
    // ============================================

    /// Validate `token` with the identity endpoint. Never errors.
    pub async fn validate_token(&self, token: &BearerToken) -> bool {
        self.inner.validator.validate(token).await
    }

    /// Validate and commit an incoming token.
    ///
    /// On success the token is committed as `authenticated` and persisted; on
    /// failure the record becomes `invalid_token` and the persisted slot is
    /// emptied. `origin` replaces the recorded parent origin when given.
    pub async fn set_token(&self, token: BearerToken, origin: Option<String>) {
        let is_valid = self.validate_token(&token).await;
        let parent_origin = origin.or_else(|| self.parent_origin());

        if is_valid {
            info!("Token accepted (origin: {:?})", parent_origin);
            self.persist(&token);
            self.commit(SessionSnapshot::authenticated(token, parent_origin));
        } else {
            warn!("Token rejected (origin: {:?})", parent_origin);
            self.commit(SessionSnapshot::invalid_token(parent_origin));
            self.forget_persisted();
        }
    }

    /// Drop the session: no token, `unauthenticated`, no origin.
    pub fn clear_auth(&self) {
        info!("Clearing session");
        self.commit(SessionSnapshot::unauthenticated());
        self.forget_persisted();
    }

    /// Revalidate the held token.
    ///
    /// Returns `false` without touching state when no token is held. A token
    /// that no longer validates is dropped and the record becomes
    /// `invalid_token`. If another commit replaced the token while the check
    /// was in flight, that newer commit is left alone.
    pub async fn refresh_auth(&self) -> bool {
        let Some(token) = self.token() else {
            debug!("Refresh requested without a token");
            return false;
        };

        let is_valid = self.validate_token(&token).await;
        if self.token().as_ref() != Some(&token) {
            debug!("Token changed during refresh; keeping the newer commit");
            return is_valid;
        }

        if !is_valid {
            warn!("Held token no longer validates");
            self.commit(SessionSnapshot::invalid_token(self.parent_origin()));
            self.forget_persisted();
            return false;
        }

        self.commit(SessionSnapshot::authenticated(token, self.parent_origin()));
        true
    }

    /// Authentication check that revalidates when the record is not
    /// already `authenticated`. A failed revalidation clears the session.
    pub async fn is_authenticated(&self) -> bool {
        self.initialize().await;

        let snapshot = self.snapshot();
        let Some(token) = snapshot.token else {
            return false;
        };

        if snapshot.status == SessionStatus::Authenticated {
            return true;
        }

        if self.validate_token(&token).await {
            self.commit(SessionSnapshot::authenticated(token, snapshot.parent_origin));
            return true;
        }

        self.clear_auth();
        false
    }

    // ============================================
    // READS
    // ============================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<BearerToken> {
        self.inner.state.borrow().token.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status
    }

    pub fn parent_origin(&self) -> Option<String> {
        self.inner.state.borrow().parent_origin.clone()
    }

    pub fn is_authenticated_sync(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.status() == SessionStatus::Loading
    }

    pub fn has_invalid_token(&self) -> bool {
        self.status() == SessionStatus::InvalidToken
    }

    pub fn has_no_token(&self) -> bool {
        self.status() == SessionStatus::Unauthenticated
    }

    /// User identifier decoded from the held token, if any.
    pub fn user_id(&self) -> Option<String> {
        self.token()
            .and_then(|token| token::user_id_from_token(token.as_str()))
    }

    pub async fn token_async(&self) -> Option<BearerToken> {
        self.initialize().await;
        self.token()
    }

    pub async fn status_async(&self) -> SessionStatus {
        self.initialize().await;
        self.status()
    }

    pub async fn has_invalid_token_async(&self) -> bool {
        self.initialize().await;
        self.has_invalid_token()
    }

    pub async fn has_no_token_async(&self) -> bool {
        self.initialize().await;
        self.has_no_token()
    }

    pub async fn user_id_async(&self) -> Option<String> {
        self.initialize().await;
        self.user_id()
    }

    // ============================================
    // SUBSCRIPTIONS
    // ============================================

    /// Register `listener`. It is called once right away with the current
    /// snapshot, then after every commit that changes the record.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let registry = &self.inner.listeners;
        let listener: listeners::Listener = Arc::new(listener);
        let (id, current) = registry.register(Arc::clone(&listener), || self.snapshot());

        listener(&current);
        Subscription::new(id, registry)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Async view of the record for consumers that prefer a channel.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    // ============================================
    // API ACCESS
    // ============================================

    /// Start a request to the platform API carrying the session token.
    ///
    /// # Errors
    /// [`RequestError::NotAuthenticated`] unless the record is
    /// `authenticated`; [`RequestError::MissingBasePath`] when no API base
    /// path is configured.
    pub async fn authorized_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, RequestError> {
        self.initialize().await;

        let snapshot = self.snapshot();
        let token = match snapshot.token {
            Some(token) if snapshot.status == SessionStatus::Authenticated => token,
            _ => return Err(RequestError::not_authenticated()),
        };

        self.inner.validator.request(method, path, &token)
    }

    // ============================================
    // INTERNALS
    // ============================================

    pub(crate) fn address_bar(&self) -> &dyn AddressBar {
        self.inner.address_bar.as_ref()
    }

    pub(crate) fn storage(&self) -> &dyn TokenStorage {
        self.inner.storage.as_ref()
    }

    pub(crate) fn origin_policy(&self) -> &OriginPolicy {
        &self.inner.origin_policy
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<SessionInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// Take the host receiver and start the listener task, at most once.
    pub(crate) fn register_message_listener(&self) {
        let receiver = self
            .inner
            .host_messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(receiver) = receiver else {
            debug!("No host message channel to listen on");
            return;
        };

        let task = message_listener::spawn(self.downgrade(), receiver);
        *self
            .inner
            .listener_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
        info!("Host message listener registered");
    }

    /// Replace the record and fan out if it changed.
    ///
    /// The sequence number is taken under the channel's write lock, so it
    /// orders commits the same way the channel does; the registry drops a
    /// fan-out that arrives after a newer one.
    pub(crate) fn commit(&self, next: SessionSnapshot) {
        let mut seq = None;
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            seq = Some(self.inner.commit_seq.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });

        if let Some(seq) = seq {
            debug!(
                "Session committed #{seq}: status={}, token={:?}, origin={:?}",
                next.status, next.token, next.parent_origin
            );
            self.inner.listeners.notify(seq, &next);
        }
    }

    fn persist(&self, token: &BearerToken) {
        if let Err(e) = self.inner.storage.save(token) {
            warn!("Failed to persist token: {e}");
        }
    }

    pub(crate) fn forget_persisted(&self) {
        if let Err(e) = self.inner.storage.remove() {
            warn!("Failed to remove persisted token: {e}");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("snapshot", &*self.inner.state.borrow())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
