use super::SessionStore;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::host::{AddressBar, HostMessage, InMemoryAddressBar, OriginPolicy};
use crate::storage::TokenStorage;
use crate::validation::{DEFAULT_TIMEOUT_DURATION, TokenValidator};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

const BLANK_PAGE: &str = "about:blank";

/// Builder for a [`SessionStore`].
///
/// Only the token storage is required. Without an address bar the store
/// starts on a blank page (no URL token); without a host channel no message
/// listener is started.
#[derive(Default)]
pub struct SessionStoreBuilder {
    api_base_path: Option<String>,
    request_timeout: Option<Duration>,
    origin_policy: OriginPolicy,
    storage: Option<Arc<dyn TokenStorage>>,
    address_bar: Option<Arc<dyn AddressBar>>,
    host_messages: Option<mpsc::Receiver<HostMessage>>,
}

impl SessionStoreBuilder {
    /// Take the API base path, request timeout and origin policy from `config`.
    pub fn with_config(mut self, config: &SessionConfig) -> Self {
        self.api_base_path = config.api.api_base_path.clone();
        self.request_timeout = Some(config.request_timeout());
        self.origin_policy = config.origin_policy();
        self
    }

    pub fn with_api_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.api_base_path = Some(base_path.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.origin_policy = policy;
        self
    }

    pub fn with_storage(self, storage: impl TokenStorage + 'static) -> Self {
        self.with_shared_storage(Arc::new(storage))
    }

    pub fn with_shared_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_address_bar(self, address_bar: impl AddressBar + 'static) -> Self {
        self.with_shared_address_bar(Arc::new(address_bar))
    }

    pub fn with_shared_address_bar(mut self, address_bar: Arc<dyn AddressBar>) -> Self {
        self.address_bar = Some(address_bar);
        self
    }

    /// Receiving end of the host message channel. Drained by the listener
    /// task that `initialize` starts.
    pub fn with_host_messages(mut self, receiver: mpsc::Receiver<HostMessage>) -> Self {
        self.host_messages = Some(receiver);
        self
    }

    /// Build the store. Does not touch storage or the network.
    #[track_caller]
    pub fn build(self) -> Result<SessionStore, SessionError> {
        let storage = self
            .storage
            .ok_or_else(|| SessionError::build("Token storage is required"))?;

        let validator = TokenValidator::new(
            self.api_base_path.as_deref(),
            self.request_timeout.unwrap_or(DEFAULT_TIMEOUT_DURATION),
        )?;

        let address_bar = match self.address_bar {
            Some(address_bar) => address_bar,
            None => Arc::new(InMemoryAddressBar::new(Url::parse(BLANK_PAGE)?)),
        };

        Ok(SessionStore::from_parts(
            storage,
            validator,
            address_bar,
            self.origin_policy,
            self.host_messages,
        ))
    }
}

impl std::fmt::Debug for SessionStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStoreBuilder")
            .field("api_base_path", &self.api_base_path)
            .field("request_timeout", &self.request_timeout)
            .field("origin_policy", &self.origin_policy)
            .field("has_storage", &self.storage.is_some())
            .field("has_address_bar", &self.address_bar.is_some())
            .field("has_host_messages", &self.host_messages.is_some())
            .finish()
    }
}
