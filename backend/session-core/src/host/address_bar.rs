//! Page address access.

use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

/// The visible page address.
pub trait AddressBar: Send + Sync {
    fn current_url(&self) -> Url;

    /// Replace the visible address without adding a history entry.
    fn replace_url(&self, url: Url);
}

/// Address bar kept in memory, counting history entries.
#[derive(Debug)]
pub struct InMemoryAddressBar {
    state: Mutex<AddressState>,
}

#[derive(Debug)]
struct AddressState {
    current: Url,
    history_len: usize,
}

impl InMemoryAddressBar {
    pub fn new(url: Url) -> Self {
        Self {
            state: Mutex::new(AddressState {
                current: url,
                history_len: 1,
            }),
        }
    }

    /// Parse `url` and start a history at it.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Navigate to `url`, pushing a history entry.
    pub fn navigate(&self, url: Url) {
        let mut state = self.lock();
        state.current = url;
        state.history_len += 1;
    }

    pub fn history_len(&self) -> usize {
        self.lock().history_len
    }

    fn lock(&self) -> MutexGuard<'_, AddressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AddressBar for InMemoryAddressBar {
    fn current_url(&self) -> Url {
        self.lock().current.clone()
    }

    fn replace_url(&self, url: Url) {
        self.lock().current = url;
    }
}

/// First non-empty value of query parameter `name`.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `url` with every occurrence of query parameter `name` removed.
///
/// Drops the `?` entirely when no parameters remain.
pub fn without_query_param(url: &Url, name: &str) -> Url {
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if remaining.is_empty() {
        stripped.set_query(None);
    } else {
        stripped
            .query_pairs_mut()
            .clear()
            .extend_pairs(remaining.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    stripped
}
