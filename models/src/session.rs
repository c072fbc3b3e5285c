//! Session state committed by the session store.

use common::BearerToken;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally observable result of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Initialization has not settled yet.
    Loading,
    Authenticated,
    Unauthenticated,
    /// The last token offered to the store failed validation.
    InvalidToken,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Loading => "loading",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Unauthenticated => "unauthenticated",
            SessionStatus::InvalidToken => "invalid_token",
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Loading
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the session record.
///
/// The store replaces the whole snapshot on every commit, so a reader never
/// sees a token from one commit paired with a status from another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: Option<BearerToken>,
    pub status: SessionStatus,
    /// Origin of the host window that pushed the current token. Provenance only.
    pub parent_origin: Option<String>,
}

impl SessionSnapshot {
    /// Initial record: no token, `Loading`.
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn authenticated(token: BearerToken, parent_origin: Option<String>) -> Self {
        Self {
            token: Some(token),
            status: SessionStatus::Authenticated,
            parent_origin,
        }
    }

    pub fn invalid_token(parent_origin: Option<String>) -> Self {
        Self {
            token: None,
            status: SessionStatus::InvalidToken,
            parent_origin,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            token: None,
            status: SessionStatus::Unauthenticated,
            parent_origin: None,
        }
    }

    /// `Authenticated` with a token actually present.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.token.is_some()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            status: self.status,
            has_token: self.token.is_some(),
            token_length: self.token.as_ref().map(BearerToken::len),
            parent_origin: self.parent_origin.clone(),
        }
    }
}

/// Serializable view of a snapshot with the credential stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub status: SessionStatus,
    pub has_token: bool,
    pub token_length: Option<usize>,
    pub parent_origin: Option<String>,
}
