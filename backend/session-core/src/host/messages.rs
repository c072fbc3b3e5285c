//! Cross-window messages pushed by the host.
//!
//! The only message the session layer acts on is
//! `{"type": "CREAO_AUTH_TOKEN", "token": "<token>"}`. Anything else is
//! ignored without an error.

use crate::AUTH_TOKEN_MESSAGE_TYPE;

use common::BearerToken;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message as delivered by the host, with the origin it reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    pub origin: String,
    pub data: Value,
}

impl HostMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    /// The pushed token, if this is a well-formed auth token message.
    pub fn auth_token(&self) -> Option<BearerToken> {
        let Value::Object(payload) = &self.data else {
            return None;
        };

        if payload.get("type").and_then(Value::as_str) != Some(AUTH_TOKEN_MESSAGE_TYPE) {
            return None;
        }

        payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(BearerToken::new)
    }
}

/// Which host origins may push tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Accept every origin and record it as provenance.
    AnyOrigin,
    /// Accept only the listed origins.
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Build from configured origins; an empty list accepts any origin.
    pub fn from_allowed(origins: &[String]) -> Self {
        let normalized: Vec<String> = origins
            .iter()
            .map(|origin| normalize_origin(origin))
            .filter(|origin| !origin.is_empty())
            .collect();

        if normalized.is_empty() {
            OriginPolicy::AnyOrigin
        } else {
            OriginPolicy::AllowList(normalized)
        }
    }

    pub fn permits(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::AnyOrigin => true,
            OriginPolicy::AllowList(allowed) => {
                let origin = normalize_origin(origin);
                allowed.iter().any(|candidate| *candidate == origin)
            }
        }
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        OriginPolicy::AnyOrigin
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}
