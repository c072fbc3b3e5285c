//! Best-effort identity extraction from `header.payload.signature` tokens.
//!
//! The payload is read without verifying the signature. The result is only
//! ever used to label requests; authorization decisions always go back to
//! the identity endpoint.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use serde_json::{Map, Value};

/// Decoded payload claims.
pub type TokenClaims = Map<String, Value>;

const TOKEN_SEGMENT_COUNT: usize = 3;
const USER_ID_CLAIM: &str = "userId";
const SUBJECT_CLAIM: &str = "sub";

/// Decode the middle segment of `token` into its JSON claims.
///
/// Returns `None` for anything that is not exactly three dot-separated
/// segments, for undecodable base64 and for payloads that are not a JSON
/// object.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != TOKEN_SEGMENT_COUNT {
        warn!("Invalid token format: expected {TOKEN_SEGMENT_COUNT} segments, got {}", segments.len());
        return None;
    }

    let mut payload: String = segments[1]
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let padding = (4 - payload.len() % 4) % 4;
    payload.extend(std::iter::repeat_n('=', padding));

    let bytes = match STANDARD.decode(payload.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to decode token payload: {e}");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) => {
            warn!("Token payload is not a JSON object");
            None
        }
        Err(e) => {
            warn!("Failed to parse token payload: {e}");
            None
        }
    }
}

/// User identifier: the `userId` claim, else `sub`.
pub fn user_id(claims: &TokenClaims) -> Option<String> {
    claim_as_id(claims.get(USER_ID_CLAIM)).or_else(|| claim_as_id(claims.get(SUBJECT_CLAIM)))
}

pub fn user_id_from_token(token: &str) -> Option<String> {
    decode_claims(token).as_ref().and_then(user_id)
}

fn claim_as_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
