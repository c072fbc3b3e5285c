//! Bearer credential handling with redacted Debug output.

use crate::RedactError;

use std::fmt;

use serde::ser::Error;
use zeroize::Zeroize;

const BEARER_SCHEME_PREFIX: &str = "Bearer ";

/// A bearer token that never exposes its value in logs or debug output.
///
/// The backing string is zeroized on drop. Serialization is refused so a
/// token cannot leak into a persisted snapshot or a log line by accident.
#[derive(Clone)]
pub struct BearerToken {
    inner: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: token.into(),
        }
    }

    /// Get the raw credential.
    ///
    /// # Security Note
    /// Only call this when the value actually has to leave the process
    /// (HTTP header, persisted storage slot).
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Value for an `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("{BEARER_SCHEME_PREFIX}{}", self.inner)
    }

    /// Token length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for BearerToken {}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken([REDACTED])")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED TOKEN]")
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl serde::Serialize for BearerToken {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::secret_serialization(
            "BearerToken",
        )))
    }
}
