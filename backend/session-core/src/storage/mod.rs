//! The persisted token slot.
//!
//! Exactly one token lives in storage at a time, under
//! [`AUTH_TOKEN_STORAGE_KEY`](crate::AUTH_TOKEN_STORAGE_KEY). It is a cache of
//! the last token that passed validation, never a source of truth: the
//! session store revalidates whatever it reads back before trusting it.

pub mod file;
pub mod paths;

pub use file::FileTokenStorage;
pub use paths::{DataDirSource, DataDirectory, detect_data_dir};

use crate::error::StorageError;

use common::BearerToken;

use std::sync::{Mutex, PoisonError};

/// Single-slot token persistence.
///
/// Reads are synchronous; the session store treats them as part of its
/// async initialization anyway.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, `Ok(None)` when the slot is empty.
    fn load(&self) -> Result<Option<BearerToken>, StorageError>;

    /// Replace the persisted token.
    fn save(&self, token: &BearerToken) -> Result<(), StorageError>;

    /// Empty the slot. Removing an already empty slot succeeds.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Process-local storage, lost at exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// Raw slot contents, for inspection.
    pub fn peek(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<BearerToken>, StorageError> {
        Ok(self.peek().map(BearerToken::new))
    }

    fn save(&self, token: &BearerToken) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.as_str().to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
