//! Errors raised while assembling or bootstrapping a session store.
//!
//! None of these reach UI callers: the store converts every runtime failure
//! into a status value. They surface only from `SessionStoreBuilder::build`
//! and inside the initialization sequence, where they are logged and
//! replaced by the `unauthenticated` resting status.

use crate::error::storage::StorageError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Session Build Error: {message} {location}")]
    Build {
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP Client Error: {message} {location}")]
    HttpClient {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Endpoint: {message} {location}")]
    Endpoint {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    #[track_caller]
    pub fn build(message: impl Into<String>) -> Self {
        SessionError::Build {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short category name for log lines.
    pub fn error_category(&self) -> &'static str {
        match self {
            SessionError::Build { .. } => "build",
            SessionError::HttpClient { .. } => "http_client",
            SessionError::Endpoint { .. } => "endpoint",
            SessionError::Storage(StorageError::Read { .. }) => "storage_read",
            SessionError::Storage(StorageError::Write { .. }) => "storage_write",
            SessionError::Storage(StorageError::Remove { .. }) => "storage_remove",
            SessionError::Storage(StorageError::DataDirDetection { .. }) => "data_dir",
        }
    }
}

impl From<reqwest::Error> for SessionError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        SessionError::HttpClient {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for SessionError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        SessionError::Endpoint {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
