use common::ErrorLocation;

use session_core::error::{ConfigError, SessionError, StorageError};

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the jobtrack binary from starting.
///
/// Runtime session failures never show up here; the store absorbs them into
/// its status.
#[derive(Debug, Error)]
pub enum JobtrackError {
    /// Error from this App
    #[error("Jobtrack Error: {message} {location}")]
    Jobtrack {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Session store could not be assembled
    #[error("Session Error: {message} {location}")]
    Session {
        message: String,
        location: ErrorLocation,
    },
}

impl JobtrackError {
    #[track_caller]
    pub fn jobtrack(message: impl Into<String>) -> Self {
        JobtrackError::Jobtrack {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for JobtrackError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        JobtrackError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SessionError> for JobtrackError {
    #[track_caller]
    fn from(error: SessionError) -> Self {
        JobtrackError::Session {
            message: format!("[{}] {error}", error.error_category()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<StorageError> for JobtrackError {
    #[track_caller]
    fn from(error: StorageError) -> Self {
        SessionError::from(error).into()
    }
}
