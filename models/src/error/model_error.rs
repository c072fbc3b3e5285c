use crate::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Invalid field values caught while building model types.
#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("Model Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}

impl ModelError {
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        ModelError::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
