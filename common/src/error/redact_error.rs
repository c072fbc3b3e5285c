use crate::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Raised when a secret-holding type is asked to leave the process in clear text.
#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Refusing to serialize secret {type_name}; read it explicitly instead {location}")]
    SecretSerialization {
        type_name: &'static str,
        location: ErrorLocation,
    },
}

impl RedactError {
    #[track_caller]
    pub fn secret_serialization(type_name: &'static str) -> Self {
        RedactError::SecretSerialization {
            type_name,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
