//! Errors from loading, validating and saving `config.json`.

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Session Config Read Error: {path}: {source} {location}")]
    ReadError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session Config Parse Error: {path}: {reason} {location}")]
    ParseError {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },

    #[error("Session Config Write Error: {path}: {source} {location}")]
    WriteError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session Config Serialization Error: {reason} {location}")]
    SerializeError {
        location: ErrorLocation,
        reason: String,
    },

    #[error("Invalid Session Config: {reason} {location}")]
    ValidationError {
        location: ErrorLocation,
        reason: String,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: path.into(),
            source,
        }
    }

    #[track_caller]
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConfigError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[track_caller]
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: path.into(),
            source,
        }
    }

    #[track_caller]
    pub fn validation(reason: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: reason.into(),
        }
    }
}
