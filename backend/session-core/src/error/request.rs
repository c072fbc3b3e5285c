use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Errors from building an authorized API request.
#[derive(Debug, ThisError)]
pub enum RequestError {
    #[error("Not Authenticated: no valid session token {location}")]
    NotAuthenticated { location: ErrorLocation },

    #[error("API base path is not configured {location}")]
    MissingBasePath { location: ErrorLocation },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },
}

impl RequestError {
    #[track_caller]
    pub fn not_authenticated() -> Self {
        RequestError::NotAuthenticated {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn missing_base_path() -> Self {
        RequestError::MissingBasePath {
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<url::ParseError> for RequestError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        RequestError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
