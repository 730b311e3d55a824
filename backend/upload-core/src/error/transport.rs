use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Network-level failure before any HTTP status was received.
#[derive(Debug, ThisError)]
#[error("Transport Error: {message} {location}")]
pub struct TransportError {
    pub message: String,
    pub is_timeout: bool,
    pub is_connection: bool,
    pub location: ErrorLocation,
}

impl TransportError {
    /// Create from reqwest error, keeping the timeout/connect categorization.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        TransportError {
            message: error.to_string(),
            is_timeout: error.is_timeout(),
            is_connection: error.is_connect(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        TransportError::from_reqwest(&error)
    }
}
