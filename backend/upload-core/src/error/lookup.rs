use crate::error::FailureKind;
use crate::error::transport::TransportError;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LookupError {
    /// The provider collapses bad paths, missing permissions and unknown sites into
    /// one status, so the body is kept for diagnostics.
    #[error("Site Lookup Rejected: {status_line} - {body} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        status_line: String,
        body: String,
        location: ErrorLocation,
    },

    #[error("Site Lookup Response Error: {message} {location}")]
    InvalidResponse {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Transport(TransportError),
}

impl LookupError {
    #[track_caller]
    pub fn rejected(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        LookupError::Rejected {
            status_code: HttpStatusCode::from(status.as_u16()),
            status_line: status.to_string(),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        LookupError::InvalidResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Lookup,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            LookupError::Rejected { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return LookupError::invalid_response(error.to_string());
        }
        LookupError::Transport(TransportError::from_reqwest(&error))
    }
}
