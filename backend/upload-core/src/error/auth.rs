use crate::error::FailureKind;
use crate::error::transport::TransportError;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Token Request Rejected: {status_line} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        status_line: String,
        body: String,
        location: ErrorLocation,
    },

    #[error("Token Response Error: {message} {location}")]
    InvalidResponse {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Transport(TransportError),
}

impl AuthError {
    #[track_caller]
    pub fn rejected(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        AuthError::Rejected {
            status_code: HttpStatusCode::from(status.as_u16()),
            status_line: status.to_string(),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        AuthError::InvalidResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Auth,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return AuthError::invalid_response(error.to_string());
        }
        AuthError::Transport(TransportError::from_reqwest(&error))
    }
}
