use common::ErrorLocation;

use thiserror::Error;

/// Errors raised by the binary itself, outside the upload pipeline.
#[derive(Debug, Error)]
pub enum SpUploadError {
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}
