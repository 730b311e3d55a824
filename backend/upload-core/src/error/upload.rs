//! Error types for the chunked upload stage.
//!
//! - Session and chunk rejections keep the HTTP status code and status line
//! - Chunk rejections record the Content-Range that failed
//! - Local file problems keep the path and the underlying io::Error

use crate::error::FailureKind;
use crate::error::transport::TransportError;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum UploadError {
    #[error("Upload Session Rejected: {status_line} {location}")]
    SessionRejected {
        status_code: HttpStatusCode,
        status_line: String,
        body: String,
        location: ErrorLocation,
    },

    #[error("Chunk Upload Rejected: {status_line} for {range} {location}")]
    ChunkRejected {
        range: String,
        status_code: HttpStatusCode,
        status_line: String,
        body: String,
        location: ErrorLocation,
    },

    #[error("Upload Session Response Error: {message} {location}")]
    InvalidResponse {
        message: String,
        location: ErrorLocation,
    },

    #[error("File Error: {}: {source} {location}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Empty File Error: {} has no bytes to upload {location}", .path.display())]
    EmptyFile {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Truncated File Error: {} ended at byte {sent} of {expected} {location}", .path.display())]
    Truncated {
        path: PathBuf,
        sent: u64,
        expected: u64,
        location: ErrorLocation,
    },

    #[error("Invalid File Name Error: {} has no usable file name {location}", .path.display())]
    InvalidFileName {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Invalid Chunk Size Error: {size} is not a positive multiple of {multiple} {location}")]
    InvalidChunkSize {
        size: usize,
        multiple: usize,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Transport(TransportError),
}

impl UploadError {
    #[track_caller]
    pub fn session_rejected(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        UploadError::SessionRejected {
            status_code: HttpStatusCode::from(status.as_u16()),
            status_line: status.to_string(),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn chunk_rejected(
        range: impl Into<String>,
        status: reqwest::StatusCode,
        body: impl Into<String>,
    ) -> Self {
        UploadError::ChunkRejected {
            range: range.into(),
            status_code: HttpStatusCode::from(status.as_u16()),
            status_line: status.to_string(),
            body: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        UploadError::InvalidResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        UploadError::Io {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn empty_file(path: &Path) -> Self {
        UploadError::EmptyFile {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn truncated(path: &Path, sent: u64, expected: u64) -> Self {
        UploadError::Truncated {
            path: path.to_path_buf(),
            sent,
            expected,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_file_name(path: &Path) -> Self {
        UploadError::InvalidFileName {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_chunk_size(size: usize, multiple: usize) -> Self {
        UploadError::InvalidChunkSize {
            size,
            multiple,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            UploadError::SessionRejected { .. } | UploadError::InvalidResponse { .. } => {
                FailureKind::Session
            }
            UploadError::ChunkRejected { .. } => FailureKind::Chunk,
            UploadError::Io { .. }
            | UploadError::EmptyFile { .. }
            | UploadError::Truncated { .. }
            | UploadError::InvalidFileName { .. } => FailureKind::Io,
            UploadError::InvalidChunkSize { .. } => FailureKind::Config,
            UploadError::Transport(_) => FailureKind::Transport,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            UploadError::SessionRejected { status_code, .. } => Some(status_code.0),
            UploadError::ChunkRejected { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UploadError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return UploadError::invalid_response(error.to_string());
        }
        UploadError::Transport(TransportError::from_reqwest(&error))
    }
}
