pub mod auth;
pub mod config;
pub mod lookup;
pub mod transport;
pub mod upload;

pub use auth::AuthError;
pub use config::ConfigError;
pub use lookup::LookupError;
pub use transport::TransportError;
pub use upload::UploadError;

use thiserror::Error;

/// Everything the orchestrator can stop on. Each stage's error passes through unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure taxonomy used for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Auth,
    Lookup,
    Session,
    Chunk,
    Io,
    Transport,
}

impl FailureKind {
    /// Human-readable stage name for the diagnostic line.
    pub fn stage(&self) -> &'static str {
        match self {
            FailureKind::Config => "loading configuration",
            FailureKind::Auth => "getting access token",
            FailureKind::Lookup => "getting site ID",
            FailureKind::Session => "creating upload session",
            FailureKind::Chunk => "uploading file chunk",
            FailureKind::Io => "reading local file",
            FailureKind::Transport => "contacting remote service",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Config => "config",
            FailureKind::Auth => "auth",
            FailureKind::Lookup => "lookup",
            FailureKind::Session => "session",
            FailureKind::Chunk => "chunk",
            FailureKind::Io => "io",
            FailureKind::Transport => "transport",
        };
        write!(f, "{name}")
    }
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::Config(_) => FailureKind::Config,
            CoreError::Auth(e) => e.kind(),
            CoreError::Lookup(e) => e.kind(),
            CoreError::Upload(e) => e.kind(),
            CoreError::Transport(_) => FailureKind::Transport,
        }
    }
}
