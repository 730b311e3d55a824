//! Chunked, resumable upload of one local file.
//!
//! # Protocol
//! 1. Stat the file: missing, non-regular or empty files fail before any request
//! 2. Open an upload session for `{library}/{file name}`
//! 3. Stream fixed-size windows in offset order until a read yields no bytes
//!
//! Any rejected window aborts the upload. Nothing is retried and the abandoned
//! session is left for the service to expire.

pub mod chunk;
pub mod session;

pub use chunk::{Chunk, ChunkReader, ContentRange};
pub use session::{ConflictBehavior, UploadSession};

use crate::CHUNK_SIZE;
use crate::auth::AccessToken;
use crate::client::SharePointClient;
use crate::error::upload::UploadError;
use crate::site::SiteId;

use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncRead;

/// Per-upload settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    chunk_size: usize,
    conflict_behavior: Option<ConflictBehavior>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            conflict_behavior: None,
        }
    }
}

impl UploadOptions {
    /// The service only accepts windows that are multiples of [`CHUNK_SIZE`].
    #[track_caller]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, UploadError> {
        if chunk_size == 0 || chunk_size % CHUNK_SIZE != 0 {
            return Err(UploadError::invalid_chunk_size(chunk_size, CHUNK_SIZE));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_conflict_behavior(mut self, conflict_behavior: Option<ConflictBehavior>) -> Self {
        self.conflict_behavior = conflict_behavior;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn conflict_behavior(&self) -> Option<ConflictBehavior> {
        self.conflict_behavior
    }
}

/// Drive item reported by the service when the last window lands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
    pub size: Option<u64>,
}

/// Outcome of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub file_name: String,
    pub bytes_sent: u64,
    pub chunks_sent: usize,
    pub item: Option<DriveItem>,
}

impl SharePointClient {
    /// Upload `file_path` into `library` of the given site.
    ///
    /// The file handle lives only for the streaming loop and is closed on every exit path.
    ///
    /// # Errors
    /// - [`UploadError::Io`], [`UploadError::EmptyFile`] or [`UploadError::InvalidFileName`]
    ///   before any request is made
    /// - [`UploadError::SessionRejected`] if the session cannot be opened; no window is sent
    /// - [`UploadError::ChunkRejected`] on the first rejected window; later windows are not sent
    /// - [`UploadError::Truncated`] if the file shrank while streaming
    pub async fn upload(
        &self,
        token: &AccessToken,
        site_id: &SiteId,
        library: &str,
        file_path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadReport, UploadError> {
        let file_name = file_name_of(file_path)?;

        let metadata = tokio::fs::metadata(file_path)
            .await
            .map_err(|e| UploadError::io(file_path, e))?;
        if !metadata.is_file() {
            return Err(UploadError::io(
                file_path,
                IoError::new(ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let total_size = metadata.len();
        if total_size == 0 {
            return Err(UploadError::empty_file(file_path));
        }

        let session = self
            .create_upload_session(
                token,
                site_id,
                library,
                &file_name,
                options.conflict_behavior(),
            )
            .await?;

        let file = File::open(file_path)
            .await
            .map_err(|e| UploadError::io(file_path, e))?;
        let reader = ChunkReader::new(file, total_size, options.chunk_size());

        self.stream_chunks(&session, reader, file_path, file_name).await
    }

    /// Send every window `reader` yields, in offset order, then check that the
    /// whole declared size went out.
    ///
    /// # Errors
    /// - [`UploadError::ChunkRejected`] on the first rejected window
    /// - [`UploadError::Io`] if a read fails
    /// - [`UploadError::Truncated`] if the source ran dry before its declared size
    pub(crate) async fn stream_chunks<R>(
        &self,
        session: &UploadSession,
        mut reader: ChunkReader<R>,
        file_path: &Path,
        file_name: String,
    ) -> Result<UploadReport, UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let total_size = reader.total_size();
        debug!(
            "Streaming {total_size} bytes in windows of {} bytes",
            reader.chunk_size()
        );

        let mut chunks_sent = 0;
        let mut item = None;
        while let Some(chunk) = reader
            .next_chunk()
            .await
            .map_err(|e| UploadError::io(file_path, e))?
        {
            item = self.put_chunk(session, chunk).await?;
            chunks_sent += 1;
        }

        let bytes_sent = reader.offset();
        if bytes_sent != total_size {
            return Err(UploadError::truncated(file_path, bytes_sent, total_size));
        }

        info!("Uploaded {file_name}: {bytes_sent} bytes in {chunks_sent} chunks");

        Ok(UploadReport {
            file_name,
            bytes_sent,
            chunks_sent,
            item,
        })
    }
}

#[track_caller]
fn file_name_of(path: &Path) -> Result<String, UploadError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UploadError::invalid_file_name(path))
}
