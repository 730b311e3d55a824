//! Upload-session protocol calls: open a session, then PUT windows to it.

use crate::auth::AccessToken;
use crate::client::SharePointClient;
use crate::error::upload::UploadError;
use crate::site::SiteId;
use crate::upload::DriveItem;
use crate::upload::chunk::Chunk;

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// What the service does when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    Fail,
    Replace,
    Rename,
}

impl FromStr for ConflictBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(ConflictBehavior::Fail),
            "replace" => Ok(ConflictBehavior::Replace),
            "rename" => Ok(ConflictBehavior::Rename),
            other => Err(format!(
                "unknown conflict behavior '{other}' (expected fail, replace or rename)"
            )),
        }
    }
}

impl fmt::Display for ConflictBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictBehavior::Fail => write!(f, "fail"),
            ConflictBehavior::Replace => write!(f, "replace"),
            ConflictBehavior::Rename => write!(f, "rename"),
        }
    }
}

#[derive(Serialize)]
struct SessionRequest {
    item: SessionItem,
}

#[derive(Serialize)]
struct SessionItem {
    #[serde(rename = "@microsoft.graph.conflictBehavior")]
    conflict_behavior: ConflictBehavior,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    upload_url: String,
    expiration_date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadProgress {
    #[serde(default)]
    next_expected_ranges: Vec<String>,
}

/// Server-side resumable-upload context. The URL is pre-authenticated and single-use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    upload_url: Url,
}

impl UploadSession {
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }
}

impl SharePointClient {
    /// Open an upload session for `{library}/{file_name}` in the site's default drive.
    ///
    /// Without a conflict behavior no body is sent.
    ///
    /// # Errors
    /// - [`UploadError::SessionRejected`] for any status but 200
    /// - [`UploadError::InvalidResponse`] when `uploadUrl` is missing or not a URL
    /// - [`UploadError::Transport`] when no status was received
    pub async fn create_upload_session(
        &self,
        token: &AccessToken,
        site_id: &SiteId,
        library: &str,
        file_name: &str,
        conflict_behavior: Option<ConflictBehavior>,
    ) -> Result<UploadSession, UploadError> {
        let url = self
            .endpoints()
            .upload_session_url(site_id.as_str(), library, file_name);
        debug!("Creating upload session at {url}");

        let request = self
            .http()
            .post(url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        let request = match conflict_behavior {
            Some(conflict_behavior) => request.json(&SessionRequest {
                item: SessionItem { conflict_behavior },
            }),
            None => request.header(CONTENT_LENGTH, 0),
        };

        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!("Upload session endpoint returned {status}: {body}");
            return Err(UploadError::session_rejected(status, body));
        }

        let payload: SessionResponse = response.json().await?;
        let upload_url = Url::parse(&payload.upload_url).map_err(|e| {
            UploadError::invalid_response(format!("uploadUrl is not a valid URL: {e}"))
        })?;

        info!(
            "Upload session created (expires {})",
            payload.expiration_date_time.as_deref().unwrap_or("unknown")
        );

        Ok(UploadSession { upload_url })
    }

    /// PUT one window to the session URL.
    ///
    /// 200 and 202 are the only accepted statuses. Returns the drive item the
    /// service reports once the last byte is in, if the body decodes as one.
    ///
    /// # Errors
    /// - [`UploadError::ChunkRejected`] for any other status; the session is left as is
    /// - [`UploadError::Transport`] when no status was received
    pub async fn put_chunk(
        &self,
        session: &UploadSession,
        chunk: Chunk,
    ) -> Result<Option<DriveItem>, UploadError> {
        let range = chunk.content_range();
        let length = chunk.len();
        if chunk.is_last() {
            debug!("Uploading final window {range} ({length} bytes)");
        } else {
            debug!("Uploading {range} ({length} bytes)");
        }

        let response = self
            .http()
            .put(session.upload_url().clone())
            .header(CONTENT_LENGTH, length)
            .header(CONTENT_RANGE, range.to_string())
            .body(chunk.into_data())
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::ACCEPTED => {
                if let Ok(progress) = response.json::<UploadProgress>().await {
                    debug!("Next expected ranges: {:?}", progress.next_expected_ranges);
                }
                Ok(None)
            }
            StatusCode::OK => Ok(response.json::<DriveItem>().await.ok()),
            _ => {
                let body = response.text().await.unwrap_or_default();
                debug!("Chunk {range} returned {status}: {body}");
                Err(UploadError::chunk_rejected(range.to_string(), status, body))
            }
        }
    }
}
