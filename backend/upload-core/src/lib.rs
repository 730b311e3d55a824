pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod site;
pub mod upload;

#[cfg(test)]
mod tests;

pub use auth::{AccessToken, ClientCredentials};
pub use client::SharePointClient;
pub use config::{Endpoints, UploadConfig};
pub use error::{CoreError, FailureKind};
pub use pipeline::run;
pub use site::SiteId;
pub use upload::{UploadOptions, UploadReport};

pub const AUTHORITY_HOST: &str = "login.microsoftonline.com";
pub const GRAPH_HOST: &str = "graph.microsoft.com";
pub const DEFAULT_AUTHORITY_URL: &str = const_format::concatcp!("https://", AUTHORITY_HOST);
pub const DEFAULT_GRAPH_URL: &str = const_format::concatcp!("https://", GRAPH_HOST, "/v1.0");
pub const DEFAULT_TOKEN_SCOPE: &str = const_format::concatcp!("https://", GRAPH_HOST, "/.default");

/// Window size mandated by the upload-session protocol; every chunk but the last
/// must be a multiple of it.
pub const CHUNK_SIZE: usize = 320 * 1024;

/// Local file uploaded when `UPLOAD_FILE_PATH` is not configured.
pub const DEFAULT_FILE_PATH: &str = "file.txt";
