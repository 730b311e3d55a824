//! Shared building blocks for the SharePoint upload client.
//!
//! This crate holds the small, dependency-light types every other crate
//! needs: error locations, HTTP status codes and secret handling.
//!
//! ## Architecture
//!
//! - **common** (this crate): Leaf types with no network or file access
//! - **upload-core**: Token exchange, site lookup and chunked upload
//! - **spupload**: Binary wiring configuration, logging and exit codes

pub mod error;
pub mod http_status;
pub mod redacted_secret;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
