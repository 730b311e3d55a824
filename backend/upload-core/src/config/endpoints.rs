//! Remote endpoint addressing for the identity provider and the Graph API.

use super::{AUTHORITY_URL_VAR, GRAPH_URL_VAR};
use crate::error::config::ConfigError;
use crate::DEFAULT_TOKEN_SCOPE;

use common::ErrorLocation;

use std::panic::Location;

use url::Url;

const TOKEN_PATH: [&str; 3] = ["oauth2", "v2.0", "token"];
const SITES_SEGMENT: &str = "sites";
const DRIVE_SEGMENT: &str = "drive";
const DRIVE_ROOT_SEGMENT: &str = "root:";
const CREATE_UPLOAD_SESSION_SEGMENT: &str = "createUploadSession";

/// Base URLs and token scope used to build every request URL.
///
/// Both bases are guaranteed to be http(s) URLs that can carry path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    authority: Url,
    graph: Url,
    scope: String,
}

impl Endpoints {
    #[track_caller]
    pub fn new(authority: &str, graph: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            authority: parse_base(AUTHORITY_URL_VAR, authority)?,
            graph: parse_base(GRAPH_URL_VAR, graph)?,
            scope: DEFAULT_TOKEN_SCOPE.to_string(),
        })
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// `{authority}/{tenant}/oauth2/v2.0/token`
    pub fn token_url(&self, tenant_id: &str) -> Url {
        with_segments(
            &self.authority,
            std::iter::once(tenant_id).chain(TOKEN_PATH),
        )
    }

    /// `{graph}/sites/{hostname}:/{site_path}`
    pub fn site_url(&self, hostname: &str, site_path: &str) -> Url {
        let host_key = format!("{hostname}:");
        with_segments(
            &self.graph,
            [SITES_SEGMENT, host_key.as_str()]
                .into_iter()
                .chain(split_path(site_path)),
        )
    }

    /// `{graph}/sites/{site_id}/drive/root:/{library}/{file_name}:/createUploadSession`
    pub fn upload_session_url(&self, site_id: &str, library: &str, file_name: &str) -> Url {
        let file_key = format!("{file_name}:");
        with_segments(
            &self.graph,
            [SITES_SEGMENT, site_id, DRIVE_SEGMENT, DRIVE_ROOT_SEGMENT]
                .into_iter()
                .chain(split_path(library))
                .chain([file_key.as_str(), CREATE_UPLOAD_SESSION_SEGMENT]),
        )
    }
}

#[track_caller]
fn parse_base(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let location = ErrorLocation::from(Location::caller());
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        location,
        name,
        reason: format!("{raw}: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            location,
            name,
            reason: format!("{raw}: expected an http(s) base URL"),
        });
    }

    Ok(url)
}

/// Non-empty `/`-separated segments of a site path or library name.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Appends percent-encoded path segments to a base URL.
fn with_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    // `parse_base` rejects cannot-be-a-base URLs
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
