//! Site lookup: `{hostname}:/{site_path}` to the opaque site identifier.

use crate::auth::AccessToken;
use crate::client::SharePointClient;
use crate::error::lookup::LookupError;

use std::fmt;

use log::{debug, error, info};
use reqwest::StatusCode;
use serde::Deserialize;

/// Opaque identifier of the destination site, e.g.
/// `contoso.sharepoint.com,{site-collection-guid},{web-guid}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
struct SiteResponse {
    id: String,
}

impl SharePointClient {
    /// Resolve a site's identifier from its hostname and server-relative path.
    ///
    /// # Errors
    /// - [`LookupError::Rejected`] for any status but 200. The body is logged and kept,
    ///   since a bad path, a missing permission and an unknown site look alike otherwise.
    /// - [`LookupError::InvalidResponse`] when the body has no `id`
    /// - [`LookupError::Transport`] when no status was received
    pub async fn resolve_site_id(
        &self,
        token: &AccessToken,
        hostname: &str,
        site_path: &str,
    ) -> Result<SiteId, LookupError> {
        let url = self.endpoints().site_url(hostname, site_path);
        debug!("Looking up site at {url}");

        let response = self
            .http()
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("Error response body: {body}");
            return Err(LookupError::rejected(status, body));
        }

        let site: SiteResponse = response.json().await?;
        if site.id.is_empty() {
            return Err(LookupError::invalid_response("id is empty"));
        }

        info!("Resolved site {hostname}:/{site_path} to {}", site.id);
        Ok(SiteId(site.id))
    }
}
