//! Credential exchange: client id + secret + tenant for a bearer token.
//!
//! One form-encoded POST per call. No caching and no refresh; a token that
//! expires mid-run makes the later stages fail with an auth status.

use crate::client::SharePointClient;
use crate::error::auth::AuthError;

use common::RedactedSecret;

use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;

const GRANT_TYPE: &str = "client_credentials";

/// Application credentials registered with the identity provider.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: RedactedSecret,
    pub tenant_id: String,
}

/// Bearer token presented on every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(RedactedSecret);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(RedactedSecret::new(token))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl SharePointClient {
    /// Exchange client credentials for an access token.
    ///
    /// Success is exactly HTTP 200 with an `access_token` field.
    ///
    /// # Errors
    /// - [`AuthError::Rejected`] for any other status, carrying the status line
    /// - [`AuthError::InvalidResponse`] when the body has no usable token
    /// - [`AuthError::Transport`] when no status was received
    pub async fn obtain_token(
        &self,
        credentials: &ClientCredentials,
    ) -> Result<AccessToken, AuthError> {
        let url = self.endpoints().token_url(&credentials.tenant_id);
        debug!(
            "Requesting access token for client {} from {url}",
            credentials.client_id
        );

        let form = [
            ("grant_type", GRANT_TYPE),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", self.endpoints().scope()),
        ];

        let response = self.http().post(url).form(&form).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!("Token endpoint returned {status}: {body}");
            return Err(AuthError::rejected(status, body));
        }

        let payload: TokenResponse = response.json().await?;
        if payload.access_token.is_empty() {
            return Err(AuthError::invalid_response("access_token is empty"));
        }

        let token = AccessToken::new(payload.access_token);
        if self.traces_token() {
            debug!("Access token: {}", token.as_str());
        }
        info!("Obtained access token ({} chars)", token.len());

        Ok(token)
    }
}
