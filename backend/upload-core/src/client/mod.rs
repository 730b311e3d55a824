use crate::config::{Endpoints, UploadConfig};
use crate::error::transport::TransportError;

use std::time::Duration;

use reqwest::Client;

/// HTTP client plus the endpoints every stage addresses.
///
/// The stages themselves live next to their data: `auth`, `site` and `upload`
/// each add their calls to this type.
#[derive(Clone)]
pub struct SharePointClient {
    client: Client,
    endpoints: Endpoints,
    trace_token: bool,
}

impl SharePointClient {
    pub fn new(endpoints: Endpoints) -> Result<Self, TransportError> {
        Self::with_timeout(endpoints, None)
    }

    /// `timeout` bounds each whole request; `None` keeps the transport default.
    pub fn with_timeout(
        endpoints: Endpoints,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoints,
            trace_token: false,
        })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self, TransportError> {
        Ok(Self::with_timeout(config.endpoints.clone(), config.request_timeout)?
            .with_token_trace(config.trace_token))
    }

    /// Echo obtained tokens at debug level.
    pub fn with_token_trace(mut self, enabled: bool) -> Self {
        self.trace_token = enabled;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn traces_token(&self) -> bool {
        self.trace_token
    }
}
