//! HTTP implementation of the remote status source.
//!
//! Consumes the platform's single documented endpoint,
//! `GET {api_base}/maintenance/status`, with a 5-second client timeout and
//! no credentials. Every failure mode maps to a [`SourceError`] variant;
//! the store treats them all the same.

use std::time::Duration;

use vestibule_core::error::SourceError;
use vestibule_core::source::{RemoteStatus, StatusSource};

/// Client-side timeout on the status request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches maintenance state from the platform API.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    /// Build a source for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest` error when the client cannot be
    /// constructed.
    pub fn new(api_base: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let url = format!("{}/maintenance/status", api_base.trim_end_matches('/'));
        Ok(Self { client, url })
    }

    /// The full status URL this source polls.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<RemoteStatus, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout {
                        timeout_secs: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    SourceError::Network {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<RemoteStatus>()
            .await
            .map_err(|e| SourceError::Malformed {
                reason: e.to_string(),
            })
    }
}
