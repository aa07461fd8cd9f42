//! Status report dispatch over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::ReportConfig;
use crate::protocol::StatusUpdate;

/// Build an HTTP client with proper timeout configuration.
fn build_http_client(config: &ReportConfig) -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .expect("Failed to build HTTP client")
}

/// Errors from report delivery.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("report request failed: {0}")]
    RequestFailed(String),
    #[error("report endpoint returned HTTP {status}")]
    Http { status: u16 },
    #[error("report request timed out")]
    Timeout,
}

/// Delivery seam for status reports.
///
/// The scanner pipeline only knows this trait; swapping in a retrying or
/// batching implementation does not touch the scanning side.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Deliver one status update.
    async fn report(&self, update: &StatusUpdate) -> Result<(), DispatchError>;
}

/// Reporter that POSTs each update as a JSON body to a fixed endpoint.
///
/// One request per update, no retries, response body ignored.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: Client,
    endpoint: Url,
}

impl HttpReporter {
    #[must_use]
    pub fn new(endpoint: Url, config: &ReportConfig) -> Self {
        Self {
            client: build_http_client(config),
            endpoint,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(&self, update: &StatusUpdate) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(update)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout
                } else {
                    DispatchError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
