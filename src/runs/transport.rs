//! HTTP transport for the GitHub repository
//!
//! Async client built on reqwest. The trait exists so response decoding can
//! be exercised with FakeTransport.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::runs::types::RepoError;

/// Async HTTP GET returning the response body
///
/// Non-2xx responses are mapped through `RepoError::from_status`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, RepoError>;
}

/// Real HTTP transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Default request timeout
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create new transport with default timeout (30s)
    pub fn new() -> Result<Self, RepoError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, RepoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, RepoError> {
        debug!("[HTTP] GET {}", url);
        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("[HTTP] response: status={}", status);

        let body = response.text().await.map_err(RepoError::from);
        classify_response(status.as_u16(), body)
    }
}

/// Combine status and body read into the transport result
///
/// A non-2xx status wins over a failed body read.
pub(crate) fn classify_response(
    status: u16,
    body: Result<String, RepoError>,
) -> Result<String, RepoError> {
    if (200..300).contains(&status) {
        return body;
    }
    let body = body.unwrap_or_default();
    Err(RepoError::from_status(status, error_message(status, &body)))
}

/// Pull `message` out of a GitHub error body, falling back to the raw text
pub(crate) fn error_message(status: u16, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("HTTP {}", status),
    }
}
