//! Fake transport for testing
//!
//! Serves fixture strings keyed by exact URL instead of real HTTP calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::runs::transport::{error_message, HttpTransport};
use crate::runs::types::RepoError;

#[derive(Debug, Clone)]
enum FakeResponse {
    Body(String),
    Status(u16, String),
    Network(String),
}

/// Fake transport for testing (uses fixture strings)
///
/// Unregistered URLs answer 404 the way GitHub does.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: HashMap<String, FakeResponse>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 200 and `body`
    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.routes
            .insert(url.to_string(), FakeResponse::Body(body.to_string()));
        self
    }

    /// Answer `url` with a non-2xx status and `body`
    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            FakeResponse::Status(status, body.to_string()),
        );
        self
    }

    /// Fail `url` as if the connection dropped
    pub fn with_network_error(mut self, url: &str, msg: &str) -> Self {
        self.routes
            .insert(url.to_string(), FakeResponse::Network(msg.to_string()));
        self
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Headers sent with the most recent request
    pub fn last_headers(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, RepoError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));

        match self.routes.get(url) {
            Some(FakeResponse::Body(body)) => Ok(body.clone()),
            Some(FakeResponse::Status(status, body)) => Err(RepoError::from_status(
                *status,
                error_message(*status, body),
            )),
            Some(FakeResponse::Network(msg)) => Err(RepoError::Network(msg.clone())),
            None => Err(RepoError::NotFound("Not Found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_transport_basic() {
        let transport = FakeTransport::new().with_body("http://test/a", "test response");
        let result = transport.get("http://test/a", &[]).await;
        assert_eq!(result.unwrap(), "test response");
    }

    #[tokio::test]
    async fn test_fake_transport_unknown_url_is_not_found() {
        let transport = FakeTransport::new();
        let result = transport.get("http://test/missing", &[]).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fake_transport_status_and_network() {
        let transport = FakeTransport::new()
            .with_status("http://test/a", 401, r#"{"message":"Bad credentials"}"#)
            .with_network_error("http://test/b", "connection reset");

        match transport.get("http://test/a", &[]).await {
            Err(RepoError::Unauthorized(msg)) => assert_eq!(msg, "Bad credentials"),
            other => panic!("expected unauthorized, got {:?}", other),
        }
        assert!(matches!(
            transport.get("http://test/b", &[]).await,
            Err(RepoError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_fake_transport_records_requests() {
        let transport = FakeTransport::new().with_body("http://test/a", "{}");
        let _ = transport.get("http://test/a", &[("Accept", "json")]).await;
        let _ = transport.get("http://test/b", &[]).await;

        assert_eq!(
            transport.requested_urls(),
            vec!["http://test/a".to_string(), "http://test/b".to_string()]
        );
        assert!(transport.last_headers().is_empty());
    }
}
