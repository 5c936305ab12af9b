//! HTTP plumbing for the signup workflow.
//!
//! The workflow only sees the [`Transport`] capability. [`HttpTransport`]
//! talks to the network through reqwest, and [`RetryingTransport`] layers the
//! retry/backoff policy on top of any transport so it can be exercised
//! against a scripted fake.

mod http;
mod retry;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub use http::HttpTransport;
pub use retry::{RetryPolicy, RetryingTransport, BACKOFF_MAX};

pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Statuses that the retry policy treats as transient.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Timeout, retry, and header settings for one HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
    pub user_agent: String,
    pub retry_statuses: Vec<StatusCode>,
    pub retry_methods: Vec<Method>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 3,
            backoff: Duration::from_millis(500),
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            retry_statuses: RETRYABLE_STATUSES
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
            retry_methods: vec![Method::GET, Method::POST],
        }
    }
}

impl TransportConfig {
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: self.backoff,
            statuses: self.retry_statuses.clone(),
            methods: self.retry_methods.clone(),
        }
    }
}

/// Build the production client: reqwest transport wrapped in the retry policy.
pub fn make_client(config: &TransportConfig) -> Result<RetryingTransport<HttpTransport>, TransportError> {
    let inner = HttpTransport::new(config)?;
    Ok(RetryingTransport::new(inner, config.retry_policy()))
}

/// One outbound request. The body is already encoded.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Vec<u8>>,
    /// Overrides the client's default timeout for this request only.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn post_json<B: Serialize>(url: impl Into<String>, body: &B) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: Method::POST,
            url: url.into(),
            body: Some(serde_json::to_vec(body)?),
            timeout: None,
        })
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully read response. Status interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("failed to read response: {0}")]
    Read(String),
    #[error("invalid request: {0}")]
    Request(String),
    #[error("unable to build http client: {0}")]
    Builder(String),
}

impl TransportError {
    /// Connection, timeout, and read failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connect(_) | TransportError::Timeout(_) | TransportError::Read(_)
        )
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}
