use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use super::{Transport, TransportError, TransportRequest, TransportResponse};

/// Upper bound for any single wait between attempts.
pub const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Which failures are retried, how often, and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub retries: u32,
    pub backoff: Duration,
    pub statuses: Vec<StatusCode>,
    pub methods: Vec<Method>,
}

impl RetryPolicy {
    /// Total attempts allowed for `method`, initial try included.
    pub fn max_attempts(&self, method: &Method) -> u32 {
        if self.methods.contains(method) {
            self.retries.saturating_add(1)
        } else {
            1
        }
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status)
    }

    /// Delay before retry `retry_number` (1-based): `backoff * 2^(n-1)`.
    pub fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(16);
        self.backoff
            .saturating_mul(1u32 << shift)
            .min(BACKOFF_MAX)
    }
}

/// Decorator applying a [`RetryPolicy`] to any [`Transport`].
///
/// A retryable status on the final attempt is handed back to the caller
/// unchanged; only transport failures are returned as errors.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T> Transport for RetryingTransport<T>
where
    T: Transport,
{
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let attempts = self.policy.max_attempts(&request.method);
        let mut attempt = 1;

        loop {
            let delay = match self.inner.send(request).await {
                Ok(response)
                    if attempt < attempts && self.policy.is_retryable_status(response.status) =>
                {
                    let delay = response
                        .retry_after
                        .map(|wait| wait.min(BACKOFF_MAX))
                        .unwrap_or_else(|| self.policy.backoff_delay(attempt));
                    warn!(
                        attempt,
                        status = %response.status,
                        url = %request.url,
                        delay_ms = delay.as_millis() as u64,
                        "retryable status, backing off"
                    );
                    delay
                }
                Ok(response) => return Ok(response),
                Err(err) if attempt < attempts && err.is_retryable() => {
                    let delay = self.policy.backoff_delay(attempt);
                    warn!(
                        attempt,
                        error = %err,
                        url = %request.url,
                        delay_ms = delay.as_millis() as u64,
                        "transport failure, backing off"
                    );
                    delay
                }
                Err(err) => {
                    debug!(attempt, error = %err, "giving up on request");
                    return Err(err);
                }
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}
