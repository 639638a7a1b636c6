//! HTTP transport with bounded retries.
//!
//! [`RetryableTransport`] owns the `reqwest` connection pool and executes
//! fully built requests, retrying network failures and retryable statuses
//! according to its [`RetryPolicy`]. It knows nothing about the response
//! envelope.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::rate_limit;
use crate::retry::{RetryEvent, RetryPolicy, RetryReason};
use crate::{Error, Result};

/// A response that made it through the transport.
#[derive(Debug)]
pub struct TransportResponse {
    /// The final response. Its status is not in the policy's retryable set.
    pub response: reqwest::Response,

    /// Number of attempts used.
    pub attempts: usize,

    /// When the first attempt started.
    pub started: Instant,
}

/// Retry-aware HTTP executor, safe to share between tasks.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Examples
///
/// ```no_run
/// use yuque::{Client, RetryableTransport};
/// use yuque::retry::{RetryPolicy, TracingRetryLogger};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), yuque::Error> {
/// let transport = RetryableTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .retry_policy(
///         RetryPolicy::builder()
///             .max_retries(3)
///             .observer(Arc::new(TracingRetryLogger))
///             .build(),
///     )
///     .build()?;
///
/// let client = Client::builder().token("my-token").transport(transport).build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryableTransport {
    http_client: reqwest::Client,
    policy: RetryPolicy,
    timeout: Option<Duration>,
}

impl RetryableTransport {
    /// Creates a transport with the default policy and a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Creates a new builder.
    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes `request`, retrying transient failures.
    ///
    /// Cancellation is checked before every attempt and raced against every
    /// send, body drain and backoff sleep.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] as soon as `cancel` fires.
    /// - [`Error::MaxRetriesExceeded`] when a retryable failure outlives the
    ///   retry budget; it wraps the last failure.
    /// - [`Error::Network`] for failures the policy does not retry.
    pub async fn execute(
        &self,
        request: reqwest::Request,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let started = Instant::now();
        let method = request.method().clone();
        let url = request.url().to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;

            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            // Streaming bodies cannot be replayed; those requests get one shot.
            let Some(this_attempt) = request.try_clone() else {
                let response = self.send(request, cancel, attempt).await?;
                return Ok(TransportResponse {
                    response,
                    attempts: attempt,
                    started,
                });
            };

            let failure = match self.send(this_attempt, cancel, attempt).await {
                Ok(response) if !self.policy.is_retryable_status(response.status()) => {
                    return Ok(TransportResponse {
                        response,
                        attempts: attempt,
                        started,
                    });
                }
                Ok(response) => drain(response, cancel).await?,
                Err(e) if self.policy.is_retryable_error(&e) => e,
                Err(e) => return Err(e),
            };

            let delay = match self.next_delay(attempt, &failure, started.elapsed()) {
                Some(delay) => delay,
                None => {
                    return Err(Error::MaxRetriesExceeded {
                        attempts: attempt,
                        last_error: Box::new(failure),
                    });
                }
            };

            let event = RetryEvent {
                method: method.clone(),
                url: url.clone(),
                attempt,
                delay,
                reason: RetryReason::from_error(&failure),
            };
            tracing::debug!(
                method = %event.method,
                url = %event.url,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                reason = %event.reason,
                "Scheduling retry"
            );
            self.policy.notify(&event);

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Sends a single attempt.
    async fn send(
        &self,
        mut request: reqwest::Request,
        cancel: &CancellationToken,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        if let Some(timeout) = self.timeout {
            *request.timeout_mut() = Some(timeout);
        }

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            attempt = attempt,
            "Executing HTTP request"
        );

        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.http_client.execute(request) => result.map_err(Error::from_send),
        }
    }

    /// Picks the wait before the next attempt, or `None` when the budget is spent.
    fn next_delay(&self, attempt: usize, failure: &Error, elapsed: Duration) -> Option<Duration> {
        let scheduled = self.policy.delay_for_attempt(attempt)?;

        let delay = match failure {
            Error::HttpError {
                status, headers, ..
            } => rate_limit::server_delay(*status, headers, self.policy.max_delay())
                .unwrap_or(scheduled),
            _ => scheduled,
        };

        if self.policy.exceeds_budget(elapsed, delay) {
            return None;
        }
        Some(delay)
    }
}

/// Reads a failed response to the end so its connection can be reused,
/// keeping the body for the error.
async fn drain(response: reqwest::Response, cancel: &CancellationToken) -> Result<Error> {
    let status = response.status();
    let headers = response.headers().clone();

    let raw_response = tokio::select! {
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        body = response.text() => body.unwrap_or_default(),
    };

    Ok(Error::HttpError {
        status,
        raw_response,
        headers,
    })
}

/// Builder for [`RetryableTransport`].
#[derive(Debug, Default)]
pub struct TransportBuilder {
    http_client: Option<reqwest::Client>,
    policy: Option<RetryPolicy>,
    timeout: Option<Duration>,
}

impl TransportBuilder {
    /// Uses an existing `reqwest` client instead of building one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the timeout for each individual attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<RetryableTransport> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        Ok(RetryableTransport {
            http_client,
            policy: self.policy.unwrap_or_default(),
            timeout: self.timeout,
        })
    }
}
