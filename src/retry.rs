//! Retry policy for the transport.
//!
//! A [`RetryPolicy`] decides which failures are worth another attempt and how
//! long to wait before it. Waits grow exponentially from `min_delay` up to
//! `max_delay`, with optional jitter, and the whole call can be bounded by a
//! total time budget.

use crate::Error;
use http::{Method, StatusCode};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Statuses retried when no explicit set is configured.
const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 10] = [429, 500, 502, 503, 504, 505, 506, 507, 508, 511];

/// Returns `true` for 429 and every 5xx except 501 Not Implemented.
pub(crate) fn is_default_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

/// Why an attempt is being retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    /// The server answered with a retryable status.
    Status(StatusCode),
    /// The attempt timed out.
    Timeout,
    /// The connection failed.
    Network(String),
}

impl RetryReason {
    pub(crate) fn from_error(error: &Error) -> Self {
        match error {
            Error::HttpError { status, .. } => RetryReason::Status(*status),
            Error::Timeout => RetryReason::Timeout,
            other => RetryReason::Network(other.to_string()),
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::Status(status) => write!(f, "status {}", status.as_u16()),
            RetryReason::Timeout => f.write_str("timeout"),
            RetryReason::Network(msg) => write!(f, "network error: {}", msg),
        }
    }
}

/// A retry that is about to happen.
#[derive(Debug, Clone)]
pub struct RetryEvent {
    /// HTTP method of the request.
    pub method: Method,
    /// Full request URL.
    pub url: String,
    /// The attempt that just failed (1-indexed).
    pub attempt: usize,
    /// How long the transport will wait before the next attempt.
    pub delay: Duration,
    /// What went wrong.
    pub reason: RetryReason,
}

/// Observer notified of every retry the transport schedules.
///
/// Only retries are reported, never final outcomes.
///
/// # Examples
///
/// ```
/// use yuque::retry::{RetryEvent, RetryObserver, RetryPolicy};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct CountRetries(AtomicUsize);
///
/// impl RetryObserver for CountRetries {
///     fn on_retry(&self, _event: &RetryEvent) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let policy = RetryPolicy::builder()
///     .observer(Arc::new(CountRetries::default()))
///     .build();
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called right before the transport sleeps ahead of another attempt.
    fn on_retry(&self, event: &RetryEvent);
}

/// Observer that reports retries through `tracing` at `WARN` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRetryLogger;

impl RetryObserver for TracingRetryLogger {
    fn on_retry(&self, event: &RetryEvent) {
        tracing::warn!(
            method = %event.method,
            url = %event.url,
            attempt = event.attempt,
            delay_ms = event.delay.as_millis() as u64,
            reason = %event.reason,
            "Retrying request"
        );
    }
}

/// Bounded exponential backoff with jitter.
///
/// # Default Configuration
///
/// - `max_retries`: 5 attempts in total
/// - `min_delay`: 1s
/// - `max_delay`: 30s
/// - `max_elapsed`: none
/// - `jitter`: enabled
/// - retryable statuses: 429 and 5xx except 501
///
/// # Examples
///
/// ```
/// use yuque::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_retries(2)
///     .min_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(2))
///     .retryable_status_codes([429, 503])
///     .build();
///
/// assert_eq!(policy.max_retries(), 2);
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    min_delay: Duration,
    max_delay: Duration,
    max_elapsed: Option<Duration>,
    jitter: bool,
    retryable_status_codes: Vec<StatusCode>,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_elapsed: None,
            jitter: true,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
            observer: None,
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("max_elapsed", &self.max_elapsed)
            .field("jitter", &self.jitter)
            .field("retryable_status_codes", &self.retryable_status_codes)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RetryPolicy {
    /// Creates a builder starting from the default policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            policy: RetryPolicy::default(),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Cap on attempts per call, the first one included.
    ///
    /// 0 is treated as 1: the request is always sent once.
    pub fn max_retries(&self) -> usize {
        self.max_retries.max(1)
    }

    /// Upper bound for a single backoff wait.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Whether the transport retries responses with this status.
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Whether a failed attempt is worth retrying at all.
    pub fn is_retryable_error(&self, error: &Error) -> bool {
        match error {
            Error::HttpError { status, .. } => self.is_retryable_status(*status),
            Error::Network(_) | Error::Timeout => error.is_retryable(),
            _ => false,
        }
    }

    /// Returns the backoff after attempt number `attempt` has failed
    /// (1 = the first attempt), or `None` if no attempt is left.
    ///
    /// The base delay is `min_delay * 2^(attempt - 1)`, capped at `max_delay`.
    /// Jitter scales it into 50%–100% of that value without going below
    /// `min_delay`.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_retries() {
            return None;
        }

        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1) as u32);
        let delay = self.min_delay.saturating_mul(multiplier).min(self.max_delay);

        if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
            Some(delay.mul_f64(jitter_factor).max(self.min_delay.min(delay)))
        } else {
            Some(delay)
        }
    }

    /// Returns `true` if sleeping `delay` would blow the total time budget.
    pub(crate) fn exceeds_budget(&self, elapsed: Duration, delay: Duration) -> bool {
        match self.max_elapsed {
            Some(budget) => elapsed.saturating_add(delay) > budget,
            None => false,
        }
    }

    pub(crate) fn notify(&self, event: &RetryEvent) {
        if let Some(observer) = &self.observer {
            observer.on_retry(event);
        }
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Caps the attempts per call, the first one included.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    /// Sets the wait before the first retry.
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.policy.min_delay = delay;
        self
    }

    /// Sets the cap for a single wait, including server `Retry-After` hints.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    /// Bounds the total time spent on one call, waits included.
    pub fn max_elapsed(mut self, budget: Duration) -> Self {
        self.policy.max_elapsed = Some(budget);
        self
    }

    /// Enables or disables jitter.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.policy.jitter = jitter;
        self
    }

    /// Replaces the set of statuses that trigger a retry.
    ///
    /// Codes that are not valid HTTP statuses are ignored.
    pub fn retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.policy.retryable_status_codes = codes
            .into_iter()
            .filter_map(|code| StatusCode::from_u16(code).ok())
            .collect();
        self
    }

    /// Installs an observer for retry events.
    pub fn observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.policy.observer = Some(observer);
        self
    }

    /// Builds the policy.
    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryPolicy {
        RetryPolicy::builder()
            .min_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(1))
            .max_retries(6)
            .jitter(false)
            .build()
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let policy = no_jitter();

        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(400)));
        assert_eq!(policy.delay_for_attempt(4), Some(Duration::from_millis(800)));
        assert_eq!(policy.delay_for_attempt(5), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_for_attempt(6), None);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = RetryPolicy::builder()
            .min_delay(Duration::from_millis(100))
            .max_delay(Duration::from_secs(10))
            .max_retries(4)
            .build();

        for _ in 0..50 {
            let delay = policy.delay_for_attempt(3).unwrap();
            assert!(delay >= Duration::from_millis(199), "{:?}", delay);
            assert!(delay <= Duration::from_millis(400), "{:?}", delay);

            let first = policy.delay_for_attempt(1).unwrap();
            assert_eq!(first, Duration::from_millis(100));
        }
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_retries(), 1);
        assert_eq!(policy.delay_for_attempt(1), None);
    }

    #[test]
    fn test_max_retries_caps_total_attempts() {
        let policy = RetryPolicy::builder()
            .max_retries(2)
            .jitter(false)
            .build();

        assert!(policy.delay_for_attempt(1).is_some());
        assert_eq!(policy.delay_for_attempt(2), None);

        let zero = RetryPolicy::builder().max_retries(0).build();
        assert_eq!(zero.max_retries(), 1);
        assert_eq!(zero.delay_for_attempt(1), None);
    }

    #[test]
    fn test_default_statuses() {
        let policy = RetryPolicy::default();

        assert!(policy.is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(policy.is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(policy.is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!policy.is_retryable_status(StatusCode::NOT_IMPLEMENTED));
        assert!(!policy.is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!policy.is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_custom_statuses() {
        let policy = RetryPolicy::builder().retryable_status_codes([418]).build();

        assert!(policy.is_retryable_status(StatusCode::IM_A_TEAPOT));
        assert!(!policy.is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_elapsed_budget() {
        let policy = RetryPolicy::builder()
            .max_elapsed(Duration::from_secs(1))
            .build();

        assert!(!policy.exceeds_budget(Duration::from_millis(200), Duration::from_millis(500)));
        assert!(policy.exceeds_budget(Duration::from_millis(800), Duration::from_millis(500)));
        assert!(!no_jitter().exceeds_budget(Duration::from_secs(3600), Duration::from_secs(1)));
    }
}
