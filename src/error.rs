//! Error types for Yuque API calls.
//!
//! Every failure a call can produce is a variant of [`Error`]. The variants
//! fall into a few families: request encoding, transport (network failures and
//! exhausted retries), response decoding, and [`ApiError`], which is the
//! service telling us the call itself failed.

use http::{HeaderMap, StatusCode};
use std::fmt;

/// The main error type for Yuque API calls.
///
/// # Examples
///
/// ```no_run
/// use yuque::{Client, Error};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("my-token")?;
/// let cancel = CancellationToken::new();
///
/// match client.users().current(&cancel, &[]).await {
///     Ok(user) => println!("Hello, {}", user.data.login),
///     Err(Error::Api(api)) => eprintln!("Yuque rejected the call: {}", api.info()),
///     Err(e) if e.is_retryable() => eprintln!("Transient failure: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, reset, DNS failure, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A single attempt exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The caller's cancellation token fired before the call completed.
    #[error("Request cancelled")]
    Cancelled,

    /// The server answered with a status the transport treats as retryable.
    ///
    /// This only surfaces wrapped in [`Error::MaxRetriesExceeded`] once the
    /// retry budget is spent. The body of the failed attempt is kept for
    /// debugging.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The drained response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The service reported a failure through the response envelope.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body was not a valid envelope, or its `data` did not
    /// match the expected type.
    #[error("Failed to decode response (status {status}): {message}")]
    Decode {
        /// The serde error message
        message: String,
        /// The raw response body
        raw_response: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid configuration was provided, such as a malformed header.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// All retry attempts were used up.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made
        attempts: usize,
        /// The failure of the final attempt
        last_error: Box<Error>,
    },

    /// The request payload could not be serialized to JSON or to a query string.
    #[error("Failed to encode request: {0}")]
    Encoding(String),

    /// The request path contains a malformed percent escape.
    #[error("Invalid request path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Maps an error returned while sending a request or reading its body.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }

    /// Returns `true` if the transport would retry this error under the
    /// default policy.
    ///
    /// Network errors, timeouts, 429 and 5xx responses (other than 501) are
    /// retryable. Encoding, decoding and API errors never are.
    ///
    /// # Examples
    ///
    /// ```
    /// use yuque::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     raw_response: "busy".to_string(),
    ///     headers: http::HeaderMap::new(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Encoding("bad payload".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => !(e.is_builder() || e.is_redirect() || e.is_decode()),
            Error::Timeout => true,
            Error::HttpError { status, .. } => crate::retry::is_default_retryable(*status),
            Error::Cancelled
            | Error::Api(_)
            | Error::Decode { .. }
            | Error::ConfigurationError(_)
            | Error::MaxRetriesExceeded { .. }
            | Error::Encoding(_)
            | Error::InvalidPath { .. }
            | Error::InvalidUrl(_) => false,
        }
    }

    /// Returns `true` if this is a structured failure reported by the service.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    /// Returns `true` if the call was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns the structured API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::Decode { status, .. } => Some(*status),
            Error::Api(api) => Some(api.status()),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::Decode { raw_response, .. } => Some(raw_response),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.raw_response(),
            _ => None,
        }
    }
}

/// A failure reported by the Yuque service.
///
/// Built from the response envelope whenever the HTTP status is not `200 OK`,
/// or when a `200 OK` envelope explicitly carries `status: 0`.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    code: Option<i64>,
    info: String,
    headers: HeaderMap,
}

impl ApiError {
    pub(crate) fn new(
        status: StatusCode,
        code: Option<i64>,
        info: impl Into<String>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            status,
            code,
            info: info.into(),
            headers,
        }
    }

    /// The HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The envelope's own `status` field, when the service sent one.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// The envelope's `info` message.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error (status {}): ", self.status.as_u16())?;
        match self.code {
            Some(code) => write!(f, "code: {}, info: {}", code, self.info),
            None => write!(f, "info: {}", self.info),
        }
    }
}

impl std::error::Error for ApiError {}

/// A specialized `Result` type for Yuque API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_includes_info() {
        let err = Error::from(ApiError::new(
            StatusCode::NOT_FOUND,
            Some(404),
            "book not found",
            HeaderMap::new(),
        ));

        assert!(err.is_api_error());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(
            err.to_string(),
            "API error (status 404): code: 404, info: book not found"
        );
    }

    #[test]
    fn exhausted_retries_expose_last_failure() {
        let err = Error::MaxRetriesExceeded {
            attempts: 3,
            last_error: Box::new(Error::HttpError {
                status: StatusCode::BAD_GATEWAY,
                raw_response: "upstream down".to_string(),
                headers: HeaderMap::new(),
            }),
        };

        assert!(!err.is_retryable());
        assert!(!err.is_api_error());
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.raw_response(), Some("upstream down"));
    }

    #[test]
    fn retryable_classification() {
        let too_many = Error::HttpError {
            status: StatusCode::TOO_MANY_REQUESTS,
            raw_response: String::new(),
            headers: HeaderMap::new(),
        };
        assert!(too_many.is_retryable());

        let not_implemented = Error::HttpError {
            status: StatusCode::NOT_IMPLEMENTED,
            raw_response: String::new(),
            headers: HeaderMap::new(),
        };
        assert!(!not_implemented.is_retryable());

        assert!(Error::Timeout.is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(Error::Cancelled.is_cancelled());
    }
}
