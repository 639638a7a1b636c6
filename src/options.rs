//! Per-call request options.
//!
//! Options are applied to the outgoing request, in order, after the client has
//! set its default headers and the auth token. That lets them override any
//! default. A later option wins over an earlier one touching the same header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// Function that edits request headers directly.
pub type HeaderFn = Arc<dyn Fn(&mut HeaderMap) + Send + Sync>;

/// A mutation applied to a single outgoing request.
///
/// # Examples
///
/// ```
/// use yuque::RequestOption;
/// use http::HeaderValue;
///
/// let options = [
///     RequestOption::header("X-Request-Id", "abc-123"),
///     RequestOption::basic_auth("user", "secret"),
///     RequestOption::header_fn(|headers| {
///         headers.append("x-trace", HeaderValue::from_static("1"));
///     }),
///     RequestOption::user_agent("my-tool/1.0"),
/// ];
/// assert_eq!(options.len(), 4);
/// ```
#[derive(Clone)]
pub enum RequestOption {
    /// Sets a header, replacing any existing values.
    Header {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
    /// Appends a header value, keeping existing ones.
    AddHeader {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
    /// Sets several headers, each replacing existing values.
    Headers(Vec<(String, String)>),
    /// Runs a function over the header map.
    HeaderFn(HeaderFn),
    /// Sets HTTP basic credentials.
    BasicAuth {
        /// User name
        username: String,
        /// Password
        password: String,
    },
    /// Overrides the client's user agent.
    UserAgent(String),
}

impl RequestOption {
    /// Sets `name` to `value`.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Appends `value` to `name`.
    pub fn add_header(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::AddHeader {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Sets every pair in `headers`.
    pub fn headers<K, V>(headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestOption::Headers(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Hands the header map to `f`.
    pub fn header_fn<F>(f: F) -> Self
    where
        F: Fn(&mut HeaderMap) + Send + Sync + 'static,
    {
        RequestOption::HeaderFn(Arc::new(f))
    }

    /// Sends `Authorization: Basic ...` with the given credentials.
    pub fn basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
        RequestOption::BasicAuth {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Replaces the `User-Agent` header.
    pub fn user_agent(user_agent: impl Into<String>) -> Self {
        RequestOption::UserAgent(user_agent.into())
    }

    /// Applies this option to `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] for an invalid header name or value.
    pub fn apply(&self, request: &mut reqwest::Request) -> Result<()> {
        let headers = request.headers_mut();
        match self {
            RequestOption::Header { name, value } => {
                headers.insert(header_name(name)?, header_value(value)?);
            }
            RequestOption::AddHeader { name, value } => {
                headers.append(header_name(name)?, header_value(value)?);
            }
            RequestOption::Headers(pairs) => {
                for (name, value) in pairs {
                    headers.insert(header_name(name)?, header_value(value)?);
                }
            }
            RequestOption::HeaderFn(f) => f(headers),
            RequestOption::BasicAuth { username, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                let mut value = header_value(&format!("Basic {}", encoded))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            RequestOption::UserAgent(user_agent) => {
                headers.insert(USER_AGENT, header_value(user_agent)?);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestOption::Header { name, value } => f
                .debug_struct("Header")
                .field("name", name)
                .field("value", value)
                .finish(),
            RequestOption::AddHeader { name, value } => f
                .debug_struct("AddHeader")
                .field("name", name)
                .field("value", value)
                .finish(),
            RequestOption::Headers(pairs) => f.debug_tuple("Headers").field(pairs).finish(),
            RequestOption::HeaderFn(_) => f.write_str("HeaderFn(..)"),
            RequestOption::BasicAuth { username, .. } => f
                .debug_struct("BasicAuth")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            RequestOption::UserAgent(ua) => f.debug_tuple("UserAgent").field(ua).finish(),
        }
    }
}

pub(crate) fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))
}

pub(crate) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))
}
