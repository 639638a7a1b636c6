//! Endpoint descriptors.

use http::Method;

use crate::options::RequestOption;

/// Everything needed to address one API call, minus the payload.
///
/// `path` is relative to the client's base URL and may contain
/// percent-escaped segments, which are sent as-is.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, relative to the base URL.
    pub path: String,

    /// Per-call options, applied in order.
    pub options: Vec<RequestOption>,
}

impl Endpoint {
    /// Creates an `Endpoint` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            options: Vec::new(),
        }
    }

    /// Shorthand for a GET endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST endpoint.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PUT endpoint.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Shorthand for a DELETE endpoint.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends one option.
    pub fn with_option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Appends several options, keeping their order.
    pub fn with_options(mut self, options: &[RequestOption]) -> Self {
        self.options.extend_from_slice(options);
        self
    }
}
