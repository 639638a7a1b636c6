//! Response wrapper that keeps the decoded payload next to the envelope and
//! HTTP details it came from.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successfully decoded API response.
///
/// Derefs to the decoded data, so most callers can treat it like `T`.
///
/// # Examples
///
/// ```no_run
/// use yuque::{Client, Identifier};
/// use yuque::services::docs::ListDocsRequest;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), yuque::Error> {
/// let client = Client::new("my-token")?;
/// let cancel = CancellationToken::new();
///
/// let docs = client
///     .docs()
///     .list(&cancel, Identifier::from("group/book"), &ListDocsRequest::default(), &[])
///     .await?;
///
/// println!("{} of {} docs", docs.docs.len(), docs.total_count);
/// println!("took {:?} over {} attempt(s)", docs.latency, docs.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded `data` field of the envelope.
    pub data: T,

    /// The envelope's `meta.total`, for paginated endpoints.
    pub total: Option<i64>,

    /// The envelope's own `status` field.
    pub envelope_status: Option<i64>,

    /// The envelope's `info` message.
    pub info: String,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until the body was read, retries included.
    pub latency: Duration,

    /// Number of attempts the transport needed.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Maps the response data to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yuque::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response {
    ///     data: vec![1, 2, 3],
    ///     total: Some(3),
    ///     envelope_status: Some(1),
    ///     info: String::new(),
    ///     raw_body: String::new(),
    ///     status: StatusCode::OK,
    ///     headers: HeaderMap::new(),
    ///     latency: Duration::from_millis(5),
    ///     attempts: 1,
    /// };
    ///
    /// let len = response.map(|v| v.len());
    /// assert_eq!(len.data, 3);
    /// assert_eq!(len.total, Some(3));
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            total: self.total,
            envelope_status: self.envelope_status,
            info: self.info,
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Consumes the response, returning only the data.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
