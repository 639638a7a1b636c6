//! The Yuque API client.
//!
//! [`Client`] ties the pieces together: it builds the request, hands it to
//! the [`RetryableTransport`] and decodes the envelope. Use [`ClientBuilder`]
//! to configure one.

use crate::endpoint::Endpoint;
use crate::retry::RetryPolicy;
use crate::services::{
    DocService, GroupService, RepoService, SearchService, StatisticService, UserService,
};
use crate::transport::RetryableTransport;
use crate::{Error, Response, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://www.yuque.com/api/v2/";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "yuque-rs";

/// Header carrying the API token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// A client for the Yuque REST API.
///
/// Configuration is fixed once built; the client is cheap to clone and can be
/// shared across tasks.
///
/// # Examples
///
/// ```no_run
/// use yuque::{Client, Identifier, RequestOption};
/// use yuque::services::docs::CreateDocRequest;
/// use yuque::types::{AccessType, DocFormat};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), yuque::Error> {
/// let client = Client::builder()
///     .token("my-token")
///     .user_agent("my-app/1.0")
///     .build()?;
/// let cancel = CancellationToken::new();
///
/// let request = CreateDocRequest {
///     slug: Some("hello".to_string()),
///     title: Some("Hello".to_string()),
///     public: Some(AccessType::Private),
///     format: Some(DocFormat::Markdown),
///     body: Some("# Hello".to_string()),
/// };
/// let doc = client
///     .docs()
///     .create(&cancel, Identifier::from("group/book"), &request, &[
///         RequestOption::header("X-Request-Id", "42"),
///     ])
///     .await?;
/// println!("created doc {}", doc.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) base_url: Url,
    pub(crate) token: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) transport: RetryableTransport,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.inner.user_agent)
            .field("transport", &self.inner.transport)
            .finish()
    }
}

impl Client {
    /// Creates a new `ClientBuilder`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client for the production API with the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the default transport cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder().token(token).build()
    }

    /// The base URL every path is resolved against. Always ends in `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The transport executing requests.
    pub fn transport(&self) -> &RetryableTransport {
        &self.inner.transport
    }

    /// Makes a typed API call.
    ///
    /// Builds the request for `endpoint` and `payload`, executes it with
    /// retries and decodes the envelope's `data` into `T`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yuque::{Client, Endpoint};
    /// use serde::Deserialize;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// #[derive(Deserialize)]
    /// struct Hello { message: String }
    ///
    /// # async fn example() -> Result<(), yuque::Error> {
    /// let client = Client::new("my-token")?;
    /// let cancel = CancellationToken::new();
    ///
    /// let hello = client
    ///     .call::<(), Hello>(&Endpoint::get("hello"), None, &cancel)
    ///     .await?;
    /// println!("{}", hello.message);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<P, T>(
        &self,
        endpoint: &Endpoint,
        payload: Option<&P>,
        cancel: &CancellationToken,
    ) -> Result<Response<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(
            &endpoint.method,
            &endpoint.path,
            payload,
            &endpoint.options,
            cancel,
        )?;
        let sent = self.inner.transport.execute(request, cancel).await?;
        self.decode(sent, cancel).await
    }

    /// Like [`Client::call`], but ignores the envelope's `data`.
    pub async fn call_unit<P>(
        &self,
        endpoint: &Endpoint,
        payload: Option<&P>,
        cancel: &CancellationToken,
    ) -> Result<Response<()>>
    where
        P: Serialize + ?Sized,
    {
        let request = self.new_request(
            &endpoint.method,
            &endpoint.path,
            payload,
            &endpoint.options,
            cancel,
        )?;
        let sent = self.inner.transport.execute(request, cancel).await?;
        self.decode_unit(sent, cancel).await
    }

    /// Document endpoints.
    pub fn docs(&self) -> DocService<'_> {
        DocService::new(self)
    }

    /// Knowledge base ("repo") endpoints.
    pub fn repos(&self) -> RepoService<'_> {
        RepoService::new(self)
    }

    /// Group endpoints.
    pub fn groups(&self) -> GroupService<'_> {
        GroupService::new(self)
    }

    /// Search endpoint.
    pub fn search(&self) -> SearchService<'_> {
        SearchService::new(self)
    }

    /// Statistics endpoints.
    pub fn statistics(&self) -> StatisticService<'_> {
        StatisticService::new(self)
    }

    /// User and heartbeat endpoints.
    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Settings may be given in any order; a later call replaces an earlier one
/// of the same kind. An explicit [`transport`](ClientBuilder::transport) takes
/// precedence over [`timeout`](ClientBuilder::timeout) and
/// [`retry_policy`](ClientBuilder::retry_policy), which only shape the default
/// transport.
///
/// # Examples
///
/// ```no_run
/// use yuque::ClientBuilder;
/// use yuque::retry::RetryPolicy;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), yuque::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://yuque.example.com/api/v2")?
///     .token("my-token")
///     .timeout(Duration::from_secs(30))
///     .retry_policy(RetryPolicy::builder().max_retries(2).build())
///     .build()?;
/// assert_eq!(client.base_url().as_str(), "https://yuque.example.com/api/v2/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<Url>,
    token: Option<String>,
    user_agent: String,
    transport: Option<RetryableTransport>,
    timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            transport: None,
            timeout: None,
            retry_policy: None,
        }
    }

    /// Overrides the API root. A trailing slash is added when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(parse_base_url(url.as_ref())?);
        Ok(self)
    }

    /// Sets the API token sent in the `X-Auth-Token` header.
    ///
    /// An empty token disables the header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Overrides the `User-Agent` header. An empty value omits the header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses the given transport instead of building a default one.
    pub fn transport(mut self, transport: RetryableTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the per-attempt timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy of the default transport.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL or transport cannot be built.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => parse_base_url(DEFAULT_BASE_URL)?,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = RetryableTransport::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(policy) = self.retry_policy {
                    builder = builder.retry_policy(policy);
                }
                builder.build()?
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url,
                token: self.token,
                user_agent: self.user_agent,
                transport,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = if raw.ends_with('/') {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("{}/", raw))?
    };

    if url.cannot_be_a_base() {
        return Err(Error::ConfigurationError(format!(
            "Base URL cannot be a base: {}",
            raw
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let client = Client::new("token").unwrap();

        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.inner.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(client.inner.token.as_deref(), Some("token"));
    }

    #[test]
    fn trailing_slash_enforced() {
        let client = Client::builder()
            .base_url("http://localhost:8080/api/v2")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v2/");
    }

    #[test]
    fn later_settings_override_earlier() {
        let client = Client::builder()
            .base_url("http://first.example")
            .unwrap()
            .token("one")
            .base_url("http://second.example/v2/")
            .unwrap()
            .token("two")
            .user_agent("a")
            .user_agent("b")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://second.example/v2/");
        assert_eq!(client.inner.token.as_deref(), Some("two"));
        assert_eq!(client.inner.user_agent, "b");
    }

    #[test]
    fn empty_token_is_no_token() {
        let client = Client::builder().token("").build().unwrap();
        assert!(client.inner.token.is_none());
    }

    #[test]
    fn invalid_base_url() {
        assert!(matches!(
            Client::builder().base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::builder().base_url("mailto:someone@example.com"),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn debug_hides_token() {
        let client = Client::new("super-secret").unwrap();
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn retry_policy_reaches_default_transport() {
        let client = Client::builder()
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();

        assert_eq!(client.transport().policy().max_retries(), 1);
    }
}
