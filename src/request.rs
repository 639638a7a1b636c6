//! Turning a logical call into a wire request.

use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderName, HeaderValue, Method};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::{Client, AUTH_TOKEN_HEADER};
use crate::options::{header_value, RequestOption};
use crate::{Error, Result};

/// Verbs whose payload travels as a JSON body. Everything else uses the query string.
fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

impl Client {
    /// Builds the wire request for one call without sending it.
    ///
    /// - `path` is appended to the base URL path. Percent escapes in it are
    ///   kept as they are, so `repos/group%2Fbook` stays escaped while
    ///   `repos/group/book` keeps its slash.
    /// - For POST, PUT and PATCH the payload becomes the JSON body and
    ///   `Content-Type: application/json` is set. For other verbs it becomes
    ///   the query string.
    /// - `Accept`, `User-Agent` and `X-Auth-Token` are set first, then
    ///   `options` run in order and may override any of them.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `cancel` already fired.
    /// - [`Error::InvalidPath`] for a malformed percent escape in `path`.
    /// - [`Error::Encoding`] if the payload cannot be serialized.
    /// - [`Error::ConfigurationError`] for an invalid header.
    ///
    /// # Examples
    ///
    /// ```
    /// use yuque::Client;
    /// use http::Method;
    /// use serde::Serialize;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// #[derive(Serialize)]
    /// struct Page { offset: u32, limit: u32 }
    ///
    /// # fn example() -> Result<(), yuque::Error> {
    /// let client = Client::new("my-token")?;
    /// let request = client.new_request(
    ///     &Method::GET,
    ///     "repos/group/book/docs",
    ///     Some(&Page { offset: 0, limit: 10 }),
    ///     &[],
    ///     &CancellationToken::new(),
    /// )?;
    ///
    /// assert_eq!(
    ///     request.url().as_str(),
    ///     "https://www.yuque.com/api/v2/repos/group/book/docs?offset=0&limit=10"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn new_request<P>(
        &self,
        method: &Method,
        path: &str,
        payload: Option<&P>,
        options: &[RequestOption],
        cancel: &CancellationToken,
    ) -> Result<reqwest::Request>
    where
        P: Serialize + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut url = self.resolve(path)?;
        let mut body = None;

        if sends_body(method) {
            if let Some(payload) = payload {
                let json =
                    serde_json::to_vec(payload).map_err(|e| Error::Encoding(e.to_string()))?;
                body = Some(json);
            }
        } else if let Some(payload) = payload {
            let query =
                serde_urlencoded::to_string(payload).map_err(|e| Error::Encoding(e.to_string()))?;
            if !query.is_empty() {
                url.set_query(Some(&query));
            }
        }

        let mut request = reqwest::Request::new(method.clone(), url);
        let headers = request.headers_mut();

        if let Some(token) = &self.inner.token {
            let mut value = header_value(token)?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !self.inner.user_agent.is_empty() {
            headers.insert(USER_AGENT, header_value(&self.inner.user_agent)?);
        }
        if sends_body(method) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }

        for option in options {
            option.apply(&mut request)?;
        }

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            options = options.len(),
            "Built request"
        );

        Ok(request)
    }

    /// Joins `path` onto the base URL path.
    fn resolve(&self, path: &str) -> Result<Url> {
        check_escapes(path)?;

        let mut url = self.inner.base_url.clone();
        let joined = format!("{}{}", self.inner.base_url.path(), path);
        url.set_path(&joined);
        Ok(url)
    }
}

/// Rejects `%` not followed by two hex digits, and escapes whose decoded
/// bytes are not UTF-8.
fn check_escapes(path: &str) -> Result<()> {
    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: format!(
                        "invalid escape {:?}",
                        String::from_utf8_lossy(&bytes[i..end])
                    ),
                });
            }
            let byte = u8::from_str_radix(&path[i + 1..i + 3], 16).map_err(|e| {
                Error::InvalidPath {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            })?;
            decoded.push(byte);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    if let Err(e) = std::str::from_utf8(&decoded) {
        return Err(Error::InvalidPath {
            path: path.to_string(),
            reason: format!("escapes do not decode to UTF-8: {}", e),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Listing {
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        #[serde(rename = "optional_properties", skip_serializing_if = "Option::is_none")]
        extra: Option<String>,
    }

    #[derive(Serialize)]
    struct NewDoc {
        slug: String,
        title: String,
    }

    fn client() -> Client {
        Client::builder()
            .base_url("http://localhost:9999/api/v2")
            .unwrap()
            .token("secret-token")
            .build()
            .unwrap()
    }

    fn build<P: Serialize + ?Sized>(
        method: Method,
        path: &str,
        payload: Option<&P>,
        options: &[RequestOption],
    ) -> Result<reqwest::Request> {
        client().new_request(&method, path, payload, options, &CancellationToken::new())
    }

    #[test]
    fn get_encodes_query_and_skips_empty() {
        let payload = Listing {
            offset: Some(0),
            limit: None,
            extra: Some("hits,tags".to_string()),
        };
        let req = build(Method::GET, "repos/org/book/docs", Some(&payload), &[]).unwrap();

        assert_eq!(req.url().path(), "/api/v2/repos/org/book/docs");
        assert_eq!(
            req.url().query(),
            Some("offset=0&optional_properties=hits%2Ctags")
        );
        assert!(req.body().is_none());
        assert!(req.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn empty_payload_leaves_no_query() {
        let payload = Listing {
            offset: None,
            limit: None,
            extra: None,
        };
        let req = build(Method::GET, "repos/org/book/docs", Some(&payload), &[]).unwrap();
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn post_encodes_json_body() {
        let payload = NewDoc {
            slug: "test".to_string(),
            title: "无标题".to_string(),
        };
        let req = build(Method::POST, "repos/org/book/docs", Some(&payload), &[]).unwrap();

        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({"slug": "test", "title": "无标题"}));
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn put_without_payload_has_no_body() {
        let req = build::<()>(Method::PUT, "repos/1", None, &[]).unwrap();
        assert!(req.body().is_none());
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn default_headers_and_token() {
        let req = build::<()>(Method::GET, "hello", None, &[]).unwrap();

        assert_eq!(req.headers()[ACCEPT], "application/json");
        assert_eq!(req.headers()[USER_AGENT], crate::client::DEFAULT_USER_AGENT);
        assert_eq!(req.headers()[AUTH_TOKEN_HEADER], "secret-token");
    }

    #[test]
    fn options_override_defaults() {
        let options = [
            RequestOption::user_agent("test-user-agent"),
            RequestOption::header("Accept", "text/plain"),
        ];
        let req = build::<()>(Method::GET, "hello", None, &options).unwrap();

        assert_eq!(req.headers()[USER_AGENT], "test-user-agent");
        assert_eq!(req.headers()[ACCEPT], "text/plain");
        assert_eq!(req.headers().get_all(ACCEPT).iter().count(), 1);
    }

    #[test]
    fn escaped_segments_are_preserved() {
        let req = build::<()>(Method::GET, "repos/org%2Fbook/toc", None, &[]).unwrap();
        assert_eq!(req.url().path(), "/api/v2/repos/org%2Fbook/toc");

        let req = build::<()>(Method::GET, "repos/org/book/toc", None, &[]).unwrap();
        assert_eq!(req.url().path(), "/api/v2/repos/org/book/toc");
    }

    #[test]
    fn malformed_escape_is_rejected() {
        for path in ["repos/%zz/docs", "repos/abc%4", "repos/%"] {
            let err = build::<()>(Method::GET, path, None, &[]).unwrap_err();
            assert!(matches!(err, Error::InvalidPath { .. }), "{}", path);
        }
    }

    #[test]
    fn escapes_must_decode_to_utf8() {
        for path in ["repos/%FF", "repos/%C3%28/docs", "repos/a%E4%BC"] {
            let err = build::<()>(Method::GET, path, None, &[]).unwrap_err();
            match err {
                Error::InvalidPath { reason, .. } => assert!(reason.contains("UTF-8"), "{}", reason),
                other => panic!("{}: expected InvalidPath, got {:?}", path, other),
            }
        }

        let request = build::<()>(Method::GET, "repos/%E4%BC%9A/docs", None, &[]).unwrap();
        assert_eq!(request.url().path(), "/api/v2/repos/%E4%BC%9A/docs");
    }

    #[test]
    fn unencodable_payloads_fail_before_sending() {
        let mut bad_json: HashMap<Vec<u8>, u8> = HashMap::new();
        bad_json.insert(vec![1], 1);
        let err = build(Method::POST, "repos", Some(&bad_json), &[]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let err = build(Method::GET, "repos", Some(&vec![1, 2, 3]), &[]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn cancelled_token_stops_construction() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client()
            .new_request::<()>(&Method::GET, "hello", None, &[], &cancel)
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
