//! The JSON envelope every Yuque endpoint wraps its payload in.
//!
//! ```json
//! { "status": 1, "meta": { "total": 53 }, "data": [ ... ], "info": "success" }
//! ```
//!
//! `data` is held as raw JSON and only decoded once the caller's target type
//! is known.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

/// The envelope `status` value some endpoints use to flag a failure while
/// still answering `200 OK`.
pub const FAILURE_STATUS: i64 = 0;

/// The uniform response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Service-level status code.
    #[serde(default)]
    pub status: Option<i64>,

    /// Pagination metadata.
    #[serde(default)]
    pub meta: Option<Meta>,

    /// The endpoint-specific payload, left undecoded.
    #[serde(default)]
    pub data: Option<Box<RawValue>>,

    /// Human-readable message, used as error text on failure.
    #[serde(default)]
    pub info: Option<String>,
}

/// Pagination metadata carried by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Meta {
    /// Total number of matching records.
    #[serde(default)]
    pub total: Option<i64>,
}

impl Envelope {
    /// Parses an envelope from a response body.
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// The `meta.total` value, when present.
    pub fn total(&self) -> Option<i64> {
        self.meta.and_then(|m| m.total)
    }

    /// The `info` message, or an empty string.
    pub fn message(&self) -> &str {
        self.info.as_deref().unwrap_or_default()
    }

    /// Whether the envelope itself reports a failure.
    pub fn reports_failure(&self) -> bool {
        self.status == Some(FAILURE_STATUS)
    }

    /// Decodes `data` into `T`. A missing `data` field decodes like `null`.
    pub fn decode_data<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match &self.data {
            Some(raw) => serde_json::from_str(raw.get()),
            None => serde_json::from_str("null"),
        }
    }
}
