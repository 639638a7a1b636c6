//! Envelope decoding and failure classification.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::transport::TransportResponse;
use crate::{Error, Response, Result};

/// A response whose envelope was parsed and classified as a success.
struct Accepted {
    envelope: Envelope,
    raw_body: String,
    status: StatusCode,
    headers: HeaderMap,
    attempts: usize,
    started: Instant,
}

impl Client {
    /// Decodes a transport response into `Response<T>`.
    ///
    /// The body is parsed as an envelope first. Any HTTP status other than
    /// `200 OK` becomes an [`Error::Api`], whatever the envelope says; so does
    /// a `200 OK` whose envelope carries `status: 0`. Only then is `data`
    /// decoded into `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] if the body is not an envelope or `data` does not fit `T`.
    /// - [`Error::Api`] for failures reported by the service.
    /// - [`Error::Cancelled`] if `cancel` fires while the body is read.
    pub async fn decode<T>(
        &self,
        sent: TransportResponse,
        cancel: &CancellationToken,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let accepted = accept(sent, cancel).await?;

        let data = match accepted.envelope.decode_data::<T>() {
            Ok(data) => data,
            Err(e) => {
                return Err(Error::Decode {
                    message: e.to_string(),
                    raw_response: accepted.raw_body,
                    status: accepted.status,
                });
            }
        };

        Ok(accepted.into_response(data))
    }

    /// Like [`Client::decode`], but skips decoding `data`.
    pub async fn decode_unit(
        &self,
        sent: TransportResponse,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let accepted = accept(sent, cancel).await?;
        Ok(accepted.into_response(()))
    }
}

impl Accepted {
    fn into_response<T>(self, data: T) -> Response<T> {
        Response {
            data,
            total: self.envelope.total(),
            envelope_status: self.envelope.status,
            info: self.envelope.message().to_string(),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.started.elapsed(),
            attempts: self.attempts,
        }
    }
}

/// Reads the body, parses the envelope and rejects failures.
async fn accept(sent: TransportResponse, cancel: &CancellationToken) -> Result<Accepted> {
    let TransportResponse {
        response,
        attempts,
        started,
    } = sent;
    let status = response.status();
    let headers = response.headers().clone();

    let body = tokio::select! {
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        body = response.bytes() => body.map_err(Error::from_send)?,
    };
    let raw_body = String::from_utf8_lossy(&body).into_owned();

    let envelope = match Envelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return Err(Error::Decode {
                message: e.to_string(),
                raw_response: raw_body,
                status,
            });
        }
    };

    if status != StatusCode::OK || envelope.reports_failure() {
        return Err(Error::Api(ApiError::new(
            status,
            envelope.status,
            envelope.message(),
            headers,
        )));
    }

    Ok(Accepted {
        envelope,
        raw_body,
        status,
        headers,
        attempts,
        started,
    })
}
