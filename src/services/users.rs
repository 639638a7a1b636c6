//! The current user and the heartbeat endpoint.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::User;
use crate::{Client, Response, Result};

/// Heartbeat reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Hello {
    /// Greeting from the server.
    pub message: String,
}

/// User endpoints. Obtain one with [`Client::users`].
#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    client: &'a Client,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Checks that the API is reachable and the token is accepted.
    pub async fn hello(
        &self,
        cancel: &CancellationToken,
        opts: &[RequestOption],
    ) -> Result<Response<Hello>> {
        let endpoint = Endpoint::get("hello").with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }

    /// The user (or group) the token belongs to.
    pub async fn current(
        &self,
        cancel: &CancellationToken,
        opts: &[RequestOption],
    ) -> Result<Response<User>> {
        let endpoint = Endpoint::get("user").with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }
}
