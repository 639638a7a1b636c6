//! Knowledge bases ("repos" on the wire, "books" in payloads).

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::{AccessType, Book, BookType, Identifier};
use crate::{Client, Response, Result};

/// Query for listing knowledge bases.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReposRequest {
    /// Rows to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Page size, at most 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Only knowledge bases of this kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<BookType>,
}

/// Body for creating a knowledge base.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRepoRequest {
    pub name: String,
    /// Path segment, unique within the owner.
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<AccessType>,

    /// Hide the member list from non-members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_privacy: Option<bool>,
}

/// Body for updating a knowledge base.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRepoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<AccessType>,

    /// Table of contents in Markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc: Option<String>,
}

/// Knowledge base endpoints. Obtain one with [`Client::repos`].
#[derive(Debug, Clone, Copy)]
pub struct RepoService<'a> {
    client: &'a Client,
}

impl<'a> RepoService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches a knowledge base by id or `owner/slug` namespace.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<Book>> {
        let endpoint = Endpoint::get(format!("repos/{}", book.into())).with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }

    /// Lists the knowledge bases owned by a user.
    pub async fn list_for_user(
        &self,
        cancel: &CancellationToken,
        user: impl Into<Identifier>,
        request: &ListReposRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Vec<Book>>> {
        let endpoint = Endpoint::get(format!("users/{}/repos", user.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Lists the knowledge bases owned by a group.
    pub async fn list_for_group(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &ListReposRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Vec<Book>>> {
        let endpoint = Endpoint::get(format!("groups/{}/repos", group.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Creates a knowledge base owned by a user.
    pub async fn create_for_user(
        &self,
        cancel: &CancellationToken,
        user: impl Into<Identifier>,
        request: &CreateRepoRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Book>> {
        let endpoint = Endpoint::post(format!("users/{}/repos", user.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Creates a knowledge base owned by a group.
    pub async fn create_for_group(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &CreateRepoRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Book>> {
        let endpoint = Endpoint::post(format!("groups/{}/repos", group.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Updates a knowledge base.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        request: &UpdateRepoRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Book>> {
        let endpoint = Endpoint::put(format!("repos/{}", book.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Deletes a knowledge base and returns it as it was.
    pub async fn delete(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<Book>> {
        let endpoint = Endpoint::delete(format!("repos/{}", book.into())).with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }
}
