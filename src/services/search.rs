//! Full-text search.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::nullable;
use crate::{Client, Response, Result};

/// What to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Documents.
    Doc,
    /// Knowledge bases.
    Repo,
}

/// Query for [`SearchService::search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    /// Keywords.
    pub q: String,

    /// Documents or knowledge bases.
    #[serde(rename = "type")]
    pub kind: SearchType,

    /// Restrict to a group or knowledge base path. Defaults to the current
    /// user or group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Deprecated alias of `page`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Only results by this author login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// Deprecated; use `creator`.
    #[serde(rename = "creatorId", skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<i64>,
}

impl SearchRequest {
    /// A query for `q` with no filters.
    pub fn new(q: impl Into<String>, kind: SearchType) -> Self {
        Self {
            q: q.into(),
            kind,
            scope: None,
            page: None,
            offset: None,
            creator: None,
            creator_id: None,
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub id: i64,
    /// `"doc"` or `"book"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Title with matches wrapped in `<em>`.
    pub title: String,
    /// Excerpt with matches wrapped in `<em>`.
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    /// Path of the hit on the site.
    pub url: String,
    /// Where the hit lives, e.g. the knowledge base name.
    #[serde(deserialize_with = "nullable")]
    pub info: String,
    /// The matched document or knowledge base, as sent.
    pub target: Option<serde_json::Value>,
}

/// A page of search hits plus the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Hits on this page.
    pub hits: Vec<SearchResult>,
    /// Matches across all pages, from `meta.total`; 0 when not sent.
    pub total_count: i64,
}

/// Search endpoint. Obtain one with [`Client::search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchService<'a> {
    client: &'a Client,
}

impl<'a> SearchService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Runs a search.
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        request: &SearchRequest,
        opts: &[RequestOption],
    ) -> Result<Response<SearchResults>> {
        let endpoint = Endpoint::get("search").with_options(opts);
        let response = self
            .client
            .call::<_, Vec<SearchResult>>(&endpoint, Some(request), cancel)
            .await?;

        let total_count = response.total.unwrap_or_default();
        Ok(response.map(|hits| SearchResults { hits, total_count }))
    }
}
