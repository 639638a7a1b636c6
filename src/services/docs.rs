//! Documents and tables of contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::{lenient_id, nullable, AccessType, Book, DocFormat, DocType, Identifier, User};
use crate::{Client, Response, Result};

/// A document.
///
/// Listings return the summary fields; the body fields are only filled by
/// detail, create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doc {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: DocType,
    /// Path segment, unique within the knowledge base.
    pub slug: String,
    pub title: String,
    /// Summary text.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// Cover image URL.
    #[serde(deserialize_with = "nullable")]
    pub cover: String,
    /// Owner, user or group.
    pub user_id: i64,
    pub book_id: i64,
    pub last_editor_id: i64,
    pub public: AccessType,
    /// 0 for drafts, 1 once published.
    pub status: i64,
    pub likes_count: Option<i64>,
    pub read_count: i64,
    pub comments_count: Option<i64>,
    pub word_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub content_updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub first_published_at: Option<DateTime<Utc>>,
    pub user: Option<User>,
    pub last_editor: Option<User>,
    /// Page views; only sent when requested through `optional_properties`.
    pub hits: i64,

    pub format: Option<DocFormat>,
    /// Unpublished edits in `format`.
    pub body_draft: Option<String>,
    /// Published body in `format`.
    pub body: Option<String>,
    /// Sheet content, for sheet documents.
    pub body_sheet: Option<String>,
    /// Table content, for table documents.
    pub body_table: Option<String>,
    /// Rendered HTML.
    pub body_html: Option<String>,
    /// Body in the native lake format.
    pub body_lake: Option<String>,
    pub book: Option<Book>,
    pub creator: Option<User>,
    #[serde(deserialize_with = "nullable")]
    pub tags: Vec<DocTag>,
    /// Latest published version; only sent when requested.
    pub latest_version_id: i64,
}

/// A tag attached to a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTag {
    pub id: i64,
    pub title: String,
    pub doc_id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Kind of table-of-contents node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TocType {
    /// Links to a document.
    #[default]
    Doc,
    /// External link.
    Link,
    /// Grouping title without content.
    Title,
    /// A kind not known to this crate.
    #[serde(other)]
    Unknown,
}

/// One node of a knowledge base's table of contents.
///
/// `id` and `doc_id` are sometimes sent as empty strings; those read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toc {
    /// Node id within the table of contents.
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: TocType,
    pub title: String,
    /// Document slug or external URL, depending on `kind`.
    pub url: String,
    pub slug: String,
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    /// The linked document, 0 for titles and links.
    #[serde(deserialize_with = "lenient_id")]
    pub doc_id: i64,
    /// Nesting level, 0 at the top.
    pub level: i64,
    pub depth: i64,
    /// 1 if links open in a new window.
    pub open_window: i64,
    /// 1 if the node is shown.
    pub visible: i64,
    #[serde(deserialize_with = "nullable")]
    pub prev_uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub sibling_uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub child_uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub parent_uuid: String,
}

/// Query for [`DocService::list`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDocsRequest {
    /// Documents to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Page size; the server defaults to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Extra fields to include, comma separated: `hits`, `tags`,
    /// `latest_version_id`. Ignored by the server above 100 per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_properties: Option<String>,
}

/// A page of documents plus the total across all pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocList {
    /// Documents on this page.
    pub docs: Vec<Doc>,
    /// Documents across all pages, from `meta.total`; 0 when not sent.
    pub total_count: i64,
}

/// Body for [`DocService::create`] and [`DocService::update`].
///
/// Unset fields are left out; the server then keeps (or inherits) its value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDocRequest {
    /// Path segment; generated by the server when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Visibility; inherited from the knowledge base when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<AccessType>,

    /// Format of `body`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DocFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Body for [`DocService::update`].
pub type UpdateDocRequest = CreateDocRequest;

/// Document endpoints. Obtain one with [`Client::docs`].
#[derive(Debug, Clone, Copy)]
pub struct DocService<'a> {
    client: &'a Client,
}

impl<'a> DocService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists the documents of a knowledge base.
    ///
    /// `book` is the knowledge base id or its `owner/slug` namespace.
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        request: &ListDocsRequest,
        opts: &[RequestOption],
    ) -> Result<Response<DocList>> {
        let endpoint = Endpoint::get(format!("repos/{}/docs", book.into())).with_options(opts);
        let response = self
            .client
            .call::<_, Vec<Doc>>(&endpoint, Some(request), cancel)
            .await?;

        let total_count = response.total.unwrap_or_default();
        Ok(response.map(|docs| DocList { docs, total_count }))
    }

    /// Creates a document.
    ///
    /// The new document is not added to the table of contents.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        request: &CreateDocRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Doc>> {
        let endpoint = Endpoint::post(format!("repos/{}/docs", book.into())).with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Fetches one document with its body.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        doc: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<Doc>> {
        let endpoint = Endpoint::get(format!("repos/{}/docs/{}", book.into(), doc.into()))
            .with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }

    /// Updates a document.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        doc: impl Into<Identifier>,
        request: &UpdateDocRequest,
        opts: &[RequestOption],
    ) -> Result<Response<Doc>> {
        let endpoint = Endpoint::put(format!("repos/{}/docs/{}", book.into(), doc.into()))
            .with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Deletes a document and returns it as it was.
    pub async fn delete(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        doc: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<Doc>> {
        let endpoint = Endpoint::delete(format!("repos/{}/docs/{}", book.into(), doc.into()))
            .with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }

    /// Fetches the table of contents of a knowledge base.
    pub async fn toc(
        &self,
        cancel: &CancellationToken,
        book: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<Vec<Toc>>> {
        let endpoint = Endpoint::get(format!("repos/{}/toc", book.into())).with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_leaves_out_unset_fields() {
        let request = CreateDocRequest {
            title: Some("Notes".to_string()),
            format: Some(DocFormat::Markdown),
            public: Some(AccessType::Private),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"title": "Notes", "format": "markdown", "public": 0})
        );
    }

    #[test]
    fn toc_node_reads_string_ids_as_zero() {
        let toc: Toc = serde_json::from_str(
            r#"{"uuid":"a","type":"TITLE","title":"Group","id":"","doc_id":"","parent_uuid":null}"#,
        )
        .unwrap();

        assert_eq!(toc.kind, TocType::Title);
        assert_eq!(toc.id, 0);
        assert_eq!(toc.doc_id, 0);
        assert_eq!(toc.parent_uuid, "");
    }
}
