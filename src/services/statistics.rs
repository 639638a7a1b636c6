//! Group statistics.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::endpoint::Endpoint;
use crate::options::RequestOption;
use crate::types::{nullable, Identifier, SortOrder, TimeRange};
use crate::{Client, Response, Result};

/// A statistics value as sent by the server.
///
/// Breakdown rows carry their counters as strings, sometimes as numbers;
/// both are kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Metric(
    /// The value as sent, numbers rendered in decimal.
    pub String,
);

impl Metric {
    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// The value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }

    /// The value as sent.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::types::string_or_number(deserializer).map(Metric)
    }
}

/// Group-wide totals.
///
/// Suffixes `_30` and `_365` cover the last 30 and 365 days; unsuffixed
/// counters are all-time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStatistics {
    /// Day the figures were computed, `YYYYMMDD`.
    #[serde(rename = "bizdate")]
    pub biz_date: String,
    /// The group.
    pub user_id: i64,
    /// Enterprise space, 0 outside one.
    pub organization_id: i64,
    pub member_count: i64,
    pub collaborator_count: i64,
    pub day_read_count: i64,
    pub day_write_count: i64,
    pub write_count: i64,
    pub read_count: i64,
    pub read_count_30: i64,
    pub read_count_365: i64,
    pub comment_count: i64,
    pub comment_count_30: i64,
    pub comment_count_365: i64,
    pub like_count: i64,
    pub like_count_30: i64,
    pub like_count_365: i64,
    pub follow_count: i64,
    pub collect_count: i64,
    pub doc_count: i64,
    pub sheet_count: i64,
    pub board_count: i64,
    pub show_count: i64,
    pub resource_count: i64,
    #[serde(rename = "artboard_count")]
    pub art_board_count: i64,
    pub attachment_count: i64,
    pub book_count: i64,
    pub public_book_count: i64,
    pub private_book_count: i64,
    pub book_book_count: i64,
    pub book_resource_count: i64,
    pub book_design_count: i64,
    pub book_thread_count: i64,
    /// Storage used, in bytes.
    pub data_usage: i64,
    pub grains_count: i64,
    pub grains_count_sum: i64,
    pub grains_count_consume: i64,
    pub interaction_people_count: i64,
    pub content_count: i64,
    pub collaboration_count: i64,
    /// Hours saved through collaboration.
    pub working_hours: i64,
    /// Output measured in encyclopedia volumes.
    pub baike: f64,
    pub table_count: i64,
}

/// Per-member figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberStatistics {
    /// Day the figures were computed, `YYYYMMDD`.
    #[serde(rename = "bizdate")]
    pub biz_date: Metric,
    pub user_id: Metric,
    pub group_id: Metric,
    pub organization_id: Metric,
    pub write_count: Metric,
    pub write_count_30: Metric,
    pub write_count_365: Metric,
    pub write_doc_count: Metric,
    pub write_doc_count_30: Metric,
    pub write_doc_count_365: Metric,
    pub read_count: Metric,
    pub read_count_30: Metric,
    pub read_count_365: Metric,
    pub like_count: Metric,
    pub like_count_30: Metric,
    pub like_count_365: Metric,
    /// The member, as sent.
    pub user: Option<serde_json::Value>,
}

/// Per-knowledge-base figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookStatistics {
    #[serde(rename = "bizdate")]
    pub biz_date: Metric,
    pub book_id: Metric,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `"1"` when public.
    pub is_public: Metric,
    /// Last content change, epoch milliseconds.
    pub content_updated_at_ms: Metric,
    pub user_id: Metric,
    pub organization_id: Metric,
    pub day_read_count: Metric,
    pub day_write_count: Metric,
    pub day_like_count: Metric,
    pub post_count: Metric,
    pub word_count: Metric,
    pub write_count: Metric,
    pub write_count_30: Metric,
    pub read_count: Metric,
    pub read_count_30: Metric,
    pub read_count_365: Metric,
    pub like_count: Metric,
    pub like_count_7: Metric,
    pub like_count_30: Metric,
    pub like_count_365: Metric,
    pub watch_count: Metric,
    pub watch_count_7: Metric,
    pub watch_count_30: Metric,
    pub watch_count_365: Metric,
    pub comment_count: Metric,
    pub comment_count_30: Metric,
    pub comment_count_365: Metric,
    pub like_rank_rate: Metric,
    pub popularity_30: Metric,
    pub doc_count: Metric,
    pub sheet_count: Metric,
    pub board_count: Metric,
    pub show_count: Metric,
    pub resource_count: Metric,
    #[serde(rename = "artboard_count")]
    pub art_board_count: Metric,
    pub attachment_count: Metric,
    pub interaction_people_count: Metric,
    pub content_count: Metric,
    pub collaboration_count: Metric,
    pub working_hours: Metric,
    pub baike: Metric,
    pub table_count: Metric,
}

/// Per-document figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocStatistics {
    #[serde(rename = "bizdate")]
    pub biz_date: Metric,
    pub book_id: Metric,
    pub doc_id: Metric,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_public: Metric,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub content_updated_at: String,
    pub user_id: Metric,
    pub organization_id: Metric,
    pub day_read_count: Metric,
    pub day_write_count: Metric,
    pub day_like_count: Metric,
    pub word_count: Metric,
    pub write_count: Metric,
    pub read_count: Metric,
    pub read_count_7: Metric,
    pub read_count_30: Metric,
    pub read_count_365: Metric,
    pub like_count: Metric,
    pub like_count_7: Metric,
    pub like_count_30: Metric,
    pub like_count_365: Metric,
    pub comment_count: Metric,
    pub comment_count_30: Metric,
    pub comment_count_365: Metric,
    pub popularity_30: Metric,
    pub attachment_count: Metric,
    /// The author, as sent.
    pub user: Option<serde_json::Value>,
}

/// Filter, sort and paging shared by the breakdown endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatisticsRequest {
    /// Match on member, knowledge base or document name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,

    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size, at most 20.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Counter to sort by, e.g. `read_count`.
    #[serde(rename = "sortField", skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,

    #[serde(rename = "sortOrder", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

/// Query for [`StatisticService::docs`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocStatisticsRequest {
    /// Only documents of this knowledge base.
    #[serde(rename = "bookId", skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,

    #[serde(flatten)]
    pub filter: StatisticsRequest,
}

/// A page of member figures.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemberStatisticsPage {
    #[serde(deserialize_with = "nullable")]
    pub members: Vec<MemberStatistics>,
    /// Rows across all pages.
    pub total: i64,
}

/// A page of knowledge base figures.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookStatisticsPage {
    #[serde(deserialize_with = "nullable")]
    pub books: Vec<BookStatistics>,
    /// Rows across all pages.
    pub total: i64,
}

/// A page of document figures.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocStatisticsPage {
    #[serde(deserialize_with = "nullable")]
    pub docs: Vec<DocStatistics>,
    /// Rows across all pages.
    pub total: i64,
}

/// Statistics endpoints. Obtain one with [`Client::statistics`].
#[derive(Debug, Clone, Copy)]
pub struct StatisticService<'a> {
    client: &'a Client,
}

impl<'a> StatisticService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Group-wide totals.
    pub async fn group(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        opts: &[RequestOption],
    ) -> Result<Response<GroupStatistics>> {
        let endpoint =
            Endpoint::get(format!("groups/{}/statistics", group.into())).with_options(opts);
        self.client.call::<(), _>(&endpoint, None, cancel).await
    }

    /// Figures per member.
    pub async fn members(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &StatisticsRequest,
        opts: &[RequestOption],
    ) -> Result<Response<MemberStatisticsPage>> {
        let endpoint = Endpoint::get(format!("groups/{}/statistics/members", group.into()))
            .with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Figures per knowledge base.
    pub async fn books(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &StatisticsRequest,
        opts: &[RequestOption],
    ) -> Result<Response<BookStatisticsPage>> {
        let endpoint = Endpoint::get(format!("groups/{}/statistics/books", group.into()))
            .with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }

    /// Figures per document.
    pub async fn docs(
        &self,
        cancel: &CancellationToken,
        group: impl Into<Identifier>,
        request: &DocStatisticsRequest,
        opts: &[RequestOption],
    ) -> Result<Response<DocStatisticsPage>> {
        let endpoint = Endpoint::get(format!("groups/{}/statistics/docs", group.into()))
            .with_options(opts);
        self.client.call(&endpoint, Some(request), cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_accepts_strings_and_numbers() {
        let row: MemberStatistics =
            serde_json::from_str(r#"{"bizdate":"20250301","read_count":"12","like_count":3}"#)
                .unwrap();

        assert_eq!(row.biz_date.as_str(), "20250301");
        assert_eq!(row.read_count.as_i64(), Some(12));
        assert_eq!(row.like_count.as_i64(), Some(3));
        assert_eq!(row.write_count.as_i64(), None);
    }

    #[test]
    fn doc_statistics_query() {
        let request = DocStatisticsRequest {
            book_id: Some(42),
            filter: StatisticsRequest {
                range: Some(TimeRange::Last30Days),
                sort_field: Some("read_count".to_string()),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            },
        };

        assert_eq!(
            serde_urlencoded::to_string(&request).unwrap(),
            "bookId=42&range=30&sortField=read_count&sortOrder=desc"
        );
    }
}
