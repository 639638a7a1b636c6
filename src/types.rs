//! Domain types shared across services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A knowledge base, document or group reference: a numeric id or a slug.
///
/// Slugs may be namespaces such as `group/book`; the slash is sent as a path
/// separator.
///
/// # Examples
///
/// ```
/// use yuque::Identifier;
///
/// assert_eq!(Identifier::from(42).to_string(), "42");
/// assert_eq!(Identifier::from("group/book").to_string(), "group/book");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Numeric id.
    Id(i64),
    /// Slug, login or `owner/slug` namespace.
    Slug(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{}", id),
            Identifier::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Identifier::Id(id)
    }
}

impl From<i32> for Identifier {
    fn from(id: i32) -> Self {
        Identifier::Id(id.into())
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Identifier::Id(id.into())
    }
}

impl From<&str> for Identifier {
    fn from(slug: &str) -> Self {
        Identifier::Slug(slug.to_string())
    }
}

impl From<String> for Identifier {
    fn from(slug: String) -> Self {
        Identifier::Slug(slug)
    }
}

impl From<&String> for Identifier {
    fn from(slug: &String) -> Self {
        Identifier::Slug(slug.clone())
    }
}

/// Defines an enum carried as an integer on the wire, with a catch-all for
/// values this crate does not know yet.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident (default $default:ident) {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i64", into = "i64")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value not known to this crate.
            Other(i64),
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Other(other),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                match value {
                    $($name::$variant => $value,)+
                    $name::Other(other) => other,
                }
            }
        }
    };
}

int_enum! {
    /// Visibility of a document or knowledge base.
    AccessType (default Private) {
        /// Only members can see it.
        Private = 0,
        /// Anyone can see it.
        Public = 1,
        /// Visible inside the organization.
        Internal = 2,
    }
}

int_enum! {
    /// Role of a group member.
    GroupMemberRole (default Member) {
        /// Administrator.
        Admin = 0,
        /// Regular member.
        Member = 1,
        /// Read-only member.
        ReadOnly = 2,
    }
}

int_enum! {
    /// Time window for statistics.
    TimeRange (default All) {
        /// Since the beginning.
        All = 0,
        /// The last 30 days.
        Last30Days = 30,
        /// The last 365 days.
        LastYear = 365,
    }
}

/// Kind of document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// Regular document.
    #[default]
    Doc,
    /// Spreadsheet.
    Sheet,
    /// Discussion thread.
    Thread,
    /// Whiteboard.
    Board,
    /// Data table.
    Table,
    /// A kind not known to this crate.
    #[serde(other)]
    Unknown,
}

/// Content format of a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// Markdown.
    Markdown,
    /// HTML.
    Html,
    /// Yuque's own Lake format.
    Lake,
    /// Lake spreadsheet.
    Lakesheet,
    /// A format not known to this crate.
    #[serde(other)]
    Unknown,
}

/// Kind of knowledge base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookType {
    /// Documents.
    #[default]
    Book,
    /// Image gallery.
    Design,
    /// Spreadsheets.
    Sheet,
    /// Resources.
    Resource,
    /// A kind not known to this crate.
    #[serde(other)]
    Unknown,
}

/// Sort direction for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Largest first.
    Desc,
    /// Smallest first.
    Asc,
}

/// A user or group account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    /// `"User"` for people; groups sometimes come back through user endpoints.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unique handle used in paths.
    pub login: String,
    /// Display name.
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub avatar_url: String,
    pub books_count: i64,
    pub public_books_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    /// Visibility flag as sent, 0 private and 1 public.
    pub public: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Employee number on enterprise spaces.
    #[serde(deserialize_with = "nullable")]
    pub work_id: String,
}

/// A group (team).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    /// `"Group"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unique handle used in paths.
    pub login: String,
    pub name: String,
    pub avatar_url: String,
    pub books_count: i64,
    pub public_books_count: i64,
    pub members_count: i64,
    /// Visibility flag as sent, 0 private and 1 public.
    pub public: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: BookType,
    /// Path segment, unique within the owner.
    pub slug: String,
    pub name: String,
    /// Owner, user or group.
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// Table of contents in YAML, only on detail calls.
    pub toc_yml: Option<String>,
    pub creator_id: i64,
    pub public: AccessType,
    /// Number of documents.
    pub items_count: i64,
    pub likes_count: i64,
    pub watches_count: i64,
    pub content_updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// `owner/slug`, usable wherever an [`Identifier`] is expected.
    pub namespace: String,
    /// The owner, when embedded.
    pub user: Option<User>,
}

/// Reads `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a numeric id, treating strings and `null` as "no id" (0).
///
/// Some listings send an empty string where a number is expected.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// Reads a string that the server sometimes sends as a bare number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_enums_round_trip_unknown_values() {
        let role: GroupMemberRole = serde_json::from_str("2").unwrap();
        assert_eq!(role, GroupMemberRole::ReadOnly);

        let range: TimeRange = serde_json::from_str("7").unwrap();
        assert_eq!(range, TimeRange::Other(7));
        assert_eq!(serde_json::to_string(&range).unwrap(), "7");
        assert_eq!(serde_json::to_string(&AccessType::Internal).unwrap(), "2");
    }

    #[test]
    fn string_enums_tolerate_new_values() {
        let kind: DocType = serde_json::from_str("\"Mindmap\"").unwrap();
        assert_eq!(kind, DocType::Unknown);

        let format: DocFormat = serde_json::from_str("\"lakesheet\"").unwrap();
        assert_eq!(format, DocFormat::Lakesheet);
        assert_eq!(serde_json::to_string(&DocFormat::Markdown).unwrap(), "\"markdown\"");
    }

    #[test]
    fn identifier_forms() {
        assert_eq!(Identifier::from(1292222).to_string(), "1292222");
        assert_eq!(Identifier::from("org/book"), Identifier::Slug("org/book".into()));
        assert_eq!(Identifier::from(String::from("login")).to_string(), "login");
    }

    #[test]
    fn book_with_sparse_fields() {
        let book: Book = serde_json::from_str(
            r#"{"id":1,"slug":"handbook","name":"Handbook","namespace":"team/handbook","public":1}"#,
        )
        .unwrap();

        assert_eq!(book.kind, BookType::Book);
        assert_eq!(book.public, AccessType::Public);
        assert_eq!(book.namespace, "team/handbook");
        assert!(book.user.is_none());
    }

    #[test]
    fn nulls_read_as_defaults() {
        let user: User =
            serde_json::from_str(r#"{"id":7,"login":"x","description":null,"work_id":null}"#)
                .unwrap();
        assert_eq!(user.description, "");
        assert_eq!(user.work_id, "");
    }

    #[derive(Deserialize)]
    struct Lenient {
        #[serde(default, deserialize_with = "lenient_id")]
        id: i64,
        #[serde(default, deserialize_with = "string_or_number")]
        user_id: String,
    }

    #[test]
    fn lenient_fields() {
        let v: Lenient = serde_json::from_str(r#"{"id":"","user_id":12}"#).unwrap();
        assert_eq!(v.id, 0);
        assert_eq!(v.user_id, "12");

        let v: Lenient = serde_json::from_str(r#"{"id":163724494,"user_id":"abc"}"#).unwrap();
        assert_eq!(v.id, 163724494);
        assert_eq!(v.user_id, "abc");

        let v: Lenient = serde_json::from_str("{}").unwrap();
        assert_eq!(v.id, 0);
    }
}
