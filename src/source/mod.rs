//! The content source: the headless CMS every page is rendered from.
//!
//! Everything above this module talks to a [`ContentSource`] handed to it by the caller,
//! never to a global client, so the listing and navigation logic can be exercised against
//! an in-memory source in tests.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::util::prismic_date;

pub mod prismic;

pub const FIRST_PUBLICATION_DATE: &str = "document.first_publication_date";

/// Opaque continuation token. It is a fetchable locator, only ever stored and replayed.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Cursor(pub String);

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, with = "prismic_date::option")]
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    #[serde(default, with = "prismic_date::option")]
    pub last_publication_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<Document>,
    pub next_page: Option<Cursor>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[at(document.type, "posts")]`
    DocumentType(String),
    /// `[date.before(document.first_publication_date, "...")]`
    PublishedBefore(DateTime<FixedOffset>),
    /// `[at(my.posts.uid, "slug")]`
    Uid { doc_type: String, uid: String },
}

// Values are double-quoted inside the query
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

impl Predicate {
    pub fn document_type(doc_type: &str) -> Self {
        Predicate::DocumentType(doc_type.to_string())
    }

    /// Query syntax understood by the CMS.
    pub fn to_query(&self) -> String {
        match self {
            Predicate::DocumentType(doc_type) => format!("[at(document.type, {})]", quote(doc_type)),
            Predicate::PublishedBefore(date) => format!(
                "[date.before({}, \"{}\")]",
                FIRST_PUBLICATION_DATE,
                prismic_date::format_prismic_date(date)
            ),
            Predicate::Uid { doc_type, uid } => format!("[at(my.{}.uid, {})]", doc_type, quote(uid)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn by_first_publication(direction: Direction) -> Self {
        Ordering {
            field: FIRST_PUBLICATION_DATE.to_string(),
            direction,
        }
    }

    pub fn to_query(&self) -> String {
        match self.direction {
            Direction::Ascending => self.field.clone(),
            Direction::Descending => format!("{} desc", self.field),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Restricts the returned `data` to these `type.field` names. Empty fetches everything.
    pub fetch: Vec<String>,
    pub page_size: u32,
    /// Preview ref. `None` queries the published (master) content.
    pub reference: Option<String>,
    /// Document id to position the page after.
    pub after: Option<String>,
    pub orderings: Vec<Ordering>,
}

impl QueryOptions {
    pub fn page_size(page_size: u32) -> Self {
        QueryOptions {
            page_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request to content source failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Content source returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Could not find document {0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Content source has no master ref")]
    NoMasterRef,
}

#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn query(&self, predicates: &[Predicate], options: &QueryOptions) -> Result<SearchPage, SourceError>;

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, SourceError>;

    /// Dereferences a cursor returned by an earlier page.
    async fn follow(&self, cursor: &Cursor) -> Result<SearchPage, SourceError>;
}

#[cfg(test)]
mod tests {
    use crate::util::prismic_date::parse_prismic_date;

    use super::*;

    #[test]
    fn test_predicate_query() {
        let p = Predicate::document_type("posts");
        assert_eq!(p.to_query(), r#"[at(document.type, "posts")]"#);

        let date = parse_prismic_date("2021-03-15T19:25:28+0000").unwrap();
        let p = Predicate::PublishedBefore(date);
        assert_eq!(p.to_query(), r#"[date.before(document.first_publication_date, "2021-03-15T19:25:28+0000")]"#);
    }

    #[test]
    fn test_quoted_values_stay_inside_predicate() {
        let p = Predicate::Uid { doc_type: "posts".to_string(), uid: r#"a")] [at(document.type, "x"#.to_string() };
        assert_eq!(p.to_query(), r#"[at(my.posts.uid, "a\")] [at(document.type, \"x")]"#);

        let p = Predicate::Uid { doc_type: "posts".to_string(), uid: r"back\slash".to_string() };
        assert_eq!(p.to_query(), r#"[at(my.posts.uid, "back\\slash")]"#);

        let p = Predicate::document_type(r#"po"sts"#);
        assert_eq!(p.to_query(), r#"[at(document.type, "po\"sts")]"#);
    }

    #[test]
    fn test_ordering_query() {
        assert_eq!(Ordering::by_first_publication(Direction::Ascending).to_query(), "document.first_publication_date");
        assert_eq!(Ordering::by_first_publication(Direction::Descending).to_query(), "document.first_publication_date desc");
    }

    #[test]
    fn test_document_from_json() {
        let doc: Document = serde_json::from_str(r#"{
            "id": "YFG2PhIAACMAgZ3n",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-19T15:49:13+0000",
            "tags": [],
            "data": {"title": "Como utilizar Hooks"}
        }"#).unwrap();

        assert_eq!(doc.id, "YFG2PhIAACMAgZ3n");
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.doc_type, "posts");
        assert!(doc.first_publication_date.unwrap() < doc.last_publication_date.unwrap());
        assert_eq!(doc.data["title"], "Como utilizar Hooks");
    }
}
