use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

use crate::rich_text::RichText;
use crate::source::{Document, SourceError};

/// What the list view shows for a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: RichText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    /// Source identity token, only used to position adjacency queries.
    pub id: String,
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub last_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: String,
    pub content: Vec<Section>,
}

/// Enough of a post to link to it.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub uid: String,
    pub title: String,
}

#[derive(Deserialize)]
struct SummaryData {
    #[serde(default, deserialize_with = "text_field")]
    title: String,
    #[serde(default, deserialize_with = "text_field")]
    subtitle: String,
    #[serde(default, deserialize_with = "text_field")]
    author: String,
}

#[derive(Deserialize)]
struct DetailData {
    #[serde(default, deserialize_with = "text_field")]
    title: String,
    #[serde(default, deserialize_with = "text_field")]
    subtitle: String,
    #[serde(default, deserialize_with = "text_field")]
    author: String,
    #[serde(default)]
    banner: Banner,
    #[serde(default)]
    content: Vec<SectionData>,
}

// An empty image field comes as `{}`
#[derive(Deserialize, Default)]
struct Banner {
    url: Option<String>,
}

#[derive(Deserialize)]
struct SectionData {
    #[serde(default, deserialize_with = "text_field")]
    heading: String,
    #[serde(default)]
    body: RichText,
}

/// Accepts plain key-text fields as well as single-line rich text (title) fields.
fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(_) => RichText(value).as_text(),
        _ => String::new(),
    })
}

/// Fields requested for list items, in `type.field` form.
pub fn summary_fields(doc_type: &str) -> Vec<String> {
    ["title", "subtitle", "author"].iter()
        .map(|field| format!("{}.{}", doc_type, field))
        .collect()
}

pub fn nav_fields(doc_type: &str) -> Vec<String> {
    vec![format!("{}.title", doc_type)]
}

fn require_uid(doc: &Document) -> Result<String, SourceError> {
    match doc.uid {
        Some(ref uid) if !uid.is_empty() => Ok(uid.clone()),
        _ => Err(SourceError::Malformed(format!("document {} has no uid", doc.id))),
    }
}

fn parse_data<T: for<'de> Deserialize<'de>>(doc: &Document) -> Result<T, SourceError> {
    serde_json::from_value(doc.data.clone())
        .map_err(|e| SourceError::Malformed(format!("document {}: {}", doc.id, e)))
}

impl PostSummary {
    pub fn from_document(doc: &Document) -> Result<PostSummary, SourceError> {
        let uid = require_uid(doc)?;
        let data: SummaryData = parse_data(doc)?;
        Ok(PostSummary {
            uid,
            first_publication_date: doc.first_publication_date,
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
        })
    }
}

impl PostDetail {
    pub fn from_document(doc: &Document) -> Result<PostDetail, SourceError> {
        let uid = require_uid(doc)?;
        let data: DetailData = parse_data(doc)?;
        let content = data.content.into_iter()
            .map(|s| Section { heading: s.heading, body: s.body })
            .collect();

        Ok(PostDetail {
            id: doc.id.clone(),
            uid,
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date.or(doc.first_publication_date),
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
            banner_url: data.banner.url.unwrap_or_default(),
            content,
        })
    }

    /// True when the post was edited after it first went out.
    pub fn was_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => last > first,
            _ => false,
        }
    }
}

impl NavLink {
    pub fn from_document(doc: &Document) -> Result<NavLink, SourceError> {
        let uid = require_uid(doc)?;
        let data: SummaryData = parse_data(doc)?;
        Ok(NavLink {
            uid,
            title: data.title,
        })
    }
}
