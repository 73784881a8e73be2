use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A quote as served by the Quotable API.
///
/// This is also the shape returned to callers, which is why it carries no
/// creation date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuotableQuote {
    #[serde(alias = "_id")]
    pub id: String,
    pub content: String,
    pub author: String,
    pub author_slug: String,
    pub length: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The persisted copy of a fetched quote.
///
/// `author_slug` is the partition key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author: String,
    pub author_slug: String,
    pub length: i32,
    pub tags: Vec<String>,
    pub creation_date: String,
}

impl Quote {
    /// Copies `source` and stamps it with today's local date.
    pub fn load(source: &QuotableQuote) -> Self {
        Self::from_quotable(source, Local::now().date_naive())
    }

    pub fn from_quotable(source: &QuotableQuote, date: NaiveDate) -> Self {
        Self {
            id: source.id.clone(),
            content: source.content.clone(),
            author: source.author.clone(),
            author_slug: source.author_slug.clone(),
            length: source.length,
            tags: source.tags.clone(),
            creation_date: creation_date(date),
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.author_slug
    }
}

/// Formats `date` as `YEAR-MONTH-DAY` without zero padding, e.g. `2024-3-7`.
pub fn creation_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}
