//! Post data as it arrives from the document store.
//!
//! Posts are owned upstream; this crate only reads them. Fields the ranker
//! doesn't look at (author, images, description, …) are carried through
//! untouched in [`Post::extra`] so a ranked feed serializes back to the same
//! shape it was read from.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A feed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Empty when the document had none; such posts can't be ranked.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAt>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Everything else on the document, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            likes: 0,
            comments: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Creation time in epoch milliseconds, or `None` when missing or
    /// unreadable.
    pub fn created_millis(&self) -> Option<f64> {
        self.created_at.as_ref().and_then(CreatedAt::epoch_millis)
    }
}

/// A comment on a post. Only the count matters for ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Post creation time in any of the shapes the backend hands out.
///
/// - `{"seconds": 1700000000, "nanoseconds": 0}`: server timestamp
///   (`_seconds`/`_nanoseconds` from the admin SDK are accepted too)
/// - `1700000000000`: epoch milliseconds
/// - `"2024-05-01T12:00:00Z"`: ISO-8601 string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedAt {
    ServerTimestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Millis(f64),
    Text(String),
}

impl CreatedAt {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        CreatedAt::Text(at.to_rfc3339())
    }

    /// Normalize to epoch milliseconds.
    pub fn epoch_millis(&self) -> Option<f64> {
        match self {
            CreatedAt::ServerTimestamp {
                seconds,
                nanoseconds,
            } => Some(*seconds as f64 * 1000.0 + *nanoseconds as f64 / 1_000_000.0),
            CreatedAt::Millis(ms) if ms.is_finite() => Some(*ms),
            CreatedAt::Millis(_) => None,
            CreatedAt::Text(text) => parse_timestamp(text).map(|at| at.timestamp_millis() as f64),
        }
    }
}

/// Parse an ISO-8601 timestamp. Strings without a zone are read as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
