//! Post model for interview experience records.
//!
//! Posts are fetched from external sources (Reddit, Hacker News, ...)
//! and are immutable once scraped. The natural key is `(source, post_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single free-text post pulled from a tracked source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Source-scoped identifier (e.g. Reddit fullname, `hn_<objectID>`).
    pub post_id: String,
    /// Source the post came from (e.g. `cscareerquestions`, `hackernews`).
    pub source: String,
    pub title: String,
    pub body: String,
    /// Canonical URL of the post, if known.
    pub url: Option<String>,
    pub author: Option<String>,
    /// When the post was published on the source.
    pub created_at: DateTime<Utc>,
    /// When we fetched it.
    pub scraped_at: DateTime<Utc>,
}

impl Post {
    /// Title and body joined for text analysis.
    pub fn full_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }
}

/// Relevance verdict for a post, derived deterministically from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    /// Score in 0..=100.
    pub score: u8,
    pub is_relevant: bool,
    /// The threshold that was applied (sources vary in noisiness).
    pub threshold_used: u8,
}
