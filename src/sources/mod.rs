//! Post source transports.
//!
//! A source is anything that can hand back a page of posts older than a
//! cursor timestamp. The backfill orchestrator only ever talks to the
//! `SourceClient` trait; the concrete Hacker News client lives here and
//! other transports slot in behind the same interface.

pub mod hackernews;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Post;

pub use hackernews::{HackerNewsClient, HackerNewsConfig};

/// Errors from source transports.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

/// Cursor-paged fetch of posts for one source.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch up to `limit` posts created strictly before `cursor`
    /// (unix seconds), newest first. An empty page means the source is
    /// exhausted at this cursor.
    async fn fetch_older_than(
        &self,
        source_id: &str,
        cursor: i64,
        limit: usize,
    ) -> Result<Vec<Post>, SourceError>;
}
