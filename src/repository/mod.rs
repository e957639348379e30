//! Repository layer for SQLite persistence.
//!
//! Sync rusqlite repositories, one per table. Each repository owns its
//! schema and creates it on construction; all writes are upserts so a
//! re-run of the same page is a no-op.

pub mod checkpoints;
pub mod posts;
pub mod questions;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::models::{BackfillCheckpoint, ExtractedMetadata, MinedQuestion, Post, RelevanceVerdict};

pub use checkpoints::CheckpointRepository;
pub use posts::PostRepository;
pub use questions::QuestionRepository;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence seam for posts, as the orchestrator sees it.
pub trait PostStore: Send + Sync {
    /// Upsert a post with its verdict and extracted metadata. Returns
    /// true if the post was new.
    fn upsert(
        &self,
        post: &Post,
        verdict: &RelevanceVerdict,
        meta: &ExtractedMetadata,
    ) -> Result<bool>;
}

/// Persistence seam for mined questions.
pub trait QuestionStore: Send + Sync {
    /// Upsert the questions mined from one post. Returns how many rows
    /// were written.
    fn upsert_for_post(&self, post_id: &str, questions: &[MinedQuestion]) -> Result<usize>;
}

/// Persistence seam for backfill checkpoints.
pub trait CheckpointStore: Send + Sync {
    /// Seed one checkpoint per source, pending unless the window is
    /// already exhausted (then completed). Existing rows are left
    /// untouched, so calling this repeatedly is safe.
    fn seed(&self, source_ids: &[String], now: DateTime<Utc>, window_end: DateTime<Utc>)
        -> Result<usize>;

    /// Pick the next source to work on: in-progress first, then least
    /// recently run (never-run first), then insertion order. `None`
    /// means every source is completed.
    fn next_source(&self) -> Result<Option<BackfillCheckpoint>>;

    /// Transition a checkpoint to in-progress and stamp the run times.
    fn mark_in_progress(&self, source_id: &str, now: DateTime<Utc>) -> Result<()>;

    /// Persist the checkpoint after a page has been processed.
    fn update(&self, checkpoint: &BackfillCheckpoint) -> Result<()>;

    /// All checkpoints, in insertion order.
    fn all(&self) -> Result<Vec<BackfillCheckpoint>>;
}

/// Open a connection with the pragmas every repository relies on.
fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Map `QueryReturnedNoRows` to `None` instead of an error.
fn to_option<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
