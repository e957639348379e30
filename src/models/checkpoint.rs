//! Backfill checkpoint model.
//!
//! One checkpoint row is tracked per source. The cursor walks backward
//! in time from the moment the backfill was initialized to the window
//! end, and only the orchestrator mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a source's backfill. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillStatus {
    Pending,
    InProgress,
    Completed,
}

impl BackfillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Persisted progress of a backfill run for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillCheckpoint {
    pub source_id: String,
    /// Unix seconds; only posts older than this are fetched next.
    pub cursor_position: i64,
    /// Unix seconds; the backfill is done once the cursor crosses this.
    pub window_end: i64,
    pub status: BackfillStatus,
    pub posts_scraped: u64,
    pub posts_saved: u64,
    /// Id of the oldest post processed so far, for diagnostics.
    pub last_post_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BackfillCheckpoint {
    /// Create a fresh pending checkpoint covering `[window_end, now]`.
    pub fn new(source_id: &str, now: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.to_string(),
            cursor_position: now.timestamp(),
            window_end: window_end.timestamp(),
            status: BackfillStatus::Pending,
            posts_scraped: 0,
            posts_saved: 0,
            last_post_id: None,
            started_at: None,
            last_run_at: None,
            completed_at: None,
        }
    }

    /// True once the cursor has walked past the window end.
    pub fn window_exhausted(&self) -> bool {
        self.cursor_position <= self.window_end
    }
}
