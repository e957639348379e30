//! Backfill checkpoint repository for SQLite persistence.
//!
//! The rowid doubles as insertion order, which is the final tie-break
//! when picking the next source to work on.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::{parse_datetime_opt, to_option, CheckpointStore, Result};
use crate::models::{BackfillCheckpoint, BackfillStatus};

/// SQLite-backed checkpoint repository (sync).
pub struct CheckpointRepository {
    db_path: PathBuf,
}

impl CheckpointRepository {
    /// Create a new checkpoint repository.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS backfill_checkpoints (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id TEXT NOT NULL UNIQUE,
                cursor_position INTEGER NOT NULL,
                window_end INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                posts_scraped INTEGER NOT NULL DEFAULT 0,
                posts_saved INTEGER NOT NULL DEFAULT 0,
                last_post_id TEXT,
                started_at TEXT,
                last_run_at TEXT,
                completed_at TEXT
            );
        "#,
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<BackfillCheckpoint> {
        Ok(BackfillCheckpoint {
            source_id: row.get("source_id")?,
            cursor_position: row.get("cursor_position")?,
            window_end: row.get("window_end")?,
            status: BackfillStatus::from_str(&row.get::<_, String>("status")?)
                .unwrap_or(BackfillStatus::Pending),
            posts_scraped: row.get::<_, i64>("posts_scraped")? as u64,
            posts_saved: row.get::<_, i64>("posts_saved")? as u64,
            last_post_id: row.get("last_post_id")?,
            started_at: parse_datetime_opt(row.get::<_, Option<String>>("started_at")?),
            last_run_at: parse_datetime_opt(row.get::<_, Option<String>>("last_run_at")?),
            completed_at: parse_datetime_opt(row.get::<_, Option<String>>("completed_at")?),
        })
    }

    /// Get a checkpoint by source.
    pub fn get(&self, source_id: &str) -> Result<Option<BackfillCheckpoint>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM backfill_checkpoints WHERE source_id = ?")?;
        to_option(stmt.query_row(params![source_id], Self::from_row))
    }
}

impl CheckpointStore for CheckpointRepository {
    fn seed(
        &self,
        source_ids: &[String],
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<usize> {
        let conn = self.connect()?;
        let mut created = 0;

        // A window exhausted at seed time has no work: selection only
        // considers cursors strictly past the window end, so a pending
        // row here would be stranded forever.
        let (status, completed_at) = if now.timestamp() <= window_end.timestamp() {
            ("completed", Some(now.to_rfc3339()))
        } else {
            ("pending", None)
        };

        for source_id in source_ids {
            created += conn.execute(
                r#"
                INSERT INTO backfill_checkpoints
                    (source_id, cursor_position, window_end, status, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(source_id) DO NOTHING
                "#,
                params![
                    source_id,
                    now.timestamp(),
                    window_end.timestamp(),
                    status,
                    completed_at,
                ],
            )?;
        }

        Ok(created)
    }

    fn next_source(&self) -> Result<Option<BackfillCheckpoint>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM backfill_checkpoints
            WHERE status IN ('pending', 'in_progress')
              AND cursor_position > window_end
            ORDER BY
                CASE WHEN status = 'in_progress' THEN 0 ELSE 1 END,
                last_run_at ASC NULLS FIRST,
                id ASC
            LIMIT 1
            "#,
        )?;
        to_option(stmt.query_row([], Self::from_row))
    }

    fn mark_in_progress(&self, source_id: &str, now: DateTime<Utc>) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            UPDATE backfill_checkpoints
            SET status = 'in_progress',
                started_at = COALESCE(started_at, ?2),
                last_run_at = ?2
            WHERE source_id = ?1
            "#,
            params![source_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    fn update(&self, checkpoint: &BackfillCheckpoint) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            UPDATE backfill_checkpoints
            SET cursor_position = ?2,
                status = ?3,
                posts_scraped = ?4,
                posts_saved = ?5,
                last_post_id = ?6,
                completed_at = ?7
            WHERE source_id = ?1
            "#,
            params![
                checkpoint.source_id,
                checkpoint.cursor_position,
                checkpoint.status.as_str(),
                checkpoint.posts_scraped as i64,
                checkpoint.posts_saved as i64,
                checkpoint.last_post_id,
                checkpoint.completed_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<BackfillCheckpoint>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM backfill_checkpoints ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
