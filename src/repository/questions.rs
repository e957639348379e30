//! Question repository for SQLite persistence.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection};

use super::{QuestionStore, Result};
use crate::models::{MinedQuestion, QuestionType};

/// A mined question as stored.
#[derive(Debug, Clone)]
pub struct StoredQuestion {
    pub post_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub confidence: f64,
    pub source_pattern: String,
    pub frequency: u32,
}

/// SQLite-backed question repository (sync).
pub struct QuestionRepository {
    db_path: PathBuf,
}

impl QuestionRepository {
    /// Create a new question repository.
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
            CREATE TABLE IF NOT EXISTS questions (
                post_id TEXT NOT NULL,
                question_text TEXT NOT NULL,
                normalized TEXT NOT NULL,
                question_type TEXT NOT NULL,
                confidence REAL NOT NULL,
                source_pattern TEXT NOT NULL,
                frequency INTEGER NOT NULL DEFAULT 1,
                extracted_at TEXT NOT NULL,
                PRIMARY KEY (post_id, question_text)
            );
            CREATE INDEX IF NOT EXISTS idx_questions_type ON questions(question_type);
        "#,
        )?;
        Ok(())
    }

    /// Questions stored for one post.
    pub fn get_for_post(&self, post_id: &str) -> Result<Vec<StoredQuestion>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM questions WHERE post_id = ? ORDER BY confidence DESC, question_text",
        )?;
        let rows = stmt
            .query_map(params![post_id], |row| {
                Ok(StoredQuestion {
                    post_id: row.get("post_id")?,
                    text: row.get("question_text")?,
                    question_type: QuestionType::from_str(
                        &row.get::<_, String>("question_type")?,
                    )
                    .unwrap_or(QuestionType::Unknown),
                    confidence: row.get("confidence")?,
                    source_pattern: row.get("source_pattern")?,
                    frequency: row.get::<_, i64>("frequency")? as u32,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total stored questions.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl QuestionStore for QuestionRepository {
    fn upsert_for_post(&self, post_id: &str, questions: &[MinedQuestion]) -> Result<usize> {
        if questions.is_empty() {
            return Ok(0);
        }

        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        let mut written = 0;

        for q in questions {
            written += conn.execute(
                r#"
                INSERT INTO questions (
                    post_id, question_text, normalized, question_type,
                    confidence, source_pattern, frequency, extracted_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(post_id, question_text) DO UPDATE SET
                    normalized = excluded.normalized,
                    question_type = excluded.question_type,
                    confidence = excluded.confidence,
                    source_pattern = excluded.source_pattern,
                    frequency = excluded.frequency
                "#,
                params![
                    post_id,
                    q.text,
                    q.normalized,
                    q.question_type.as_str(),
                    q.confidence,
                    q.source_pattern,
                    q.frequency as i64,
                    now,
                ],
            )?;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn question(text: &str, confidence: f64) -> MinedQuestion {
        MinedQuestion {
            text: text.to_string(),
            normalized: text.to_lowercase(),
            confidence,
            question_type: QuestionType::Coding,
            source_pattern: "numbered_list",
            frequency: 1,
        }
    }

    #[test]
    fn test_upsert_and_fetch() {
        let dir = TempDir::new().unwrap();
        let repo = QuestionRepository::new(&dir.path().join("test.db")).unwrap();

        let qs = vec![
            question("Implement LRU cache", 0.95),
            question("Reverse a linked list", 0.95),
        ];
        assert_eq!(repo.upsert_for_post("hn_1", &qs).unwrap(), 2);

        let stored = repo.get_for_post("hn_1").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].question_type, QuestionType::Coding);
        assert_eq!(stored[0].source_pattern, "numbered_list");
    }

    #[test]
    fn test_upsert_twice_keeps_one_row_per_question() {
        let dir = TempDir::new().unwrap();
        let repo = QuestionRepository::new(&dir.path().join("test.db")).unwrap();

        let qs = vec![question("Implement LRU cache", 0.95)];
        repo.upsert_for_post("hn_1", &qs).unwrap();

        let mut updated = qs.clone();
        updated[0].frequency = 3;
        repo.upsert_for_post("hn_1", &updated).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        let stored = repo.get_for_post("hn_1").unwrap();
        assert_eq!(stored[0].frequency, 3);
    }

    #[test]
    fn test_same_question_across_posts() {
        let dir = TempDir::new().unwrap();
        let repo = QuestionRepository::new(&dir.path().join("test.db")).unwrap();

        let qs = vec![question("Implement LRU cache", 0.95)];
        repo.upsert_for_post("hn_1", &qs).unwrap();
        repo.upsert_for_post("hn_2", &qs).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }
}
