//! Post repository for SQLite persistence.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::{parse_datetime, to_option, PostStore, Result};
use crate::models::{ExtractedMetadata, ExtractionMethod, Outcome, Post, RelevanceVerdict};

/// A post as stored, with its verdict and extracted metadata attached.
#[derive(Debug, Clone)]
pub struct StoredPost {
    pub post: Post,
    pub relevance_score: u8,
    pub metadata: ExtractedMetadata,
}

/// SQLite-backed post repository (sync).
pub struct PostRepository {
    db_path: PathBuf,
}

impl PostRepository {
    /// Create a new post repository.
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
            CREATE TABLE IF NOT EXISTS posts (
                post_id TEXT NOT NULL,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                url TEXT,
                author TEXT,
                created_at TEXT NOT NULL,
                scraped_at TEXT NOT NULL,
                relevance_score INTEGER NOT NULL,
                company TEXT,
                role_type TEXT,
                level TEXT,
                location TEXT,
                outcome TEXT,
                sentiment TEXT,
                difficulty TEXT,
                timeline TEXT,
                interview_topics TEXT NOT NULL DEFAULT '[]',
                provenance TEXT NOT NULL DEFAULT '{}',
                PRIMARY KEY (source, post_id)
            );
            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
            CREATE INDEX IF NOT EXISTS idx_posts_company ON posts(company);
        "#,
        )?;
        Ok(())
    }

    /// Get a stored post by natural key.
    pub fn get(&self, source: &str, post_id: &str) -> Result<Option<StoredPost>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM posts WHERE source = ? AND post_id = ?")?;

        to_option(stmt.query_row(params![source, post_id], |row| {
            let topics: String = row.get("interview_topics")?;
            let provenance: String = row.get("provenance")?;
            Ok(StoredPost {
                post: Post {
                    post_id: row.get("post_id")?,
                    source: row.get("source")?,
                    title: row.get("title")?,
                    body: row.get("body")?,
                    url: row.get("url")?,
                    author: row.get("author")?,
                    created_at: parse_datetime(&row.get::<_, String>("created_at")?),
                    scraped_at: parse_datetime(&row.get::<_, String>("scraped_at")?),
                },
                relevance_score: row.get::<_, i64>("relevance_score")? as u8,
                metadata: ExtractedMetadata {
                    company: row.get("company")?,
                    role_type: row.get("role_type")?,
                    level: row.get("level")?,
                    location: row.get("location")?,
                    outcome: row
                        .get::<_, Option<String>>("outcome")?
                        .map(|s| Outcome::normalize(&s)),
                    sentiment: row.get("sentiment")?,
                    difficulty: row.get("difficulty")?,
                    timeline: row.get("timeline")?,
                    interview_topics: serde_json::from_str(&topics).unwrap_or_default(),
                    provenance: serde_json::from_str::<
                        std::collections::BTreeMap<String, ExtractionMethod>,
                    >(&provenance)
                    .unwrap_or_default(),
                },
            })
        }))
    }

    /// Total stored posts.
    pub fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Stored posts per source, for status reporting.
    pub fn counts_by_source(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT source, COUNT(*) FROM posts GROUP BY source ORDER BY source")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl PostStore for PostRepository {
    fn upsert(
        &self,
        post: &Post,
        verdict: &RelevanceVerdict,
        meta: &ExtractedMetadata,
    ) -> Result<bool> {
        let conn = self.connect()?;

        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE source = ? AND post_id = ?",
            params![post.source, post.post_id],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO posts (
                post_id, source, title, body, url, author, created_at, scraped_at,
                relevance_score, company, role_type, level, location, outcome,
                sentiment, difficulty, timeline, interview_topics, provenance
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            ON CONFLICT(source, post_id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                url = excluded.url,
                author = excluded.author,
                scraped_at = excluded.scraped_at,
                relevance_score = excluded.relevance_score,
                company = excluded.company,
                role_type = excluded.role_type,
                level = excluded.level,
                location = excluded.location,
                outcome = excluded.outcome,
                sentiment = excluded.sentiment,
                difficulty = excluded.difficulty,
                timeline = excluded.timeline,
                interview_topics = excluded.interview_topics,
                provenance = excluded.provenance
            "#,
            params![
                post.post_id,
                post.source,
                post.title,
                post.body,
                post.url,
                post.author,
                post.created_at.to_rfc3339(),
                post.scraped_at.to_rfc3339(),
                verdict.score as i64,
                meta.company,
                meta.role_type,
                meta.level,
                meta.location,
                meta.outcome.map(|o| o.as_str()),
                meta.sentiment,
                meta.difficulty,
                meta.timeline,
                serde_json::to_string(&meta.interview_topics)?,
                serde_json::to_string(&meta.provenance)?,
            ],
        )?;

        Ok(existing == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_post(id: &str) -> Post {
        Post {
            post_id: id.to_string(),
            source: "cscareerquestions".to_string(),
            title: "My Google onsite".to_string(),
            body: "I passed all five rounds.".to_string(),
            url: Some("https://example.com/p/1".to_string()),
            author: Some("throwaway123".to_string()),
            created_at: Utc::now(),
            scraped_at: Utc::now(),
        }
    }

    fn verdict() -> RelevanceVerdict {
        RelevanceVerdict {
            score: 75,
            is_relevant: true,
            threshold_used: 40,
        }
    }

    #[test]
    fn test_upsert_and_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(&dir.path().join("test.db")).unwrap();

        let post = sample_post("abc");
        let meta = ExtractedMetadata {
            company: Some("Google".to_string()),
            outcome: Some(Outcome::Passed),
            interview_topics: vec!["system design".to_string()],
            ..Default::default()
        };

        assert!(repo.upsert(&post, &verdict(), &meta).unwrap());

        let stored = repo.get("cscareerquestions", "abc").unwrap().unwrap();
        assert_eq!(stored.post.title, "My Google onsite");
        assert_eq!(stored.relevance_score, 75);
        assert_eq!(stored.metadata.company.as_deref(), Some("Google"));
        assert_eq!(stored.metadata.outcome, Some(Outcome::Passed));
        assert_eq!(stored.metadata.interview_topics, vec!["system design"]);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(&dir.path().join("test.db")).unwrap();

        let post = sample_post("abc");
        let meta = ExtractedMetadata::default();

        assert!(repo.upsert(&post, &verdict(), &meta).unwrap());
        assert!(!repo.upsert(&post, &verdict(), &meta).unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_same_post_id_different_sources() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(&dir.path().join("test.db")).unwrap();

        let meta = ExtractedMetadata::default();
        let a = sample_post("abc");
        let mut b = sample_post("abc");
        b.source = "leetcode".to_string();

        assert!(repo.upsert(&a, &verdict(), &meta).unwrap());
        assert!(repo.upsert(&b, &verdict(), &meta).unwrap());
        assert_eq!(repo.count().unwrap(), 2);

        let by_source = repo.counts_by_source().unwrap();
        assert_eq!(
            by_source,
            vec![
                ("cscareerquestions".to_string(), 1),
                ("leetcode".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_get_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = PostRepository::new(&dir.path().join("test.db")).unwrap();
        assert!(repo.get("cscareerquestions", "nope").unwrap().is_none());
    }
}
