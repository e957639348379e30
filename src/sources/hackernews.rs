//! Hacker News source via the Algolia HN Search API.
//!
//! `search_by_date` returns stories newest-first, which combined with a
//! `created_at_i<cursor` filter gives exactly the backwards time-window
//! paging the backfill needs. No authentication required.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{SourceClient, SourceError};
use crate::models::Post;

/// Configuration for the Hacker News client.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct HackerNewsConfig {
    /// Algolia HN Search API base (default: https://hn.algolia.com/api/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Search query used to pre-filter stories
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://hn.algolia.com/api/v1".to_string()
}
fn default_query() -> String {
    "interview experience".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            query: default_query(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HackerNewsConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

/// Hacker News transport.
pub struct HackerNewsClient {
    config: HackerNewsConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    story_title: Option<String>,
    story_text: Option<String>,
    comment_text: Option<String>,
    url: Option<String>,
    author: Option<String>,
    created_at_i: i64,
}

impl HackerNewsClient {
    pub fn new(config: HackerNewsConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    fn hit_to_post(hit: Hit, source_id: &str) -> Post {
        let title = hit
            .title
            .or(hit.story_title)
            .unwrap_or_else(|| "No title".to_string());
        let body = hit
            .story_text
            .or(hit.comment_text)
            .map(|t| strip_html(&t))
            .unwrap_or_default();
        let url = hit.url.unwrap_or_else(|| {
            format!("https://news.ycombinator.com/item?id={}", hit.object_id)
        });
        let created_at = DateTime::<Utc>::from_timestamp(hit.created_at_i, 0)
            .unwrap_or_else(Utc::now);

        Post {
            post_id: format!("hn_{}", hit.object_id),
            source: source_id.to_string(),
            title,
            body,
            url: Some(url),
            author: hit.author,
            created_at,
            scraped_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SourceClient for HackerNewsClient {
    async fn fetch_older_than(
        &self,
        source_id: &str,
        cursor: i64,
        limit: usize,
    ) -> Result<Vec<Post>, SourceError> {
        let url = format!("{}/search_by_date", self.config.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query", self.config.query.as_str()),
                ("tags", "story"),
                ("hitsPerPage", &limit.to_string()),
                ("numericFilters", &format!("created_at_i<{}", cursor)),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SourceError::Api(format!("HTTP {}", resp.status())));
        }

        let search: SearchResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        debug!(
            source = source_id,
            cursor,
            hits = search.hits.len(),
            "fetched HN page"
        );

        Ok(search
            .hits
            .into_iter()
            .map(|hit| Self::hit_to_post(hit, source_id))
            .collect())
    }
}

/// Strip the minimal HTML that HN story/comment text carries.
fn strip_html(html: &str) -> String {
    let text = html
        .replace("<p>", "\n\n")
        .replace("<br>", "\n");

    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str) -> Hit {
        Hit {
            object_id: id.to_string(),
            title: Some("My Google onsite".to_string()),
            story_title: None,
            story_text: Some("I passed.<p>It was hard.".to_string()),
            comment_text: None,
            url: None,
            author: Some("pg".to_string()),
            created_at_i: 1_700_000_000,
        }
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("Round 1:<p>they asked &quot;why here?&quot;<br>then O(n) &lt; O(n^2)"),
            "Round 1:\n\nthey asked \"why here?\"\nthen O(n) < O(n^2)"
        );
        assert_eq!(strip_html("<a href=\"x\">link</a> text"), "link text");
    }

    #[test]
    fn test_hit_to_post_mapping() {
        let post = HackerNewsClient::hit_to_post(hit("123"), "hackernews");
        assert_eq!(post.post_id, "hn_123");
        assert_eq!(post.source, "hackernews");
        assert_eq!(post.title, "My Google onsite");
        assert_eq!(post.body, "I passed.\n\nIt was hard.");
        assert_eq!(
            post.url.as_deref(),
            Some("https://news.ycombinator.com/item?id=123")
        );
        assert_eq!(post.created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_title_fallback() {
        let mut h = hit("9");
        h.title = None;
        h.story_title = Some("Ask HN: onsite".to_string());
        let post = HackerNewsClient::hit_to_post(h, "hackernews");
        assert_eq!(post.title, "Ask HN: onsite");
    }
}
