//! LLM client for deep metadata analysis of interview posts.
//!
//! Supports Ollama API for local LLM inference.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default prompt for extracting structured metadata from a post.
pub const DEFAULT_ANALYSIS_PROMPT: &str = r#"You are analyzing a post about a software engineering job interview experience. Read the ENTIRE post before answering.

Extract the following fields. Use null for anything the post does not state; do NOT guess.

- company: the company the author interviewed with (canonical name, e.g. "Google" not "goog")
- role: the role interviewed for (e.g. "frontend", "backend", "fullstack", "data", "mobile", "devops")
- experience_level: seniority of the role (e.g. "intern", "junior", "mid", "senior", "staff")
- location: city/country or "remote" if stated
- sentiment: the author's overall tone, one of "positive", "negative", "mixed", "neutral"
- difficulty_level: how hard the author found it, one of "easy", "medium", "hard"
- timeline: how long the process took (e.g. "3 weeks", "2 months")
- outcome: what happened, one of "passed", "failed", "pending" - or null if unclear
- interview_topics: list of technical topics covered (e.g. ["dynamic programming", "system design"])
- interview_questions: list of literal questions the author reports being asked
- leetcode_problems: list of specific LeetCode problems mentioned by name or number

Post Title: {title}

Post Content:
{content}

Respond with ONLY a single JSON object containing exactly these keys. No markdown, no explanation."#;

/// Configuration for LLM client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether LLM analysis is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama API endpoint (default: http://localhost:11434)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for analysis
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Custom analysis prompt (uses {title} and {content} placeholders)
    #[serde(default)]
    pub analysis_prompt: Option<String>,
    /// Maximum characters of post content to send to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_enabled() -> bool {
    false
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2:3b-instruct-q5_K_M".to_string()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_content_chars() -> usize {
    6000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            analysis_prompt: None,
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl LlmConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Get the analysis prompt, using custom or default.
    pub fn get_analysis_prompt(&self) -> &str {
        self.analysis_prompt
            .as_deref()
            .unwrap_or(DEFAULT_ANALYSIS_PROMPT)
    }
}

/// Structured fields the model returns for a post.
///
/// Every field is optional: the model is told to emit null rather than
/// guess, and the cascade only fills gaps the cheaper stages left.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmAnalysis {
    pub company: Option<String>,
    pub role: Option<String>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub sentiment: Option<String>,
    pub difficulty_level: Option<String>,
    pub timeline: Option<String>,
    pub outcome: Option<String>,
    #[serde(default)]
    pub interview_topics: Vec<String>,
    #[serde(default)]
    pub interview_questions: Vec<String>,
    #[serde(default)]
    pub leetcode_problems: Vec<String>,
}

/// Backend abstraction so the cascade can run against a stub in tests.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn analyze(&self, title: &str, text: &str) -> Result<LlmAnalysis, LlmError>;
}

/// LLM client for post analysis.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the LLM service is available.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Truncate content to configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= self.config.max_content_chars {
            return text;
        }
        let mut end = self.config.max_content_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn analyze(&self, title: &str, text: &str) -> Result<LlmAnalysis, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        let truncated = self.truncate_content(text);
        let prompt = self
            .config
            .get_analysis_prompt()
            .replace("{title}", title)
            .replace("{content}", truncated);

        debug!("Analyzing post: {}", title);
        let response = self.call_ollama(&prompt).await?;
        parse_analysis(&response)
    }
}

/// Parse the model response into structured fields.
///
/// Models wrap JSON in prose or markdown fences more often than not, so
/// take the substring from the first `{` to the last `}` before parsing.
pub fn parse_analysis(response: &str) -> Result<LlmAnalysis, LlmError> {
    let start = response
        .find('{')
        .ok_or_else(|| LlmError::Parse("No JSON object in response".to_string()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| LlmError::Parse("No JSON object in response".to_string()))?;
    if end < start {
        return Err(LlmError::Parse("No JSON object in response".to_string()));
    }

    serde_json::from_str(&response[start..=end]).map_err(|e| LlmError::Parse(e.to_string()))
}

/// Errors that can occur during LLM operations.
#[derive(Debug)]
pub enum LlmError {
    /// Failed to connect to LLM service
    Connection(String),
    /// API returned an error
    Api(String),
    /// Failed to parse response
    Parse(String),
    /// LLM is disabled
    Disabled,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Connection(msg) => write!(f, "Connection error: {}", msg),
            LlmError::Api(msg) => write!(f, "API error: {}", msg),
            LlmError::Parse(msg) => write!(f, "Parse error: {}", msg),
            LlmError::Disabled => write!(f, "LLM is disabled"),
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let analysis = parse_analysis(
            r#"{"company": "Google", "sentiment": "positive", "outcome": "passed",
                "interview_topics": ["graphs", "system design"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.company.as_deref(), Some("Google"));
        assert_eq!(analysis.sentiment.as_deref(), Some("positive"));
        assert_eq!(analysis.interview_topics.len(), 2);
        assert!(analysis.role.is_none());
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let analysis = parse_analysis(
            "Here is the extracted metadata:\n```json\n\
             {\"company\": \"Stripe\", \"difficulty_level\": \"hard\"}\n```\nDone.",
        )
        .unwrap();
        assert_eq!(analysis.company.as_deref(), Some("Stripe"));
        assert_eq!(analysis.difficulty_level.as_deref(), Some("hard"));
    }

    #[test]
    fn test_parse_nulls_become_none() {
        let analysis =
            parse_analysis(r#"{"company": null, "outcome": null, "interview_topics": []}"#)
                .unwrap();
        assert!(analysis.company.is_none());
        assert!(analysis.outcome.is_none());
        assert!(analysis.interview_topics.is_empty());
    }

    #[test]
    fn test_parse_no_json_is_error() {
        assert!(parse_analysis("I could not find any metadata.").is_err());
        assert!(parse_analysis("").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(!config.enabled);
        assert!(config.analysis_prompt.is_none());
        assert!(config.get_analysis_prompt().contains("{title}"));
        assert!(config.get_analysis_prompt().contains("{content}"));
    }
}
