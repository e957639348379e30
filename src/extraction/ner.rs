//! NER micro-service client.
//!
//! Thin wrapper over the entity-extraction HTTP service. The service is
//! optional infrastructure: absence or a timeout is a normal, handled
//! condition and the cascade simply moves on to the next stage.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest text snippet sent to the NER service.
pub const NER_SNIPPET_CHARS: usize = 2000;
/// Request timeout; the service is a best-effort fast path.
pub const NER_TIMEOUT_MS: u64 = 3000;

/// Fields the NER service can resolve for an interview post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NerFields {
    pub company: Option<String>,
    pub role_type: Option<String>,
    pub level: Option<String>,
    pub location: Option<String>,
    pub outcome: Option<String>,
}

/// Backend abstraction so the cascade can run against a stub in tests.
#[async_trait]
pub trait NerBackend: Send + Sync {
    async fn extract(&self, text: &str) -> Result<NerFields, NerError>;
}

/// Configuration for the NER service client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Service base URL (default: http://ner-service:8000)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "http://ner-service:8000".to_string()
}
fn default_timeout_ms() -> u64 {
    NER_TIMEOUT_MS
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl NerConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

/// HTTP client for the NER service.
pub struct NerClient {
    config: NerConfig,
    client: Client,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
}

impl NerClient {
    pub fn new(config: NerConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    /// Truncate text to the snippet limit on a UTF-8 boundary.
    fn snippet<'a>(&self, text: &'a str) -> &'a str {
        if text.len() <= NER_SNIPPET_CHARS {
            return text;
        }
        let mut end = NER_SNIPPET_CHARS;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

#[async_trait]
impl NerBackend for NerClient {
    async fn extract(&self, text: &str) -> Result<NerFields, NerError> {
        if !self.config.enabled {
            return Err(NerError::Disabled);
        }

        let url = format!("{}/extract-metadata", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&ExtractRequest {
                text: self.snippet(text),
            })
            .send()
            .await
            .map_err(|e| NerError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NerError::Api(format!("HTTP {}", resp.status())));
        }

        let fields: NerFields = resp
            .json()
            .await
            .map_err(|e| NerError::Parse(e.to_string()))?;

        debug!(
            company = fields.company.as_deref(),
            outcome = fields.outcome.as_deref(),
            "NER extraction returned"
        );
        Ok(fields)
    }
}

/// Errors from the NER service. All of these are recovered locally by
/// the cascade; none propagate past the extraction stage.
#[derive(Debug)]
pub enum NerError {
    /// Failed to connect or timed out
    Connection(String),
    /// Service returned an error status
    Api(String),
    /// Failed to parse response
    Parse(String),
    /// NER stage is disabled by configuration
    Disabled,
}

impl std::fmt::Display for NerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NerError::Connection(msg) => write!(f, "Connection error: {}", msg),
            NerError::Api(msg) => write!(f, "API error: {}", msg),
            NerError::Parse(msg) => write!(f, "Parse error: {}", msg),
            NerError::Disabled => write!(f, "NER is disabled"),
        }
    }
}

impl std::error::Error for NerError {}
