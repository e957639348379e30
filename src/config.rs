//! Configuration management for the pipeline.
//!
//! A single TOML file (plus `.env` for secrets-ish endpoints) drives
//! every component. Each section deserializes with full defaults, so an
//! empty file is a valid configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extraction::NerConfig;
use crate::llm::LlmConfig;
use crate::mining::MinerOptions;
use crate::relevance::DEFAULT_THRESHOLD;
use crate::sources::HackerNewsConfig;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Question miner tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_confidence() -> f64 {
    0.70
}
fn default_max_results() -> usize {
    20
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_results: default_max_results(),
        }
    }
}

impl MinerConfig {
    pub fn options(&self) -> MinerOptions {
        MinerOptions {
            min_confidence: self.min_confidence,
            max_results: self.max_results,
        }
    }
}

/// Backfill pacing and window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Posts fetched and processed per step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between steps when extraction is LLM-heavy
    #[serde(default = "default_batch_delay_secs")]
    pub batch_delay_secs: u64,
    /// How far back the backfill window reaches
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

fn default_batch_size() -> usize {
    30
}
fn default_batch_delay_secs() -> u64 {
    5
}
fn default_window_days() -> i64 {
    365
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_secs: default_batch_delay_secs(),
            window_days: default_window_days(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Sources tracked by the backfill
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    /// Per-source relevance thresholds; unlisted sources use the default
    #[serde(default = "default_thresholds")]
    pub thresholds: BTreeMap<String, u8>,
    #[serde(default = "default_threshold")]
    pub default_threshold: u8,
    /// Gate for the LLM extraction stage
    #[serde(default)]
    pub use_ai: bool,
    #[serde(default)]
    pub backfill: BackfillConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub ner: NerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("interlore.db")
}

fn default_sources() -> Vec<String> {
    vec!["hackernews".to_string()]
}

fn default_thresholds() -> BTreeMap<String, u8> {
    BTreeMap::from([
        ("cscareerquestions".to_string(), 40),
        ("ExperiencedDevs".to_string(), 45),
        ("csMajors".to_string(), 40),
        ("leetcode".to_string(), 50),
    ])
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            sources: default_sources(),
            thresholds: default_thresholds(),
            default_threshold: default_threshold(),
            use_ai: false,
            backfill: BackfillConfig::default(),
            miner: MinerConfig::default(),
            ner: NerConfig::default(),
            llm: LlmConfig::default(),
            hackernews: HackerNewsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The relevance threshold for a source.
    pub fn threshold_for(&self, source_id: &str) -> u8 {
        self.thresholds
            .get(source_id)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}
