//! LLM-backed analysis.

mod client;

pub use client::{
    parse_analysis, LlmAnalysis, LlmBackend, LlmClient, LlmConfig, LlmError,
    DEFAULT_ANALYSIS_PROMPT,
};
