//! Extracted interview metadata and field provenance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which extraction stage produced a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Ner,
    Pattern,
    Llm,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ner => "ner",
            Self::Pattern => "pattern",
            Self::Llm => "llm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ner" => Some(Self::Ner),
            "pattern" => Some(Self::Pattern),
            "llm" => Some(Self::Llm),
            _ => None,
        }
    }
}

/// Canonical interview outcome vocabulary.
///
/// Stages report outcomes in loose wording ("offer", "reject", ...);
/// normalization happens once in the cascade so downstream consumers
/// only ever see these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Pending,
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }

    /// Map loose outcome wording to the canonical vocabulary.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pass" | "passed" | "offer" | "accept" | "accepted" => Self::Passed,
            "fail" | "failed" | "reject" | "rejected" => Self::Failed,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

/// Metadata fields resolved for one post by the extraction cascade.
///
/// Invariant: each field is populated by the first stage (NER > pattern >
/// LLM) that returns a value; later stages never overwrite it. The
/// `provenance` map records which stage filled each populated field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub company: Option<String>,
    pub role_type: Option<String>,
    pub level: Option<String>,
    pub location: Option<String>,
    pub outcome: Option<Outcome>,
    pub sentiment: Option<String>,
    pub difficulty: Option<String>,
    pub timeline: Option<String>,
    pub interview_topics: Vec<String>,
    /// Field name → stage that produced it.
    pub provenance: BTreeMap<String, ExtractionMethod>,
}

impl ExtractedMetadata {
    /// Number of fields with recorded provenance.
    pub fn populated_fields(&self) -> usize {
        self.provenance.len()
    }

    /// Provenance for one field, if it was extracted.
    pub fn source_of(&self, field: &str) -> Option<ExtractionMethod> {
        self.provenance.get(field).copied()
    }
}
