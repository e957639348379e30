//! Mined interview question candidates.

use serde::{Deserialize, Serialize};

/// Broad category of an interview question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Coding,
    SystemDesign,
    Behavioral,
    Technical,
    Unknown,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::SystemDesign => "system_design",
            Self::Behavioral => "behavioral",
            Self::Technical => "technical",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "coding" => Some(Self::Coding),
            "system_design" => Some(Self::SystemDesign),
            "behavioral" => Some(Self::Behavioral),
            "technical" => Some(Self::Technical),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// One question candidate mined from a post's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinedQuestion {
    /// Cleaned question text as it will be stored.
    pub text: String,
    /// Lowercased, punctuation-stripped form used for deduplication.
    pub normalized: String,
    /// Confidence weight of the pattern that matched (0.75..=0.95).
    pub confidence: f64,
    pub question_type: QuestionType,
    /// Name of the extraction pattern that produced this candidate.
    pub source_pattern: &'static str,
    /// How many raw matches were merged into this candidate.
    pub frequency: u32,
}
