//! Data models for the interview mining pipeline.

mod checkpoint;
mod metadata;
mod post;
mod question;

pub use checkpoint::{BackfillCheckpoint, BackfillStatus};
pub use metadata::{ExtractedMetadata, ExtractionMethod, Outcome};
pub use post::{Post, RelevanceVerdict};
pub use question::{MinedQuestion, QuestionType};
