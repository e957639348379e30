//! Interlore - interview experience acquisition and mining pipeline.
//!
//! Classifies free-text forum posts for genuine interview experiences,
//! extracts structured metadata through a cost-ordered cascade, mines
//! literal interview questions, and backfills sources through resumable,
//! checkpointed batch runs.

pub mod backfill;
pub mod cli;
pub mod companies;
pub mod config;
pub mod extraction;
pub mod llm;
pub mod mining;
pub mod models;
pub mod relevance;
pub mod repository;
pub mod sources;

pub use backfill::{BackfillOrchestrator, BackfillProgress, StepReport};
pub use companies::CompanyDirectory;
pub use config::PipelineConfig;
pub use extraction::CascadeExtractor;
pub use relevance::RelevanceScorer;
