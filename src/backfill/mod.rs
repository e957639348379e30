//! Backfill orchestration.
//!
//! Walks each configured source backward through time, one bounded step
//! at a time. All progress lives in the checkpoint store, so a crashed
//! or interrupted run resumes exactly where it stopped and re-processing
//! a page is harmless (every write is an upsert).

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::extraction::CascadeExtractor;
use crate::mining::{extract_questions, MinerOptions};
use crate::models::{BackfillCheckpoint, BackfillStatus, Post};
use crate::relevance::{RelevanceScorer, RelevanceStats};
use crate::repository::{CheckpointStore, PostStore, QuestionStore, Result as StoreResult};
use crate::sources::SourceClient;

/// What one backfill step did.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub source_id: String,
    /// Posts fetched from the source this step.
    pub scraped: usize,
    /// Posts that passed relevance and were newly stored.
    pub saved: usize,
    /// Per-record failures (extraction stages, store writes).
    pub errors: usize,
    /// True if this step finished the source's window.
    pub source_completed: bool,
}

/// Aggregate backfill progress across all sources.
#[derive(Debug, Clone, Default)]
pub struct BackfillProgress {
    pub total_sources: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub posts_scraped: u64,
    pub posts_saved: u64,
    pub checkpoints: Vec<BackfillCheckpoint>,
}

impl BackfillProgress {
    pub fn all_completed(&self) -> bool {
        self.total_sources > 0 && self.completed == self.total_sources
    }
}

/// Drives the score → extract → mine → store pipeline per source page.
pub struct BackfillOrchestrator {
    config: PipelineConfig,
    scorer: RelevanceScorer,
    extractor: CascadeExtractor,
    miner_opts: MinerOptions,
    source_client: Arc<dyn SourceClient>,
    posts: Arc<dyn PostStore>,
    questions: Arc<dyn QuestionStore>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl BackfillOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        scorer: RelevanceScorer,
        extractor: CascadeExtractor,
        source_client: Arc<dyn SourceClient>,
        posts: Arc<dyn PostStore>,
        questions: Arc<dyn QuestionStore>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        let miner_opts = config.miner.options();
        Self {
            config,
            scorer,
            extractor,
            miner_opts,
            source_client,
            posts,
            questions,
            checkpoints,
        }
    }

    /// Seed one checkpoint per configured source, cursor at now and the
    /// window reaching `window_days` back. Existing checkpoints are kept.
    pub fn init(&self) -> StoreResult<usize> {
        let now = Utc::now();
        let window_end = now - Duration::days(self.config.backfill.window_days);
        let created = self
            .checkpoints
            .seed(&self.config.sources, now, window_end)?;
        info!(
            created,
            total = self.config.sources.len(),
            "initialized backfill tracking"
        );
        Ok(created)
    }

    /// Run one bounded step: pick a source, process one page, advance
    /// its checkpoint. Returns `None` once every source is completed.
    /// Partial failures are counted in the report, never returned as
    /// errors; only checkpoint-store failures abort.
    pub async fn step(&self) -> StoreResult<Option<StepReport>> {
        let Some(mut checkpoint) = self.checkpoints.next_source()? else {
            info!("all sources completed, backfill is done");
            return Ok(None);
        };

        let source_id = checkpoint.source_id.clone();
        let now = Utc::now();
        self.checkpoints.mark_in_progress(&source_id, now)?;
        checkpoint.status = BackfillStatus::InProgress;

        info!(
            source = %source_id,
            cursor = checkpoint.cursor_position,
            saved_total = checkpoint.posts_saved,
            "processing backfill step"
        );

        let page = match self
            .source_client
            .fetch_older_than(
                &source_id,
                checkpoint.cursor_position,
                self.config.backfill.batch_size,
            )
            .await
        {
            Ok(page) => page,
            Err(e) => {
                // Transient transport failure: leave the cursor alone so
                // the next step retries the same page.
                warn!(source = %source_id, "fetch failed: {}", e);
                return Ok(Some(StepReport {
                    source_id,
                    scraped: 0,
                    saved: 0,
                    errors: 1,
                    source_completed: false,
                }));
            }
        };

        let mut report = StepReport {
            source_id: source_id.clone(),
            scraped: page.len(),
            saved: 0,
            errors: 0,
            source_completed: false,
        };
        let mut stats = RelevanceStats::default();

        for post in &page {
            match self.process_post(post, &mut stats).await {
                Ok(ProcessOutcome { saved, errors }) => {
                    if saved {
                        report.saved += 1;
                    }
                    report.errors += errors;
                }
                Err(e) => {
                    // Store failure: count it and stop before the
                    // checkpoint advances past unwritten records.
                    warn!(source = %source_id, post_id = %post.post_id, "store failed: {}", e);
                    report.errors += 1;
                    return Ok(Some(report));
                }
            }
        }

        // Advance the cursor to the oldest record of this page.
        if let Some(oldest) = page.iter().min_by_key(|p| p.created_at) {
            checkpoint.cursor_position = oldest.created_at.timestamp();
            checkpoint.last_post_id = Some(oldest.post_id.clone());
        }
        checkpoint.posts_scraped += report.scraped as u64;
        checkpoint.posts_saved += report.saved as u64;

        if page.is_empty() || checkpoint.window_exhausted() {
            checkpoint.status = BackfillStatus::Completed;
            checkpoint.completed_at = Some(Utc::now());
            report.source_completed = true;
        }
        self.checkpoints.update(&checkpoint)?;

        info!(
            source = %source_id,
            scraped = report.scraped,
            saved = report.saved,
            errors = report.errors,
            precision_pct = stats.precision_pct(),
            completed = report.source_completed,
            "backfill step finished"
        );
        Ok(Some(report))
    }

    /// Run steps until every source completes or `max_steps` is hit,
    /// pausing between steps to pace LLM-heavy extraction.
    pub async fn run(&self, max_steps: Option<usize>) -> StoreResult<Vec<StepReport>> {
        let mut reports = Vec::new();

        loop {
            if let Some(max) = max_steps {
                if reports.len() >= max {
                    break;
                }
            }
            match self.step().await? {
                Some(report) => reports.push(report),
                None => break,
            }
            tokio::time::sleep(std::time::Duration::from_secs(
                self.config.backfill.batch_delay_secs,
            ))
            .await;
        }

        Ok(reports)
    }

    /// Progress summary across all checkpoints.
    pub fn progress(&self) -> StoreResult<BackfillProgress> {
        let checkpoints = self.checkpoints.all()?;
        let mut progress = BackfillProgress {
            total_sources: checkpoints.len(),
            ..Default::default()
        };

        for cp in &checkpoints {
            match cp.status {
                BackfillStatus::Pending => progress.pending += 1,
                BackfillStatus::InProgress => progress.in_progress += 1,
                BackfillStatus::Completed => progress.completed += 1,
            }
            progress.posts_scraped += cp.posts_scraped;
            progress.posts_saved += cp.posts_saved;
        }

        progress.checkpoints = checkpoints;
        Ok(progress)
    }

    async fn process_post(
        &self,
        post: &Post,
        stats: &mut RelevanceStats,
    ) -> StoreResult<ProcessOutcome> {
        let threshold = self.config.threshold_for(&post.source);
        let verdict = self.scorer.verdict(&post.title, &post.body, threshold);
        stats.record(&verdict);

        if !verdict.is_relevant {
            return Ok(ProcessOutcome {
                saved: false,
                errors: 0,
            });
        }

        let extraction = self.extractor.extract(post).await;
        let questions = extract_questions(&post.full_text(), &self.miner_opts);

        let newly_saved = self.posts.upsert(post, &verdict, &extraction.metadata)?;
        self.questions.upsert_for_post(&post.post_id, &questions)?;

        Ok(ProcessOutcome {
            saved: newly_saved,
            errors: extraction.stage_errors,
        })
    }
}

struct ProcessOutcome {
    saved: bool,
    errors: usize,
}
