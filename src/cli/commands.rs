//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;

use crate::backfill::BackfillOrchestrator;
use crate::companies::CompanyDirectory;
use crate::config::PipelineConfig;
use crate::extraction::{CascadeExtractor, NerClient};
use crate::llm::LlmClient;
use crate::relevance::RelevanceScorer;
use crate::repository::{CheckpointRepository, PostRepository, QuestionRepository};
use crate::sources::HackerNewsClient;

#[derive(Parser)]
#[command(name = "interlore")]
#[command(about = "Interview experience acquisition and mining pipeline")]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "interlore.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize backfill tracking for configured sources
    Init,

    /// Run backfill steps until done or the step limit is reached
    Run {
        /// Maximum steps to run (0 = until all sources complete)
        #[arg(short, long, default_value = "0")]
        steps: usize,
    },

    /// Show backfill progress and stored totals
    Status,
}

fn build_orchestrator(config: &PipelineConfig) -> anyhow::Result<BackfillOrchestrator> {
    let posts = Arc::new(PostRepository::new(&config.db_path)?);
    let questions = Arc::new(QuestionRepository::new(&config.db_path)?);
    let checkpoints = Arc::new(CheckpointRepository::new(&config.db_path)?);

    let directory = Arc::new(CompanyDirectory::builtin());
    let scorer = RelevanceScorer::new(directory.clone());

    let mut extractor = CascadeExtractor::new(directory).with_ai(config.use_ai);
    if config.ner.enabled {
        extractor = extractor.with_ner(Box::new(NerClient::new(config.ner.clone())));
    }
    if config.llm.enabled {
        extractor = extractor.with_llm(Box::new(LlmClient::new(config.llm.clone())));
    }

    let source_client = Arc::new(HackerNewsClient::new(config.hackernews.clone()));

    Ok(BackfillOrchestrator::new(
        config.clone(),
        scorer,
        extractor,
        source_client,
        posts,
        questions,
        checkpoints,
    ))
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let orchestrator = build_orchestrator(&config)?;
            let created = orchestrator.init()?;
            println!(
                "{} {} source(s) tracked ({} new)",
                style("✓").green(),
                config.sources.len(),
                created
            );
        }

        Commands::Run { steps } => {
            let orchestrator = build_orchestrator(&config)?;
            orchestrator.init()?;

            let max_steps = if steps == 0 { None } else { Some(steps) };
            let reports = orchestrator.run(max_steps).await?;

            let scraped: usize = reports.iter().map(|r| r.scraped).sum();
            let saved: usize = reports.iter().map(|r| r.saved).sum();
            let errors: usize = reports.iter().map(|r| r.errors).sum();
            println!(
                "{} {} step(s): {} scraped, {} saved, {} error(s)",
                style("✓").green(),
                reports.len(),
                scraped,
                saved,
                errors
            );
        }

        Commands::Status => {
            let orchestrator = build_orchestrator(&config)?;
            let progress = orchestrator.progress()?;
            let posts = PostRepository::new(&config.db_path)?;
            let questions = QuestionRepository::new(&config.db_path)?;

            println!("{}", style("Backfill").bold());
            println!(
                "  sources: {} ({} pending, {} in progress, {} completed)",
                progress.total_sources,
                progress.pending,
                progress.in_progress,
                progress.completed
            );
            for cp in &progress.checkpoints {
                println!(
                    "  {:<20} {:<12} scraped {:>6}  saved {:>6}",
                    cp.source_id,
                    cp.status.as_str(),
                    cp.posts_scraped,
                    cp.posts_saved
                );
            }

            println!("{}", style("Stored").bold());
            println!("  posts: {}", posts.count()?);
            for (source, count) in posts.counts_by_source()? {
                println!("  {:<20} {:>6}", source, count);
            }
            println!("  questions: {}", questions.count()?);
        }
    }

    Ok(())
}
