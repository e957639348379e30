//! Metadata extraction cascade.
//!
//! Three stages ordered by cost: NER service (fast, narrow), local
//! pattern scan (free), LLM analysis (slow, broad). Each stage only
//! fills fields the earlier stages left empty, and every populated
//! field carries the stage that produced it. Stage failures are logged
//! and skipped; extraction itself never fails.

pub mod ner;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::companies::CompanyDirectory;
use crate::llm::LlmBackend;
use crate::models::{ExtractedMetadata, ExtractionMethod, Outcome, Post};
pub use ner::{NerBackend, NerClient, NerConfig, NerError, NerFields};

/// Window after a "Company:" label in which a directory match is
/// preferred over the first match anywhere in the text.
const LABEL_WINDOW_CHARS: usize = 100;

static COMPANY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcompany\s*[:\-]\s*").expect("company label regex"));

/// What one run of the cascade produced.
#[derive(Debug, Clone)]
pub struct CascadeResult {
    pub metadata: ExtractedMetadata,
    /// Stages that errored (and were skipped) during this run.
    pub stage_errors: usize,
}

/// Runs the extraction stages against a post.
pub struct CascadeExtractor {
    directory: Arc<CompanyDirectory>,
    ner: Option<Box<dyn NerBackend>>,
    llm: Option<Box<dyn LlmBackend>>,
    use_ai: bool,
}

impl CascadeExtractor {
    pub fn new(directory: Arc<CompanyDirectory>) -> Self {
        Self {
            directory,
            ner: None,
            llm: None,
            use_ai: false,
        }
    }

    pub fn with_ner(mut self, ner: Box<dyn NerBackend>) -> Self {
        self.ner = Some(ner);
        self
    }

    pub fn with_llm(mut self, llm: Box<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Allow the LLM stage to run when cheaper stages leave gaps.
    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }

    /// Extract metadata for a post. Infallible: a stage that errors
    /// contributes nothing and the cascade moves on, but the number of
    /// stages that failed is reported for run accounting.
    pub async fn extract(&self, post: &Post) -> CascadeResult {
        let mut meta = ExtractedMetadata::default();
        let mut stage_errors = 0;
        let text = post.full_text();

        stage_errors += self.run_ner_stage(&text, &mut meta).await;
        self.run_pattern_stage(&text, &mut meta);
        if self.should_run_llm(&meta) {
            stage_errors += self.run_llm_stage(post, &text, &mut meta).await;
        }

        debug!(
            post_id = %post.post_id,
            fields = meta.populated_fields(),
            stage_errors,
            "extraction cascade finished"
        );
        CascadeResult {
            metadata: meta,
            stage_errors,
        }
    }

    async fn run_ner_stage(&self, text: &str, meta: &mut ExtractedMetadata) -> usize {
        let Some(ner) = &self.ner else { return 0 };

        match ner.extract(text).await {
            Ok(fields) => {
                let ExtractedMetadata {
                    company,
                    role_type,
                    level,
                    location,
                    provenance,
                    ..
                } = meta;
                fill(company, fields.company, "company", ExtractionMethod::Ner, provenance);
                fill(role_type, fields.role_type, "role_type", ExtractionMethod::Ner, provenance);
                fill(level, fields.level, "level", ExtractionMethod::Ner, provenance);
                fill(location, fields.location, "location", ExtractionMethod::Ner, provenance);
                if let Some(raw) = fields.outcome {
                    fill_outcome(meta, &raw, ExtractionMethod::Ner);
                }
                0
            }
            Err(NerError::Disabled) => 0,
            Err(e) => {
                warn!("NER stage skipped: {}", e);
                1
            }
        }
    }

    /// Company lookup against the directory. A match right after a
    /// literal "Company:" label beats the first match anywhere.
    fn run_pattern_stage(&self, text: &str, meta: &mut ExtractedMetadata) {
        if meta.company.is_some() {
            return;
        }

        let labeled = COMPANY_LABEL.find(text).and_then(|m| {
            let start = m.end();
            let mut end = (start + LABEL_WINDOW_CHARS).min(text.len());
            while end > start && !text.is_char_boundary(end) {
                end -= 1;
            }
            self.directory.find_in_text(&text[start..end]).into_iter().next()
        });

        let company = labeled.or_else(|| self.directory.find_in_text(text).into_iter().next());
        fill(
            &mut meta.company,
            company,
            "company",
            ExtractionMethod::Pattern,
            &mut meta.provenance,
        );
    }

    /// The LLM is worth its cost only when the key fields still have
    /// gaps after the cheap stages.
    fn should_run_llm(&self, meta: &ExtractedMetadata) -> bool {
        self.use_ai
            && self.llm.is_some()
            && (meta.company.is_none()
                || meta.sentiment.is_none()
                || meta.difficulty.is_none()
                || meta.interview_topics.is_empty())
    }

    async fn run_llm_stage(&self, post: &Post, text: &str, meta: &mut ExtractedMetadata) -> usize {
        let Some(llm) = &self.llm else { return 0 };

        match llm.analyze(&post.title, text).await {
            Ok(analysis) => {
                let ExtractedMetadata {
                    company,
                    role_type,
                    level,
                    location,
                    sentiment,
                    difficulty,
                    timeline,
                    provenance,
                    ..
                } = meta;
                fill(company, analysis.company, "company", ExtractionMethod::Llm, provenance);
                fill(role_type, analysis.role, "role_type", ExtractionMethod::Llm, provenance);
                fill(level, analysis.experience_level, "level", ExtractionMethod::Llm, provenance);
                fill(location, analysis.location, "location", ExtractionMethod::Llm, provenance);
                fill(sentiment, analysis.sentiment, "sentiment", ExtractionMethod::Llm, provenance);
                fill(difficulty, analysis.difficulty_level, "difficulty", ExtractionMethod::Llm, provenance);
                fill(timeline, analysis.timeline, "timeline", ExtractionMethod::Llm, provenance);
                if let Some(raw) = analysis.outcome {
                    fill_outcome(meta, &raw, ExtractionMethod::Llm);
                }
                if meta.interview_topics.is_empty() && !analysis.interview_topics.is_empty() {
                    meta.interview_topics = analysis.interview_topics;
                    meta.provenance
                        .insert("interview_topics".to_string(), ExtractionMethod::Llm);
                }
                0
            }
            Err(e) => {
                warn!("LLM stage skipped: {}", e);
                1
            }
        }
    }
}

fn fill(
    field: &mut Option<String>,
    value: Option<String>,
    name: &str,
    method: ExtractionMethod,
    provenance: &mut std::collections::BTreeMap<String, ExtractionMethod>,
) {
    if field.is_some() {
        return;
    }
    let Some(value) = value else { return };
    let value = value.trim().to_string();
    if value.is_empty() {
        return;
    }
    *field = Some(value);
    provenance.insert(name.to_string(), method);
}

/// Outcomes that normalize to `Unknown` are treated as absent so a
/// later stage still gets a chance at the field.
fn fill_outcome(meta: &mut ExtractedMetadata, raw: &str, method: ExtractionMethod) {
    if meta.outcome.is_some() {
        return;
    }
    let normalized = Outcome::normalize(raw);
    if normalized == Outcome::Unknown {
        return;
    }
    meta.outcome = Some(normalized);
    meta.provenance.insert("outcome".to_string(), method);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmAnalysis, LlmError};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn post(title: &str, body: &str) -> Post {
        Post {
            post_id: "t1".to_string(),
            source: "cscareerquestions".to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: None,
            author: None,
            created_at: Utc::now(),
            scraped_at: Utc::now(),
        }
    }

    fn directory() -> Arc<CompanyDirectory> {
        Arc::new(CompanyDirectory::builtin())
    }

    struct StubNer(Result<NerFields, fn() -> NerError>);

    #[async_trait]
    impl NerBackend for StubNer {
        async fn extract(&self, _text: &str) -> Result<NerFields, NerError> {
            match &self.0 {
                Ok(fields) => Ok(fields.clone()),
                Err(mk) => Err(mk()),
            }
        }
    }

    struct StubLlm {
        analysis: Result<LlmAnalysis, String>,
        calls: AtomicUsize,
    }

    impl StubLlm {
        fn ok(analysis: LlmAnalysis) -> Self {
            Self {
                analysis: Ok(analysis),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                analysis: Err("gibberish".to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for StubLlm {
        async fn analyze(&self, _title: &str, _text: &str) -> Result<LlmAnalysis, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.analysis {
                Ok(a) => Ok(a.clone()),
                Err(msg) => Err(LlmError::Parse(msg.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_ner_fields_win_over_later_stages() {
        let ner = StubNer(Ok(NerFields {
            company: Some("Netflix".to_string()),
            outcome: Some("offer".to_string()),
            ..Default::default()
        }));
        let extractor = CascadeExtractor::new(directory()).with_ner(Box::new(ner));

        // Body mentions Google, but NER already resolved the company.
        let meta = extractor
            .extract(&post("My interview", "I interviewed at Google."))
            .await
            .metadata;

        assert_eq!(meta.company.as_deref(), Some("Netflix"));
        assert_eq!(meta.source_of("company"), Some(ExtractionMethod::Ner));
        assert_eq!(meta.outcome, Some(Outcome::Passed));
        assert_eq!(meta.source_of("outcome"), Some(ExtractionMethod::Ner));
    }

    #[tokio::test]
    async fn test_ner_failure_falls_through_to_pattern() {
        let ner = StubNer(Err(|| NerError::Connection("timed out".to_string())));
        let extractor = CascadeExtractor::new(directory()).with_ner(Box::new(ner));

        let result = extractor
            .extract(&post("Onsite report", "My Stripe onsite went well."))
            .await;

        assert_eq!(result.stage_errors, 1);
        let meta = result.metadata;
        assert_eq!(meta.company.as_deref(), Some("Stripe"));
        assert_eq!(meta.source_of("company"), Some(ExtractionMethod::Pattern));
    }

    #[tokio::test]
    async fn test_pattern_prefers_labeled_company() {
        let extractor = CascadeExtractor::new(directory());
        let meta = extractor
            .extract(&post(
                "Interview experience",
                "I also talked to Google recruiters.\nCompany: Amazon\nRole: SDE2",
            ))
            .await
            .metadata;
        assert_eq!(meta.company.as_deref(), Some("Amazon"));
    }

    #[tokio::test]
    async fn test_pattern_falls_back_to_first_mention() {
        let extractor = CascadeExtractor::new(directory());
        let meta = extractor
            .extract(&post("Loop done", "Microsoft first, then Oracle."))
            .await
            .metadata;
        assert_eq!(meta.company.as_deref(), Some("Microsoft"));
    }

    #[tokio::test]
    async fn test_llm_skipped_when_key_fields_present() {
        let llm = StubLlm::ok(LlmAnalysis::default());
        let ner = StubNer(Ok(NerFields {
            company: Some("Google".to_string()),
            ..Default::default()
        }));
        let extractor = CascadeExtractor::new(directory())
            .with_ner(Box::new(ner))
            .with_llm(Box::new(llm))
            .with_ai(true);

        let mut meta = ExtractedMetadata {
            company: Some("Google".to_string()),
            sentiment: Some("positive".to_string()),
            difficulty: Some("hard".to_string()),
            interview_topics: vec!["graphs".to_string()],
            ..Default::default()
        };
        assert!(!extractor.should_run_llm(&meta));

        meta.sentiment = None;
        assert!(extractor.should_run_llm(&meta));
    }

    #[tokio::test]
    async fn test_llm_fills_gaps_without_overwriting() {
        let llm = StubLlm::ok(LlmAnalysis {
            company: Some("Meta".to_string()),
            sentiment: Some("negative".to_string()),
            difficulty_level: Some("hard".to_string()),
            outcome: Some("rejected".to_string()),
            interview_topics: vec!["dynamic programming".to_string()],
            ..Default::default()
        });
        let extractor = CascadeExtractor::new(directory())
            .with_llm(Box::new(llm))
            .with_ai(true);

        // Pattern stage resolves Google first; the LLM must not replace it.
        let meta = extractor
            .extract(&post("Failed my loop", "Five rounds at Google, brutal."))
            .await
            .metadata;

        assert_eq!(meta.company.as_deref(), Some("Google"));
        assert_eq!(meta.source_of("company"), Some(ExtractionMethod::Pattern));
        assert_eq!(meta.sentiment.as_deref(), Some("negative"));
        assert_eq!(meta.source_of("sentiment"), Some(ExtractionMethod::Llm));
        assert_eq!(meta.outcome, Some(Outcome::Failed));
        assert_eq!(meta.interview_topics, vec!["dynamic programming"]);
        assert_eq!(
            meta.source_of("interview_topics"),
            Some(ExtractionMethod::Llm)
        );
    }

    #[tokio::test]
    async fn test_llm_failure_contributes_nothing() {
        let extractor = CascadeExtractor::new(directory())
            .with_llm(Box::new(StubLlm::failing()))
            .with_ai(true);

        let result = extractor
            .extract(&post("Interview at Apple", "Phone screen then onsite."))
            .await;

        assert_eq!(result.stage_errors, 1);
        let meta = result.metadata;
        assert_eq!(meta.company.as_deref(), Some("Apple"));
        assert!(meta.sentiment.is_none());
        assert!(meta.difficulty.is_none());
    }

    #[tokio::test]
    async fn test_unknown_outcome_left_open_for_later_stage() {
        let ner = StubNer(Ok(NerFields {
            outcome: Some("ghosted".to_string()),
            ..Default::default()
        }));
        let llm = StubLlm::ok(LlmAnalysis {
            outcome: Some("pending".to_string()),
            ..Default::default()
        });
        let extractor = CascadeExtractor::new(directory())
            .with_ner(Box::new(ner))
            .with_llm(Box::new(llm))
            .with_ai(true);

        let meta = extractor
            .extract(&post("Still waiting", "No word yet after the final round."))
            .await
            .metadata;
        assert_eq!(meta.outcome, Some(Outcome::Pending));
        assert_eq!(meta.source_of("outcome"), Some(ExtractionMethod::Llm));
    }
}
