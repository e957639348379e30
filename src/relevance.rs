//! Relevance scoring for interview experience posts.
//!
//! A pure, deterministic scorer that separates genuine first-person
//! job interview accounts from journalism interviews, study-advice
//! threads, and practice-progress posts. Runs before any paid service
//! is invoked, so it must stay free of network calls and hidden state.
//!
//! The signal weights and thresholds are empirically tuned constants;
//! treat them as configuration, not business logic.

use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};

use crate::companies::CompanyDirectory;
use crate::models::RelevanceVerdict;

/// Default accept threshold applied when a source has no override.
pub const DEFAULT_THRESHOLD: u8 = 40;

/// Hard rejects: journalism/news interviews, UX research, election
/// coverage, PM interview guides. Matching any of these zeroes the
/// score outright, regardless of positive signals.
static AUTO_REJECT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(read|watch|saw|found) (an?|the) interview (with|of)",
        r"\b(ceo|cto|founder|president|senator|congressman)'s interview",
        r"election|candidate|senator|congress",
        r"user interview|customer interview",
        r"product interview guide",
    ])
});

/// First-person interview experience phrasing (+30).
static FIRST_PERSON: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(i|my|just) (got|received|failed|passed|bombed|aced)",
        r"\bi (interviewed|applied|accepted|rejected|turned down)",
        r"my (interview|offer|rejection|experience) (at|with|from)",
        r"just finished my",
    ])
});

/// Explicit outcome language (+25).
const OUTCOME_KEYWORDS: &[&str] = &[
    "offer letter",
    "got an offer",
    "rejected",
    "hired",
    "turned down",
    "accepted the offer",
    "failed the",
    "passed all",
];

/// Named interview stages (+20).
const STAGE_KEYWORDS: &[&str] = &[
    "onsite",
    "phone screen",
    "technical round",
    "coding interview",
    "system design",
    "behavioral",
    "leetcode",
    "hackerrank",
    "take home",
];

/// Non-experience phrasing; each match deducts 20 points and they stack.
static NEGATIVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"how (do i|to|can i) (prepare|study|learn)",
        r"what (is|are) (the best|good) (resources|books|courses)",
        r"should i (accept|take|choose)",
        r"\bsalary\b.*\bnegotiation\b",
        r"\bresume\b|\bcv\b.*\breview\b",
        r"career (switch|change|transition)",
        r"leetcode.*progress|progress.*leetcode",
        r"\d+\s*(problems?|questions?)\s*(solved|completed)",
        r"advice|tips|suggestions",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .expect("relevance pattern")
        })
        .collect()
}

/// Scores posts for interview relevance against a company directory.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    directory: Arc<CompanyDirectory>,
}

impl RelevanceScorer {
    pub fn new(directory: Arc<CompanyDirectory>) -> Self {
        Self { directory }
    }

    /// Compute the 0–100 relevance score for a post.
    pub fn score(&self, title: &str, body: &str) -> u8 {
        let text = format!("{} {}", title, body).to_lowercase();

        // Auto-reject patterns short-circuit; this is not a deduction.
        if AUTO_REJECT.iter().any(|p| p.is_match(&text)) {
            return 0;
        }

        let mut score: i32 = 0;

        if FIRST_PERSON.iter().any(|p| p.is_match(&text)) {
            score += 30;
        }
        if OUTCOME_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            score += 25;
        }
        if STAGE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            score += 20;
        }
        // One signal no matter how many companies are named, so "Meta
        // and Facebook" still counts once.
        if self.directory.mentions_company(&text) {
            score += 15;
        }
        if title.to_lowercase().starts_with("ask hn:") {
            score += 10;
        }

        for pattern in NEGATIVE.iter() {
            if pattern.is_match(&text) {
                score -= 20;
            }
        }

        score.clamp(0, 100) as u8
    }

    /// Score a post and apply an accept threshold.
    pub fn verdict(&self, title: &str, body: &str, threshold: u8) -> RelevanceVerdict {
        let score = self.score(title, body);
        RelevanceVerdict {
            score,
            is_relevant: score >= threshold,
            threshold_used: threshold,
        }
    }
}

/// Summary of a scored batch, for run reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceStats {
    pub total: usize,
    pub relevant: usize,
}

impl RelevanceStats {
    pub fn record(&mut self, verdict: &RelevanceVerdict) {
        self.total += 1;
        if verdict.is_relevant {
            self.relevant += 1;
        }
    }

    /// Fraction of the batch kept, as a whole percentage.
    pub fn precision_pct(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.relevant as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(Arc::new(CompanyDirectory::builtin()))
    }

    #[test]
    fn test_first_person_experience_scores_high() {
        let s = scorer();
        let score = s.score(
            "Google onsite experience",
            "I passed my Google onsite last week after a 3-month grind, \
             felt good about the system design round.",
        );
        // first person + outcome-ish + stage + company
        assert!(score >= 40, "score was {}", score);
    }

    #[test]
    fn test_study_advice_scores_low() {
        let s = scorer();
        let score = s.score(
            "How do I prepare for FAANG interviews?",
            "Any book recommendations?",
        );
        assert!(score < 40, "score was {}", score);
    }

    #[test]
    fn test_auto_reject_overrides_positive_signals() {
        let s = scorer();
        // Strong positive signals, but journalism phrasing zeroes it.
        let score = s.score(
            "I read an interview with the CEO of Google",
            "I passed my onsite, got an offer letter, leetcode onsite phone screen.",
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn test_score_is_clamped() {
        let s = scorer();
        let score = s.score(
            "advice tips suggestions",
            "how do i prepare? what are the best resources? should i accept? \
             career switch resume review 150 problems solved",
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn test_ask_hn_prefix_bonus() {
        let s = scorer();
        let base = s.score("My onsite story", "");
        let with_prefix = s.score("Ask HN: My onsite story", "");
        assert_eq!(with_prefix, base + 10);
    }

    #[test]
    fn test_determinism() {
        let s = scorer();
        let a = s.score("Ask HN: I interviewed at Stripe", "phone screen then onsite");
        let b = s.score("Ask HN: I interviewed at Stripe", "phone screen then onsite");
        assert_eq!(a, b);
    }

    #[test]
    fn test_verdict_threshold() {
        let s = scorer();
        let v = s.verdict("I passed my Google onsite", "got an offer letter", 50);
        assert!(v.score >= 50);
        assert!(v.is_relevant);
        assert_eq!(v.threshold_used, 50);
    }

    #[test]
    fn test_stats_precision() {
        let mut stats = RelevanceStats::default();
        stats.record(&RelevanceVerdict {
            score: 60,
            is_relevant: true,
            threshold_used: 40,
        });
        stats.record(&RelevanceVerdict {
            score: 10,
            is_relevant: false,
            threshold_used: 40,
        });
        assert_eq!(stats.total, 2);
        assert_eq!(stats.precision_pct(), 50);
    }
}
