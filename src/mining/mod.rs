//! Interview question mining.
//!
//! Extracts literal interview questions from post text using the ranked
//! pattern library — no model calls, sub-millisecond per post. Raw
//! matches are pooled across patterns, filtered, deduplicated by word-set
//! similarity, classified, and returned ranked by confidence.

mod classify;
mod patterns;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::MinedQuestion;
pub use classify::classify;
pub use patterns::{ExtractionPattern, DENYLIST, EXTRACTION_PATTERNS};

/// Candidates shorter than this are discarded as fragments.
const MIN_QUESTION_LEN: usize = 10;
/// Candidates longer than this are discarded as narrative text.
const MAX_QUESTION_LEN: usize = 300;
/// Word-set Jaccard similarity above which two candidates are merged.
const DEDUP_SIMILARITY: f64 = 0.85;

/// Options for question extraction.
#[derive(Debug, Clone, Copy)]
pub struct MinerOptions {
    /// Patterns below this confidence are ignored (default 0.70).
    pub min_confidence: f64,
    /// Maximum candidates returned (default 20).
    pub max_results: usize,
}

impl Default for MinerOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.70,
            max_results: 20,
        }
    }
}

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code fence regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]+`").expect("inline code regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex"));
static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("ws regex"));
static ELLIPSIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{3,}").expect("ellipsis regex"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("non-alnum regex"));
static ANY_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("any ws regex"));
static INTERROGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(how|what|why|when|where|who|which|can|could|would|should|do|does|did|is|are|was|were)\b",
    )
    .expect("interrogative regex")
});

/// Extract interview questions from post text.
///
/// Returns at most `max_results` candidates sorted by confidence
/// descending, then text length ascending (concise phrasing first).
pub fn extract_questions(text: &str, opts: &MinerOptions) -> Vec<MinedQuestion> {
    if text.len() < 20 {
        return Vec::new();
    }

    let cleaned = preprocess(text);

    // Pool raw matches from every pattern.
    let mut raw: Vec<MinedQuestion> = Vec::new();
    for pattern in EXTRACTION_PATTERNS.iter() {
        if pattern.confidence < opts.min_confidence {
            continue;
        }
        for caps in pattern.regex.captures_iter(&cleaned) {
            let captured = match caps.get(1) {
                Some(m) => m.as_str().trim(),
                None => continue,
            };
            if captured.len() < MIN_QUESTION_LEN {
                continue;
            }
            raw.push(MinedQuestion {
                text: clean_question_text(captured),
                normalized: normalize_for_dedup(captured),
                confidence: pattern.confidence,
                question_type: crate::models::QuestionType::Unknown,
                source_pattern: pattern.name,
                frequency: 1,
            });
        }
    }

    if raw.is_empty() {
        return Vec::new();
    }
    let raw_count = raw.len();

    // Drop meta-questions and out-of-range lengths.
    raw.retain(|q| {
        q.text.len() >= MIN_QUESTION_LEN
            && q.text.len() <= MAX_QUESTION_LEN
            && !DENYLIST.iter().any(|p| p.is_match(&q.text))
    });

    let mut unique = deduplicate(raw);

    for q in &mut unique {
        q.question_type = classify(&q.text);
    }

    unique.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.text.len().cmp(&b.text.len()))
    });
    unique.truncate(opts.max_results);

    debug!(
        raw = raw_count,
        kept = unique.len(),
        "mined question candidates"
    );

    unique
}

/// Strip code blocks, inline code, and URLs; normalize quotes and
/// horizontal whitespace. Newlines are preserved because several
/// patterns are line-anchored.
fn preprocess(text: &str) -> String {
    let text = CODE_FENCE.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = text
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = ELLIPSIS.replace_all(&text, "...");
    text.trim().to_string()
}

/// Tidy a captured candidate: strip wrapping quotes and trailing dots,
/// capitalize, and add a question mark to interrogative openers.
fn clean_question_text(text: &str) -> String {
    let mut cleaned = text
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches('.')
        .trim()
        .to_string();
    cleaned = ANY_WS.replace_all(&cleaned, " ").into_owned();

    let mut chars = cleaned.chars();
    if let Some(first) = chars.next() {
        cleaned = first.to_uppercase().collect::<String>() + chars.as_str();
    }

    if !cleaned.ends_with('?') && !cleaned.ends_with('.') && INTERROGATIVE.is_match(&cleaned) {
        cleaned.push('?');
    }

    cleaned
}

/// Lowercase, strip punctuation, collapse whitespace.
fn normalize_for_dedup(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lower, "");
    ANY_WS.replace_all(&stripped, " ").trim().to_string()
}

/// Jaccard similarity over word sets, ignoring words of ≤2 characters.
fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let words_a: std::collections::HashSet<&str> =
        a.split(' ').filter(|w| w.len() > 2).collect();
    let words_b: std::collections::HashSet<&str> =
        b.split(' ').filter(|w| w.len() > 2).collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// Merge near-duplicate candidates.
///
/// The survivor is the higher-confidence variant (shorter text on equal
/// confidence) and its frequency counts every merged duplicate. This
/// keeps the same question found by two patterns from appearing twice.
fn deduplicate(candidates: Vec<MinedQuestion>) -> Vec<MinedQuestion> {
    let mut unique: Vec<MinedQuestion> = Vec::new();

    for candidate in candidates {
        let similar = unique
            .iter()
            .position(|e| jaccard_similarity(&e.normalized, &candidate.normalized) > DEDUP_SIMILARITY);

        match similar {
            None => unique.push(candidate),
            Some(i) => {
                let existing = &unique[i];
                let replace = candidate.confidence > existing.confidence
                    || (candidate.confidence == existing.confidence
                        && candidate.text.len() < existing.text.len());
                let frequency = existing.frequency + 1;
                if replace {
                    unique[i] = MinedQuestion {
                        frequency,
                        ..candidate
                    };
                } else {
                    unique[i].frequency = frequency;
                }
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    #[test]
    fn test_numbered_list_example() {
        let text = "My onsite had two rounds:\n1. Implement LRU cache\n2. Reverse a linked list";
        let questions = extract_questions(text, &MinerOptions::default());

        let numbered: Vec<_> = questions
            .iter()
            .filter(|q| q.source_pattern == "numbered_list")
            .collect();
        assert_eq!(numbered.len(), 2);
        for q in &numbered {
            assert_eq!(q.confidence, 0.95);
            assert_eq!(q.question_type, QuestionType::Coding);
        }
    }

    #[test]
    fn test_no_near_duplicates_in_output() {
        // Same question reachable via explicit marker and imperative.
        let text = "They asked: implement a trie with wildcard search. \
                    I had to implement a trie with wildcard search.";
        let questions = extract_questions(text, &MinerOptions::default());
        for (i, a) in questions.iter().enumerate() {
            for b in questions.iter().skip(i + 1) {
                assert!(
                    jaccard_similarity(&a.normalized, &b.normalized) <= DEDUP_SIMILARITY,
                    "near-duplicates survived: {:?} / {:?}",
                    a.text,
                    b.text
                );
            }
        }
    }

    #[test]
    fn test_dedup_keeps_higher_confidence_and_counts_frequency() {
        let mk = |text: &str, conf: f64, name: &'static str| MinedQuestion {
            text: text.to_string(),
            normalized: normalize_for_dedup(text),
            confidence: conf,
            question_type: QuestionType::Unknown,
            source_pattern: name,
            frequency: 1,
        };
        let out = deduplicate(vec![
            mk("Design a URL shortener for millions of users", 0.75, "imperative"),
            mk("Design a URL shortener for millions of users", 0.95, "numbered_list"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.95);
        assert_eq!(out[0].source_pattern, "numbered_list");
        assert_eq!(out[0].frequency, 2);
    }

    #[test]
    fn test_denylisted_meta_questions_dropped() {
        // Other patterns may still pull fragments out of the sentence,
        // but no surviving candidate may carry meta-question phrasing.
        let text = "1. Does anyone know what the Google onsite is like these days";
        let questions = extract_questions(text, &MinerOptions::default());
        assert!(!questions
            .iter()
            .any(|q| q.text.to_lowercase().contains("anyone know")));
        for q in &questions {
            assert!(
                !DENYLIST.iter().any(|p| p.is_match(&q.text)),
                "denylisted candidate survived: {:?}",
                q.text
            );
        }
    }

    #[test]
    fn test_code_and_urls_stripped() {
        let text = "Check https://example.com/guide first.\n\
                    ```\n1. Not a question, just code\n```\n\
                    1. Implement a min stack with O(1) operations";
        let questions = extract_questions(text, &MinerOptions::default());
        assert!(questions.iter().any(|q| q.text.contains("min stack")));
        assert!(!questions.iter().any(|q| q.text.contains("just code")));
        assert!(!questions.iter().any(|q| q.text.contains("example.com")));
    }

    #[test]
    fn test_interrogative_gets_question_mark() {
        assert_eq!(
            clean_question_text("how would you shard a database"),
            "How would you shard a database?"
        );
        assert_eq!(
            clean_question_text("implement merge sort"),
            "Implement merge sort"
        );
    }

    #[test]
    fn test_sorted_by_confidence_then_length() {
        let text = "Round 1: design a chat application for mobile clients\n\
                    1. Implement LRU cache";
        let questions = extract_questions(text, &MinerOptions::default());
        assert!(questions.len() >= 2);
        for w in questions.windows(2) {
            assert!(
                w[0].confidence > w[1].confidence
                    || (w[0].confidence == w[1].confidence
                        && w[0].text.len() <= w[1].text.len())
            );
        }
    }

    #[test]
    fn test_max_results_truncation() {
        let mut text = String::new();
        for i in 1..=30 {
            text.push_str(&format!("{}. Implement data structure variant number {}\n", i, i));
        }
        let opts = MinerOptions {
            max_results: 5,
            ..Default::default()
        };
        let questions = extract_questions(&text, &opts);
        assert!(questions.len() <= 5);
    }

    #[test]
    fn test_short_text_yields_nothing() {
        assert!(extract_questions("too short", &MinerOptions::default()).is_empty());
    }
}
