//! Question type classification via weighted keyword scoring.

use crate::models::QuestionType;

/// Primary keywords score 2.0, secondary keywords 0.5.
struct CategoryKeywords {
    category: QuestionType,
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
}

/// Categories in alphabetical order of their wire names, which doubles
/// as the deterministic tie-break order.
const CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords {
        category: QuestionType::Behavioral,
        primary: &[
            "tell me about",
            "describe a time",
            "how do you handle",
            "experience with",
            "situation where",
        ],
        secondary: &[
            "conflict",
            "team",
            "deadline",
            "leadership",
            "failure",
            "success",
            "disagree",
            "improve",
            "challenge",
        ],
    },
    CategoryKeywords {
        category: QuestionType::Coding,
        primary: &[
            "implement",
            "algorithm",
            "function",
            "array",
            "tree",
            "graph",
            "linked list",
            "sort",
            "search",
            "complexity",
            "runtime",
            "reverse",
            "merge",
        ],
        secondary: &["leetcode", "hackerrank", "o(n)", "recursion", "iteration", "loop"],
    },
    CategoryKeywords {
        category: QuestionType::SystemDesign,
        primary: &[
            "design",
            "architecture",
            "scale",
            "distributed",
            "microservices",
            "system",
            "database",
            "api",
            "service",
        ],
        secondary: &[
            "load balancer",
            "cache",
            "redis",
            "messaging",
            "kafka",
            "rate limiter",
            "url shortener",
            "news feed",
            "instagram",
            "twitter",
        ],
    },
    CategoryKeywords {
        category: QuestionType::Technical,
        primary: &["explain", "difference between", "what is", "how does", "define"],
        secondary: &[
            "rest",
            "graphql",
            "sql",
            "nosql",
            "oop",
            "solid",
            "design pattern",
            "testing",
            "ci/cd",
            "docker",
            "kubernetes",
        ],
    },
];

/// Classify a question by weighted keyword score.
///
/// Ties break toward the alphabetically-first category for determinism;
/// a question with zero signal in every category defaults to technical.
pub fn classify(question: &str) -> QuestionType {
    let lower = question.to_lowercase();

    let mut best = QuestionType::Technical;
    let mut best_score = 0.0_f64;

    for cat in CATEGORIES {
        let mut score = 0.0;
        for kw in cat.primary {
            if lower.contains(kw) {
                score += 2.0;
            }
        }
        for kw in cat.secondary {
            if lower.contains(kw) {
                score += 0.5;
            }
        }
        // Strictly-greater keeps the first (alphabetical) max on ties.
        if score > best_score {
            best_score = score;
            best = cat.category;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coding_question() {
        assert_eq!(classify("Implement LRU cache"), QuestionType::Coding);
        assert_eq!(classify("Reverse a linked list"), QuestionType::Coding);
    }

    #[test]
    fn test_system_design_question() {
        assert_eq!(
            classify("Design a distributed rate limiter at scale"),
            QuestionType::SystemDesign
        );
    }

    #[test]
    fn test_behavioral_question() {
        assert_eq!(
            classify("Tell me about a conflict with your team"),
            QuestionType::Behavioral
        );
    }

    #[test]
    fn test_technical_question() {
        assert_eq!(
            classify("Explain the difference between REST and GraphQL"),
            QuestionType::Technical
        );
    }

    #[test]
    fn test_zero_signal_defaults_to_technical() {
        assert_eq!(classify("something entirely unrelated"), QuestionType::Technical);
    }
}
