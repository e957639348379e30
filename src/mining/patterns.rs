//! Question extraction pattern library.
//!
//! An ordered table of independent regex patterns, each with a fixed
//! confidence weight reflecting how unambiguously it signals a real
//! interview question versus narrative text. Every pattern may fire
//! multiple times per post; all raw matches are pooled by the miner.

use std::sync::LazyLock;

use regex::Regex;

/// One entry in the extraction pattern library.
#[derive(Debug)]
pub struct ExtractionPattern {
    pub name: &'static str,
    pub regex: Regex,
    /// 0.75..=0.95; higher means fewer false positives.
    pub confidence: f64,
}

macro_rules! pattern {
    ($name:literal, $re:literal, $conf:literal) => {
        ExtractionPattern {
            name: $name,
            regex: Regex::new($re).expect(concat!("pattern ", $name)),
            confidence: $conf,
        }
    };
}

/// The pattern library, highest-confidence entries first.
pub static EXTRACTION_PATTERNS: LazyLock<Vec<ExtractionPattern>> = LazyLock::new(|| {
    vec![
        // "1. Implement LRU cache" / "2) Design a rate limiter"
        pattern!("numbered_list", r"(?m)^\s*\d+[.)]\s+(.{10,300})$", 0.95),
        // "LC 315 - Count Smaller Numbers" / "LeetCode #212: Word Search II"
        pattern!(
            "leetcode_ref",
            r"(?i)(?:LC|LeetCode)\s*#?\d+\s*[-:]?\s*(.{5,300}?)(?:\n|$|\.)",
            0.95
        ),
        // "Q1: Implement LRU cache" / "Question 2: Design rate limiter"
        pattern!(
            "question_number",
            r"(?im)(?:Q|Question)\s*\d+[\s:]+(.{10,300})(?:\n|$)",
            0.92
        ),
        // "They asked: how would you design..." / "was asked to implement..."
        pattern!(
            "explicit_marker",
            r#"(?i)(?:they asked|he asked|she asked|interviewer asked|was asked|got asked|question was|asked me to)[\s:,]+["']?([^"'\n]{10,300})"#,
            0.90
        ),
        // "Coding question: reverse a binary tree"
        pattern!(
            "technical_section",
            r"(?i)(?:coding|technical|behavioral|system design)\s+(?:question|round|interview|test)[\s:]+(.{10,300})(?:\n|$)",
            0.90
        ),
        // "- Design a URL shortener" / "* Implement merge sort"
        pattern!("bullet_list", r"(?m)^\s*[-*•]\s+(.{10,300})$", 0.88),
        // "They asked about system design patterns"
        pattern!("asked_about", r"(?i)asked about\s+(.{10,300})(?:\n|$|\.)", 0.88),
        // "Round 1: System design question" / "Phone screen: reverse a list"
        pattern!(
            "round_marker",
            r"(?i)(?:round\s*\d+|phone screen|onsite|technical round|behavioral round|final round)[\s:]+(.{10,300})",
            0.87
        ),
        // "Given a problem to design Twitter"
        pattern!(
            "given_problem",
            r"(?i)(?:given|provided)\s+(?:a|an)?\s*(?:problem|task|challenge)?\s+to\s+(.{10,300})(?:\n|$)",
            0.85
        ),
        // "I had to implement merge sort"
        pattern!(
            "had_to",
            r"(?i)(?:I\s+)?had to\s+(?:implement|design|write|solve|explain|create|build)\s+(.{10,300})(?:\n|$)",
            0.83
        ),
        // "Can you reverse a linked list?" (quoted, capitalized)
        pattern!("quoted_question", r#""([A-Z][^"]{10,300}\??)""#, 0.82),
        // "The problem was: find the longest substring"
        pattern!(
            "problem_statement",
            r"(?i)(?:the\s+)?problem\s+(?:was|statement)[\s:]+(.{10,300})(?:\n|$)",
            0.80
        ),
        // "Interviewer gave me a graph problem"
        pattern!(
            "interviewer_gave",
            r"(?i)(?:interviewer|they|he|she)\s+(?:gave|presented|showed)\s+(?:me\s+)?(?:a|an)?\s*(.{10,300})(?:\n|$)",
            0.80
        ),
        // "Solve this: find missing number in array"
        pattern!(
            "solve_this",
            r"(?i)solve\s+(?:this|the|following)[\s:]+(.{10,300})(?:\n|$)",
            0.78
        ),
        // "Implement a function to..." / "Design a system that..."
        pattern!(
            "imperative",
            r"(?i)(?:implement|design|write|create|build|explain|describe|tell me about|walk me through)\s+(?:a|an|your|how|why)?\s*([^.?!]{10,200})[.?]",
            0.75
        ),
        // "The challenge was to implement autocomplete"
        pattern!(
            "challenge_was",
            r"(?i)(?:the\s+)?(?:challenge|task)\s+was[\s:]+(?:to\s+)?(.{10,300})(?:\n|$)",
            0.75
        ),
    ]
});

/// Meta-question phrasing: the poster is asking the community, not
/// reporting a question they were asked.
pub static DENYLIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)anyone know",
        r"(?i)does anyone",
        r"(?i)should i",
        r"(?i)can someone",
        r"(?i)i have a question about",
        r"(?i)is it worth",
        r"(?i)how long did",
        r"(?i)when should i",
        r"(?i)where can i",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("denylist pattern"))
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn by_name(name: &str) -> &'static ExtractionPattern {
        EXTRACTION_PATTERNS
            .iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn test_patterns_are_ordered_by_confidence() {
        let confs: Vec<f64> = EXTRACTION_PATTERNS.iter().map(|p| p.confidence).collect();
        for w in confs.windows(2) {
            assert!(w[0] >= w[1]);
        }
        assert!(confs.iter().all(|&c| (0.75..=0.95).contains(&c)));
    }

    #[test]
    fn test_numbered_list_captures_items() {
        let p = by_name("numbered_list");
        let text = "1. Implement LRU cache\n2. Reverse a linked list";
        let items: Vec<&str> = p
            .regex
            .captures_iter(text)
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(items, vec!["Implement LRU cache", "Reverse a linked list"]);
    }

    #[test]
    fn test_explicit_marker_captures() {
        let p = by_name("explicit_marker");
        let caps = p
            .regex
            .captures("They asked: how would you design a parking lot")
            .unwrap();
        assert!(caps.get(1).unwrap().as_str().starts_with("how would you design"));
    }

    #[test]
    fn test_leetcode_ref_captures_title() {
        let p = by_name("leetcode_ref");
        let caps = p.regex.captures("LC 212 - Word Search II").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "Word Search II");
    }

    #[test]
    fn test_denylist_matches_meta_questions() {
        assert!(DENYLIST.iter().any(|p| p.is_match("Does anyone know the format?")));
        assert!(DENYLIST.iter().any(|p| p.is_match("should I accept the offer")));
        assert!(!DENYLIST.iter().any(|p| p.is_match("Implement an LRU cache")));
    }
}
