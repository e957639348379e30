//! Company alias directory.
//!
//! Maps company name variations to canonical names so that "Meta and
//! Facebook" resolves to one company. The directory is an immutable
//! lookup table injected into both the relevance scorer and the pattern
//! extraction stage; the reverse index and the scan regex are built once
//! at construction.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// Canonical company name → known variations (lowercase).
///
/// The built-in table is tuned for tech interview posts: FAANG, large
/// tech, finance IT, trading firms, and well-known startups.
const BUILTIN_TABLE: &[(&str, &[&str])] = &[
    ("Google", &["google", "alphabet", "goog", "youtube", "waymo", "deepmind"]),
    ("Meta", &["meta", "facebook", "fb", "instagram", "whatsapp", "oculus"]),
    ("Amazon", &["amazon", "amzn", "aws", "amazon web services", "twitch", "audible"]),
    ("Apple", &["apple", "aapl", "cupertino"]),
    ("Microsoft", &["microsoft", "msft", "azure", "github"]),
    ("Netflix", &["netflix", "nflx"]),
    ("Tesla", &["tesla", "tsla"]),
    ("Nvidia", &["nvidia", "nvda"]),
    ("Intel", &["intel", "intc"]),
    ("AMD", &["amd", "advanced micro devices"]),
    ("IBM", &["ibm", "international business machines"]),
    ("Oracle", &["oracle", "orcl"]),
    ("Salesforce", &["salesforce"]),
    ("Uber", &["uber"]),
    ("Lyft", &["lyft"]),
    ("Airbnb", &["airbnb"]),
    ("Stripe", &["stripe"]),
    ("Snowflake", &["snowflake"]),
    ("Databricks", &["databricks"]),
    ("Palantir", &["palantir", "pltr"]),
    ("Coinbase", &["coinbase"]),
    ("DoorDash", &["doordash", "door dash"]),
    ("Instacart", &["instacart"]),
    ("Reddit", &["reddit"]),
    ("Discord", &["discord"]),
    ("Roblox", &["roblox"]),
    ("Pinterest", &["pinterest"]),
    ("Snap", &["snap", "snapchat"]),
    ("Twitter", &["twitter", "x corp", "x.com"]),
    ("LinkedIn", &["linkedin"]),
    ("TikTok", &["tiktok", "tik tok"]),
    ("ByteDance", &["bytedance", "byte dance"]),
    ("JPMorgan Chase", &["jpmorgan", "jp morgan", "jpm", "chase", "jpmorgan chase"]),
    ("Goldman Sachs", &["goldman sachs", "goldman"]),
    ("Morgan Stanley", &["morgan stanley"]),
    ("Bank of America", &["bank of america", "bofa"]),
    ("Citigroup", &["citigroup", "citi", "citibank"]),
    ("Wells Fargo", &["wells fargo"]),
    ("Barclays", &["barclays"]),
    ("UBS", &["ubs"]),
    ("Deutsche Bank", &["deutsche bank"]),
    ("HSBC", &["hsbc"]),
    ("Visa", &["visa"]),
    ("Mastercard", &["mastercard"]),
    ("PayPal", &["paypal"]),
    ("Block", &["block", "square", "cash app"]),
    ("Robinhood", &["robinhood"]),
    ("Capital One", &["capital one"]),
    ("American Express", &["american express", "amex"]),
    ("Fidelity", &["fidelity"]),
    ("Charles Schwab", &["charles schwab", "schwab"]),
    ("Vanguard", &["vanguard"]),
    ("BlackRock", &["blackrock"]),
    ("Two Sigma", &["two sigma"]),
    ("Jane Street", &["jane street"]),
    ("Citadel", &["citadel"]),
    ("D. E. Shaw", &["de shaw", "d.e. shaw", "d e shaw"]),
    ("Hudson River Trading", &["hudson river trading", "hrt"]),
    ("Jump Trading", &["jump trading"]),
    ("Optiver", &["optiver"]),
    ("Akuna Capital", &["akuna capital", "akuna"]),
    ("Cisco", &["cisco", "csco"]),
    ("VMware", &["vmware"]),
    ("Atlassian", &["atlassian"]),
    ("Datadog", &["datadog", "ddog"]),
    ("Twilio", &["twilio"]),
    ("MongoDB", &["mongodb"]),
    ("Elastic", &["elastic", "elasticsearch"]),
    ("HashiCorp", &["hashicorp"]),
    ("GitLab", &["gitlab"]),
    ("Docker", &["docker"]),
    ("Shopify", &["shopify"]),
    ("Dropbox", &["dropbox"]),
    ("Zoom", &["zoom"]),
    ("Slack", &["slack"]),
    ("Cloudflare", &["cloudflare"]),
    ("Splunk", &["splunk"]),
    ("ServiceNow", &["servicenow"]),
    ("Workday", &["workday"]),
    ("Okta", &["okta"]),
    ("Etsy", &["etsy"]),
    ("Wayfair", &["wayfair"]),
    ("Riot Games", &["riot games", "riot"]),
    ("Epic Games", &["epic games"]),
    ("Blizzard", &["blizzard", "activision blizzard", "activision"]),
    ("Valve", &["valve", "steam"]),
    ("SpaceX", &["spacex", "space x"]),
    ("OpenAI", &["openai", "open ai", "chatgpt"]),
    ("Anthropic", &["anthropic", "claude"]),
    ("Figma", &["figma"]),
    ("Notion", &["notion"]),
    ("Canva", &["canva"]),
];

/// Immutable company alias lookup with a precomputed reverse index.
#[derive(Debug)]
pub struct CompanyDirectory {
    /// Canonical name → variations, in table order.
    table: Vec<(String, Vec<String>)>,
    /// Lowercase variation → canonical name.
    reverse: HashMap<String, String>,
    /// Single alternation over all variations, word-bounded.
    scan: Regex,
}

impl CompanyDirectory {
    /// Build the directory from the built-in company table.
    pub fn builtin() -> Self {
        Self::from_table(
            BUILTIN_TABLE
                .iter()
                .map(|(c, vs)| (c.to_string(), vs.iter().map(|v| v.to_string()).collect())),
        )
    }

    /// Build a directory from `(canonical, variations)` pairs.
    pub fn from_table(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let table: Vec<(String, Vec<String>)> = entries.into_iter().collect();

        let mut reverse = HashMap::new();
        let mut variants: Vec<String> = Vec::new();
        for (canonical, aliases) in &table {
            for alias in aliases {
                let key = alias.to_lowercase();
                reverse.entry(key.clone()).or_insert_with(|| canonical.clone());
                variants.push(key);
            }
        }

        // Longest alias first so "jpmorgan chase" wins over "jpmorgan"
        // at the same position.
        variants.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = variants
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        let scan = RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
            .case_insensitive(true)
            .build()
            .expect("company alternation regex");

        Self { table, reverse, scan }
    }

    /// Resolve a variation to its canonical name.
    pub fn canonical(&self, variation: &str) -> Option<&str> {
        self.reverse
            .get(&variation.to_lowercase())
            .map(|s| s.as_str())
    }

    /// All known variations for a canonical name.
    pub fn variations(&self, canonical: &str) -> Option<&[String]> {
        self.table
            .iter()
            .find(|(c, _)| c == canonical)
            .map(|(_, vs)| vs.as_slice())
    }

    /// Find companies mentioned in text.
    ///
    /// Returns canonical names deduplicated and ordered by first
    /// occurrence, so "Meta and Facebook" yields `["Meta"]` and the
    /// first element is the earliest mention.
    pub fn find_in_text(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.scan.find_iter(text) {
            if let Some(canonical) = self.canonical(m.as_str()) {
                if !found.iter().any(|c| c == canonical) {
                    found.push(canonical.to_string());
                }
            }
        }
        found
    }

    /// True if any known company appears in the text.
    pub fn mentions_company(&self, text: &str) -> bool {
        self.scan
            .find_iter(text)
            .any(|m| self.reverse.contains_key(&m.as_str().to_lowercase()))
    }

    /// Number of canonical companies in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolves_to_canonical() {
        let dir = CompanyDirectory::builtin();
        assert_eq!(dir.canonical("alphabet"), Some("Google"));
        assert_eq!(dir.canonical("FB"), Some("Meta"));
        assert_eq!(dir.canonical("plumbing"), None);
    }

    #[test]
    fn test_find_deduplicates_variants() {
        let dir = CompanyDirectory::builtin();
        let found = dir.find_in_text("Meta and Facebook interview loop");
        assert_eq!(found, vec!["Meta".to_string()]);
    }

    #[test]
    fn test_find_orders_by_first_occurrence() {
        let dir = CompanyDirectory::builtin();
        let found = dir.find_in_text("AWS vs Azure comparison");
        assert_eq!(found, vec!["Amazon".to_string(), "Microsoft".to_string()]);
    }

    #[test]
    fn test_word_boundaries_avoid_false_positives() {
        let dir = CompanyDirectory::builtin();
        // "chase" must not match inside "purchase"
        assert!(dir.find_in_text("I made a purchase yesterday").is_empty());
        assert_eq!(
            dir.find_in_text("Onsite at Chase next week"),
            vec!["JPMorgan Chase".to_string()]
        );
    }

    #[test]
    fn test_mentions_company() {
        let dir = CompanyDirectory::builtin();
        assert!(dir.mentions_company("phone screen at stripe next week"));
        assert!(!dir.mentions_company("no employer named here"));
    }

    #[test]
    fn test_longest_alias_wins() {
        let dir = CompanyDirectory::builtin();
        let found = dir.find_in_text("Interviewing at Amazon Web Services");
        assert_eq!(found, vec!["Amazon".to_string()]);
    }
}
