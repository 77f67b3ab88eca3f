use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const DROP_PHRASES: [&str; 12] = [
    "drop",
    "pass",
    "skip",
    "overpriced",
    "not worth",
    "too expensive",
    "bad deal",
    "overpaying",
    "walk away",
    "hard pass",
    "avoid",
    "stay away",
];

const COP_PHRASES: [&str; 12] = [
    "good buy",
    "good deal",
    "cop",
    "great price",
    "worth it",
    "solid pickup",
    "steal",
    "underpriced",
    "great find",
    "definitely buy",
    "good value",
    "fair price",
];

static DROP_MATCHER: LazyLock<Regex> = LazyLock::new(|| phrase_matcher(&DROP_PHRASES));
static COP_MATCHER: LazyLock<Regex> = LazyLock::new(|| phrase_matcher(&COP_PHRASES));

// Whole words plus common inflections: "passed" and "skipping" count,
// "scope" and "copper" do not.
fn phrase_matcher(phrases: &[&str]) -> Regex {
    let alternatives: Vec<String> = phrases.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(
        r"(?i)\b(?:{})(?:s|es|d|ed|ing|ped|ping)?\b",
        alternatives.join("|")
    ))
        .expect("phrase list is a valid regex")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "COP")]
    Cop,
    #[serde(rename = "DROP")]
    Drop,
    #[serde(rename = "REVIEW")]
    Review,
}

impl Verdict {
    /// Negative phrases win over positive ones when both appear.
    pub fn from_reply(text: &str) -> Self {
        match (DROP_MATCHER.is_match(text), COP_MATCHER.is_match(text)) {
            (true, _) => Verdict::Drop,
            (false, true) => Verdict::Cop,
            (false, false) => Verdict::Review,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Cop => "COP",
            Verdict::Drop => "DROP",
            Verdict::Review => "REVIEW",
        }
    }
}
