//! Lexical Feature Extraction
//!
//! Tokenization, the manipulation-keyword sets and bigram extraction the
//! text heuristics and pattern discovery are built on. Matching is
//! lowercase substring on phrases so multi-word cues ("verify now") work.

/// The ten urgency cues. Matched count is normalized by 3 (not 10) in the
/// urgency score - two or three cues already read as hard pressure.
pub const URGENCY_KEYWORDS: [&str; 10] = [
    "urgent",
    "immediately",
    "act now",
    "expires",
    "suspended",
    "verify now",
    "final notice",
    "last chance",
    "right away",
    "within 24 hours",
];

/// Fear / intimidation cues
pub const FEAR_KEYWORDS: [&str; 8] = [
    "suspended",
    "locked",
    "unauthorized",
    "legal action",
    "police",
    "arrest",
    "compromised",
    "permanently closed",
];

/// Authority-impersonation cues
pub const AUTHORITY_KEYWORDS: [&str; 7] = [
    "bank",
    "irs",
    "government",
    "official",
    "security team",
    "customer service",
    "support team",
];

/// Reward-bait cues
pub const REWARD_KEYWORDS: [&str; 7] = [
    "winner",
    "congratulations",
    "prize",
    "free gift",
    "claim your",
    "you've been selected",
    "cash reward",
];

/// Scarcity cues
pub const SCARCITY_KEYWORDS: [&str; 5] = [
    "limited time",
    "only today",
    "while supplies last",
    "exclusive offer",
    "few remaining",
];

/// Filler bigrams skipped by pattern discovery - too common to carry signal
pub const FILLER_PHRASES: [&str; 10] = [
    "of the",
    "in the",
    "to the",
    "on the",
    "for the",
    "and the",
    "is a",
    "with a",
    "this is",
    "that is",
];

/// Lowercase word tokens, alphanumeric runs only
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Phrases from `keywords` present in `text` (case-insensitive substring)
pub fn matched_keywords<'a>(text: &str, keywords: &[&'a str]) -> Vec<&'a str> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| lower.contains(&k.to_lowercase()))
        .copied()
        .collect()
}

/// Adjacent-word bigrams, with filler phrases skipped
pub fn bigrams(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    tokens
        .windows(2)
        .map(|w| format!("{} {}", w[0], w[1]))
        .filter(|b| !FILLER_PHRASES.contains(&b.as_str()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
