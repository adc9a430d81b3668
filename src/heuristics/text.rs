//! Text Scam Heuristics
//!
//! Urgency-keyword density, manipulation-technique detection and a
//! suspicious-link check. The matched technique ids double as pattern ids
//! for the adaptive learning engine.

use crate::config::TextConfig;
use crate::features::text::{
    matched_keywords, AUTHORITY_KEYWORDS, FEAR_KEYWORDS, REWARD_KEYWORDS, SCARCITY_KEYWORDS,
    URGENCY_KEYWORDS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()]+").expect("static url regex")
});

/// A detected social-engineering technique
#[derive(Debug, Clone, Serialize)]
pub struct ManipulationTechnique {
    /// Stable pattern id fed to the learning engine
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Keywords that triggered it
    pub triggers: Vec<String>,
}

/// Full text scan output
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextScanResult {
    /// Composite anomaly score in [0,1]
    pub score: f32,
    /// Urgency sub-score in [0,1]
    pub urgency_score: f32,
    pub techniques: Vec<ManipulationTechnique>,
    pub findings: Vec<String>,
    /// Suspicious URLs found in the text
    pub suspicious_links: Vec<String>,
}

impl TextScanResult {
    /// Pattern ids for the learning engine
    pub fn matched_pattern_ids(&self) -> Vec<String> {
        self.techniques.iter().map(|t| t.id.to_string()).collect()
    }
}

/// Scan text for scam indicators. Empty text yields the default result.
pub fn analyze(text: &str, config: &TextConfig) -> TextScanResult {
    let mut result = TextScanResult::default();
    if text.trim().is_empty() {
        return result;
    }

    // Urgency density: matched keywords over the normalizer (3), capped.
    // Two or three distinct pressure cues already read as a hard push.
    let urgency = matched_keywords(text, &URGENCY_KEYWORDS);
    result.urgency_score =
        (urgency.len() as f32 / config.urgency_normalizer.max(1.0)).min(1.0);
    if !urgency.is_empty() {
        result.findings.push(format!(
            "Urgency cues: {} ({} matched)",
            urgency.join(", "),
            urgency.len()
        ));
    }

    // Technique detection - each matched set becomes one technique
    let technique_sets: [(&'static str, &'static str, Vec<&str>); 5] = [
        ("urgency_pressure", "Urgency & Time Pressure", urgency.clone()),
        ("fear_intimidation", "Fear & Intimidation", matched_keywords(text, &FEAR_KEYWORDS)),
        ("authority_impersonation", "Authority Impersonation", matched_keywords(text, &AUTHORITY_KEYWORDS)),
        ("reward_bait", "Reward Bait", matched_keywords(text, &REWARD_KEYWORDS)),
        ("scarcity", "Scarcity", matched_keywords(text, &SCARCITY_KEYWORDS)),
    ];

    let mut technique_score = 0.0f32;
    for (id, name, triggers) in technique_sets {
        if triggers.is_empty() {
            continue;
        }
        technique_score += 0.2;
        result.findings.push(format!("{}: {}", name, triggers.join(", ")));
        result.techniques.push(ManipulationTechnique {
            id,
            name,
            triggers: triggers.into_iter().map(str::to_string).collect(),
        });
    }

    // Link check - raw URLs next to pressure language are a strong combo
    for link in URL_RE.find_iter(text) {
        let url = link.as_str().to_string();
        if is_suspicious_url(&url) {
            result.findings.push(format!("Suspicious link: {}", url));
            result.suspicious_links.push(url);
        }
    }
    let link_score = match result.suspicious_links.len() {
        0 => 0.0,
        1 => 0.3,
        _ => 0.5,
    };

    result.score = (result.urgency_score * 0.5 + technique_score.min(1.0) * 0.35 + link_score * 0.15)
        .min(1.0)
        .max(result.urgency_score * 0.6); // urgency alone can carry a detection
    result
}

/// Lexical URL suspicion: raw IPs, punycode, digit-heavy hosts, deep
/// subdomain chains, and risky TLDs.
pub fn is_suspicious_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let host = lower
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("");

    if host.is_empty() {
        return true; // unparseable = suspicious but inconclusive upstream
    }

    // Raw IPv4 host
    if host.split('.').count() == 4 && host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }

    // Punycode / homoglyph encoding
    if host.contains("xn--") {
        return true;
    }

    // Digit-heavy host names
    let digits = host.chars().filter(|c| c.is_ascii_digit()).count();
    let letters = host.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if letters > 0 && digits * 2 > letters {
        return true;
    }

    // Excessive subdomain nesting
    if host.matches('.').count() >= 4 {
        return true;
    }

    const RISKY_TLDS: [&str; 6] = [".tk", ".ml", ".ga", ".cf", ".gq", ".zip"];
    RISKY_TLDS.iter().any(|tld| host.ends_with(tld))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_scam_text() {
        let result = analyze(
            "URGENT: your account suspended, click here to verify now",
            &TextConfig::default(),
        );
        assert!(result.urgency_score >= 0.6, "got {}", result.urgency_score);
        assert!(result
            .techniques
            .iter()
            .any(|t| t.name == "Urgency & Time Pressure"));
        assert!(result
            .techniques
            .iter()
            .any(|t| t.name == "Fear & Intimidation"));
    }

    #[test]
    fn test_benign_text_scores_low() {
        let result = analyze("see you at lunch tomorrow", &TextConfig::default());
        assert_eq!(result.urgency_score, 0.0);
        assert!(result.techniques.is_empty());
        assert!(result.score < 0.1);
    }

    #[test]
    fn test_empty_text_default() {
        let result = analyze("   ", &TextConfig::default());
        assert_eq!(result.score, 0.0);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_reward_bait() {
        let result = analyze(
            "Congratulations! You are a winner, claim your prize",
            &TextConfig::default(),
        );
        assert!(result.techniques.iter().any(|t| t.id == "reward_bait"));
    }

    #[test]
    fn test_suspicious_ip_link() {
        assert!(is_suspicious_url("http://192.168.4.12/login"));
        assert!(is_suspicious_url("http://xn--bank-y4a.com"));
        assert!(is_suspicious_url("https://secure.login.account.verify.bank.tk"));
        assert!(!is_suspicious_url("https://example.com/page"));
    }

    #[test]
    fn test_link_extraction() {
        let result = analyze(
            "verify now at http://10.0.0.1/confirm please",
            &TextConfig::default(),
        );
        assert_eq!(result.suspicious_links.len(), 1);
    }

    #[test]
    fn test_matched_pattern_ids() {
        let result = analyze(
            "URGENT: account suspended, verify now",
            &TextConfig::default(),
        );
        let ids = result.matched_pattern_ids();
        assert!(ids.contains(&"urgency_pressure".to_string()));
        assert!(ids.contains(&"fear_intimidation".to_string()));
    }
}
