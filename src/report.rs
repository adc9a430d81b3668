//! Boundary Output Types
//!
//! Structured results exposed to collaborators (UI, persistence, export are
//! all external) and the feedback events consumed back from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

// ============================================================================
// ANALYSIS RESULT
// ============================================================================

/// Reason category attached to a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonKind {
    VisualArtifact,
    FacialGeometry,
    TemporalInconsistency,
    AudioVisualSync,
    VoiceSynthesis,
    ManipulationLanguage,
    SuspiciousLink,
    CommunityReport,
    InsufficientData,
    MalformedInput,
}

/// One human-readable finding backing a detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatReason {
    pub kind: ReasonKind,
    pub title: String,
    pub explanation: String,
    pub evidence: Option<String>,
}

impl ThreatReason {
    pub fn new(kind: ReasonKind, title: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            explanation: explanation.into(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }
}

/// Final structured result for a video or text scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Composite risk score, 0-100
    pub score: f32,
    pub is_positive: bool,
    /// True when the composite fell inside the human-review band
    pub requires_review: bool,
    /// Calibrated confidence in [0,1]
    pub confidence: f32,
    pub reasons: Vec<ThreatReason>,
    /// Per-capability scores that went into the ensemble
    pub model_scores: HashMap<String, f32>,
}

impl AnalysisReport {
    /// Well-formed neutral result for inputs too thin to analyze
    pub fn insufficient(kind: ReasonKind, explanation: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            is_positive: false,
            requires_review: false,
            confidence: 0.0,
            reasons: vec![ThreatReason::new(kind, "Insufficient data", explanation)],
            model_scores: HashMap::new(),
        }
    }

    /// Fixed moderate verdict for malformed input: suspicious but inconclusive.
    pub fn malformed(score: f32, explanation: impl Into<String>) -> Self {
        Self {
            score,
            is_positive: false,
            requires_review: true,
            confidence: 0.2,
            reasons: vec![ThreatReason::new(
                ReasonKind::MalformedInput,
                "Malformed input",
                explanation,
            )],
            model_scores: HashMap::new(),
        }
    }
}

// ============================================================================
// USER FEEDBACK
// ============================================================================

/// One binary feedback event from the UI layer. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeedback {
    pub content_hash: String,
    /// What the detector said
    pub detected_threat: bool,
    /// What the user confirmed
    pub user_confirmed_threat: bool,
    /// The detection score shown to the user (0-100)
    pub detection_score: f32,
    /// Pattern ids that contributed to the detection
    pub matched_patterns: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl UserFeedback {
    pub fn new(
        content_hash: impl Into<String>,
        detected_threat: bool,
        user_confirmed_threat: bool,
        detection_score: f32,
        matched_patterns: Vec<String>,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            detected_threat,
            user_confirmed_threat,
            detection_score,
            matched_patterns,
            timestamp: Utc::now(),
        }
    }
}

/// SHA-256 content hash used to key feedback and community reports
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// LEARNING STATS
// ============================================================================

/// Aggregate learning statistics over the retained feedback window.
/// The window is capped (FIFO) purely for bounded memory; stats cover the
/// full retained window, not a separate rolling sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningStats {
    pub total_feedback: usize,
    pub accuracy_rate: f32,
    pub false_positive_rate: f32,
    pub new_patterns_discovered: usize,
    pub improved_patterns: usize,
}

// ============================================================================
// COMMUNITY THREAT REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatKind {
    ScamMessage,
    ScamCall,
    DeepfakeVideo,
    PhishingUrl,
}

/// Community-reported threat, deduplicated by content hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatReport {
    pub content_hash: String,
    pub kind: ThreatKind,
    pub severity: Severity,
    pub report_count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub region: Option<String>,
    pub metadata: HashMap<String, String>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("urgent: verify your account");
        let b = content_hash("urgent: verify your account");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_content_hash_differs() {
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn test_insufficient_report_is_neutral() {
        let report = AnalysisReport::insufficient(ReasonKind::InsufficientData, "too few frames");
        assert_eq!(report.score, 0.0);
        assert!(!report.is_positive);
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.reasons.len(), 1);
    }

    #[test]
    fn test_report_serializes_for_ui() {
        let report = AnalysisReport::malformed(50.0, "bad frame");
        let json = serde_json::to_string(&report).expect("serialize");
        let back: AnalysisReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.score, 50.0);
        assert!(back.requires_review);
    }

    #[test]
    fn test_reason_kind_keys_a_map() {
        // The engine groups per-frame findings in a HashMap keyed by kind
        let mut findings: HashMap<ReasonKind, Vec<String>> = HashMap::new();
        findings
            .entry(ReasonKind::VisualArtifact)
            .or_default()
            .push("block seams".to_string());
        findings
            .entry(ReasonKind::VisualArtifact)
            .or_default()
            .push("decorrelated channels".to_string());
        assert_eq!(findings.get(&ReasonKind::VisualArtifact).map(Vec::len), Some(2));
        assert!(findings.get(&ReasonKind::VoiceSynthesis).is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
