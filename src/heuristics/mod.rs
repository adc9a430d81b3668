//! Heuristic Analyzers
//!
//! Deterministic scoring functions over extracted features. Always
//! available - they are the reliability floor the ensemble falls back on
//! when a model slot is absent or failing. Every threshold comes from
//! `config`, every output is a bounded [0,1] score plus findings.

pub mod face;
pub mod lips;
pub mod mesh;
pub mod text;
pub mod visual;
pub mod voice;

use serde::{Deserialize, Serialize};

/// One analyzer invocation's result. Immutable, consumed once by the ensemble.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerOutput {
    /// Anomaly score in [0,1]
    pub score: f32,
    /// Human-readable findings backing the score
    pub findings: Vec<String>,
    /// Analyzer's own confidence, when it can state one
    pub confidence: Option<f32>,
}

impl AnalyzerOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add `increment` to the score (capped at 1.0) with a finding
    pub fn flag(&mut self, increment: f32, finding: impl Into<String>) {
        self.score = (self.score + increment).min(1.0);
        self.findings.push(finding.into());
    }
}
