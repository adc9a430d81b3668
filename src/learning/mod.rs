//! Learning Module - Adaptive Pattern Weights
//!
//! User-feedback-driven reliability weights plus the discovered-pattern
//! store mined from confirmed threat texts.

pub mod engine;
pub mod patterns;

pub use engine::{calculate_optimal_weight, AdaptiveLearningEngine, PatternRecord, ProblematicPattern};
pub use patterns::{DiscoveredPattern, PatternStore};
