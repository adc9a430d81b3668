//! Adaptive Learning Engine
//!
//! Per-pattern reliability weights driven by user feedback. Each detection
//! pattern carries true/false-positive counters; its weight is a bounded
//! sigmoid of accuracy minus a doubled false-positive penalty, so a pattern
//! that keeps crying wolf is damped toward the floor while a consistently
//! confirmed one is amplified.
//!
//! Seeded patterns start from pseudo-counts instead of raw zero, which makes
//! early feedback move their weight smoothly rather than whipsawing it.

use std::collections::HashMap;
use std::collections::VecDeque;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::config::LearningConfig;
use crate::features::text::bigrams;
use crate::report::{LearningStats, UserFeedback};

use super::patterns::{DiscoveredPattern, PatternStore};

// ============================================================================
// PATTERN WEIGHT STATE
// ============================================================================

/// Counters for one pattern. Fractional because seeded priors enter as
/// pseudo-counts (prior rate x pseudo sample size); `observations` counts
/// only real feedback events, so seeds are distinguishable from learned
/// state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternRecord {
    pub true_positives: f32,
    pub false_positives: f32,
    pub observations: u32,
}

impl PatternRecord {
    pub fn samples(&self) -> f32 {
        self.true_positives + self.false_positives
    }

    /// Confirmed fraction of this pattern's detections; 0.5 with no data
    pub fn accuracy(&self) -> f32 {
        let total = self.samples();
        if total <= 0.0 {
            0.5
        } else {
            self.true_positives / total
        }
    }

    /// Rejected fraction of this pattern's detections; 0.0 with no data
    pub fn false_positive_rate(&self) -> f32 {
        let total = self.samples();
        if total <= 0.0 {
            0.0
        } else {
            self.false_positives / total
        }
    }
}

/// Diagnostic view of a pattern whose false positives dominate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblematicPattern {
    pub pattern_id: String,
    pub false_positive_rate: f32,
    pub samples: f32,
    pub current_weight: f32,
}

// ============================================================================
// WEIGHT FORMULA
// ============================================================================

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// weight = min + span * sigmoid(gain * (accuracy - penalty * fpr))
///
/// With the default config this spans [0.1, 1.5]: accuracy 1.0 with zero
/// false positives lands near 1.5, while a pattern wrong most of the time
/// bottoms out near 0.1 instead of being silenced outright.
pub fn calculate_optimal_weight(accuracy: f32, false_positive_rate: f32, config: &LearningConfig) -> f32 {
    let signal = accuracy - config.false_positive_penalty * false_positive_rate;
    config.weight_min + config.weight_span * sigmoid(config.sigmoid_gain * signal)
}

// ============================================================================
// ENGINE
// ============================================================================

/// Thread-safe adaptive learning state. One instance per detection engine.
pub struct AdaptiveLearningEngine {
    config: LearningConfig,
    weights: RwLock<HashMap<String, PatternRecord>>,
    feedback: Mutex<VecDeque<UserFeedback>>,
    discovered: Mutex<PatternStore>,
}

impl AdaptiveLearningEngine {
    pub fn new(config: LearningConfig) -> Self {
        let discovered_cap = config.discovered_cap;
        Self {
            config,
            weights: RwLock::new(HashMap::new()),
            feedback: Mutex::new(VecDeque::new()),
            discovered: Mutex::new(PatternStore::new(discovered_cap)),
        }
    }

    /// Seed a pattern with a prior accuracy/FPR, expressed as pseudo-counts
    /// so subsequent real feedback blends in rather than replacing it
    pub fn seed_pattern(&self, pattern_id: &str, prior_accuracy: f32, prior_fpr: f32) {
        let n = self.config.seed_pseudo_samples;
        let mut weights = self.weights.write();
        weights.insert(
            pattern_id.to_string(),
            PatternRecord {
                true_positives: prior_accuracy * n,
                false_positives: prior_fpr * n,
                observations: 0,
            },
        );
    }

    /// Record one feedback event: update per-pattern counters, retain the
    /// event in the bounded history, and mine confirmed threat text for new
    /// patterns. O(patterns in the event), never O(history).
    pub fn record_feedback(&self, feedback: UserFeedback, confirmed_text: Option<&str>) {
        if feedback.detected_threat {
            let confirmed = feedback.user_confirmed_threat;
            let mut weights = self.weights.write();
            for pattern_id in &feedback.matched_patterns {
                let record = weights.entry(pattern_id.clone()).or_default();
                record.observations += 1;
                if confirmed {
                    record.true_positives += 1.0;
                } else {
                    record.false_positives += 1.0;
                }
            }
        }

        if feedback.user_confirmed_threat {
            if let Some(text) = confirmed_text {
                self.discover_patterns(text);
            }
        }

        let mut history = self.feedback.lock();
        if history.len() >= self.config.feedback_cap {
            history.pop_front();
        }
        history.push_back(feedback);
    }

    /// Mine bigram phrases from a confirmed-threat text
    pub fn discover_patterns(&self, text: &str) {
        let mut store = self.discovered.lock();
        for phrase in bigrams(text) {
            store.record(&phrase);
        }
    }

    /// Current weight for a pattern. Unknown patterns are neutral (1.0).
    pub fn get_pattern_weight(&self, pattern_id: &str) -> f32 {
        let weights = self.weights.read();
        match weights.get(pattern_id) {
            None => 1.0,
            Some(record) => {
                calculate_optimal_weight(record.accuracy(), record.false_positive_rate(), &self.config)
            }
        }
    }

    /// Reweight a base score (0-100) by the reliability of the patterns that
    /// produced it. Contribution is split evenly across matched patterns and
    /// each share is scaled by its pattern's weight. No patterns = identity.
    pub fn calculate_adjusted_score(&self, base_score: f32, matched_patterns: &[String]) -> f32 {
        if matched_patterns.is_empty() {
            return base_score.clamp(0.0, 100.0);
        }
        let share = base_score / matched_patterns.len() as f32;
        let adjusted: f32 = matched_patterns
            .iter()
            .map(|id| share * self.get_pattern_weight(id))
            .sum();
        adjusted.clamp(0.0, 100.0)
    }

    /// Aggregate stats over the retained feedback window
    pub fn learning_stats(&self) -> LearningStats {
        let history = self.feedback.lock();
        let total = history.len();
        let mut correct = 0usize;
        let mut false_positives = 0usize;
        for event in history.iter() {
            if event.detected_threat == event.user_confirmed_threat {
                correct += 1;
            }
            if event.detected_threat && !event.user_confirmed_threat {
                false_positives += 1;
            }
        }
        drop(history);

        // Seeded priors alone are not improvements; require real feedback
        let weights = self.weights.read();
        let improved = weights
            .values()
            .filter(|r| {
                r.observations > 0
                    && calculate_optimal_weight(r.accuracy(), r.false_positive_rate(), &self.config)
                        > 1.0
            })
            .count();
        drop(weights);

        LearningStats {
            total_feedback: total,
            accuracy_rate: if total == 0 { 0.0 } else { correct as f32 / total as f32 },
            false_positive_rate: if total == 0 {
                0.0
            } else {
                false_positives as f32 / total as f32
            },
            new_patterns_discovered: self.discovered.lock().len(),
            improved_patterns: improved,
        }
    }

    /// Patterns whose false-positive rate exceeds 0.3 over more than 5
    /// samples, worst first. These are review candidates, not auto-disabled.
    pub fn problematic_patterns(&self) -> Vec<ProblematicPattern> {
        let weights = self.weights.read();
        let mut out: Vec<ProblematicPattern> = weights
            .iter()
            .filter(|(_, r)| r.false_positive_rate() > 0.3 && r.samples() > 5.0)
            .map(|(id, r)| ProblematicPattern {
                pattern_id: id.clone(),
                false_positive_rate: r.false_positive_rate(),
                samples: r.samples(),
                current_weight: calculate_optimal_weight(
                    r.accuracy(),
                    r.false_positive_rate(),
                    &self.config,
                ),
            })
            .collect();
        out.sort_by(|a, b| {
            b.false_positive_rate
                .partial_cmp(&a.false_positive_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        out
    }

    /// Wipe one pattern's counters back to the no-data state
    pub fn reset_pattern(&self, pattern_id: &str) {
        self.weights.write().remove(pattern_id);
        log::info!("Pattern '{}' reset to neutral weight", pattern_id);
    }

    /// Discovered patterns at or above a confidence floor
    pub fn discovered_patterns(&self, confidence_floor: f32) -> Vec<DiscoveredPattern> {
        self.discovered
            .lock()
            .confident(confidence_floor)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn feedback_count(&self) -> usize {
        self.feedback.lock().len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AdaptiveLearningEngine {
        AdaptiveLearningEngine::new(LearningConfig::default())
    }

    fn feedback(detected: bool, confirmed: bool, patterns: &[&str]) -> UserFeedback {
        UserFeedback::new(
            "hash",
            detected,
            confirmed,
            75.0,
            patterns.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_unknown_pattern_is_neutral() {
        assert_eq!(engine().get_pattern_weight("never_seen"), 1.0);
    }

    #[test]
    fn test_weight_bounds() {
        let config = LearningConfig::default();
        for acc in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
            for fpr in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
                let w = calculate_optimal_weight(acc, fpr, &config);
                assert!(w >= config.weight_min);
                assert!(w <= config.weight_min + config.weight_span);
            }
        }
    }

    #[test]
    fn test_weight_monotone_in_accuracy_and_fpr() {
        let config = LearningConfig::default();
        assert!(
            calculate_optimal_weight(0.9, 0.0, &config) > calculate_optimal_weight(0.5, 0.0, &config)
        );
        assert!(
            calculate_optimal_weight(0.5, 0.4, &config) < calculate_optimal_weight(0.5, 0.1, &config)
        );
    }

    #[test]
    fn test_confirmations_raise_weight() {
        let e = engine();
        for _ in 0..10 {
            e.record_feedback(feedback(true, true, &["urgency_pressure"]), None);
        }
        assert!(e.get_pattern_weight("urgency_pressure") > 1.0);
    }

    #[test]
    fn test_false_positives_sink_weight() {
        let e = engine();
        for _ in 0..10 {
            e.record_feedback(feedback(true, false, &["reward_bait"]), None);
        }
        let w = e.get_pattern_weight("reward_bait");
        assert!(w < 0.3, "weight was {}", w);
    }

    #[test]
    fn test_seeded_pattern_degrades_monotonically() {
        // A seeded pattern hit by a run of false positives must lose weight
        // every single step, with its FPR climbing toward 1.0
        let e = engine();
        e.seed_pattern("urgency_pressure", 0.7, 0.1);
        let mut last_weight = e.get_pattern_weight("urgency_pressure");
        for _ in 0..10 {
            e.record_feedback(feedback(true, false, &["urgency_pressure"]), None);
            let w = e.get_pattern_weight("urgency_pressure");
            assert!(w < last_weight, "weight failed to decrease: {} -> {}", last_weight, w);
            last_weight = w;
        }
        let record = e.weights.read().get("urgency_pressure").cloned().unwrap();
        assert!(record.false_positive_rate() > 0.5);
        assert!(record.false_positive_rate() < 1.0);
    }

    #[test]
    fn test_adjusted_score_identity_without_patterns() {
        assert_eq!(engine().calculate_adjusted_score(63.0, &[]), 63.0);
    }

    #[test]
    fn test_adjusted_score_clamped() {
        let e = engine();
        for _ in 0..20 {
            e.record_feedback(feedback(true, true, &["a", "b"]), None);
        }
        let adjusted = e.calculate_adjusted_score(
            90.0,
            &["a".to_string(), "b".to_string()],
        );
        assert!(adjusted <= 100.0);
        assert!(adjusted > 90.0); // both patterns amplified
    }

    #[test]
    fn test_neutral_patterns_leave_score_unchanged() {
        let e = engine();
        let adjusted = e.calculate_adjusted_score(
            40.0,
            &["x".to_string(), "y".to_string(), "z".to_string()],
        );
        assert!((adjusted - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_feedback_history_bounded() {
        let mut config = LearningConfig::default();
        config.feedback_cap = 50;
        let e = AdaptiveLearningEngine::new(config);
        for _ in 0..75 {
            e.record_feedback(feedback(true, true, &[]), None);
        }
        assert_eq!(e.feedback_count(), 50);
    }

    #[test]
    fn test_stats_reflect_window() {
        let e = engine();
        for _ in 0..8 {
            e.record_feedback(feedback(true, true, &[]), None);
        }
        for _ in 0..2 {
            e.record_feedback(feedback(true, false, &[]), None);
        }
        let stats = e.learning_stats();
        assert_eq!(stats.total_feedback, 10);
        assert!((stats.accuracy_rate - 0.8).abs() < 1e-6);
        assert!((stats.false_positive_rate - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_patterns_not_counted_as_improved() {
        let e = engine();
        e.seed_pattern("urgency_pressure", 0.7, 0.1);
        e.seed_pattern("reward_bait", 0.65, 0.12);
        // Seeds carry weight > 1.0 but no real feedback yet
        assert!(e.get_pattern_weight("urgency_pressure") > 1.0);
        assert_eq!(e.learning_stats().improved_patterns, 0);

        e.record_feedback(feedback(true, true, &["urgency_pressure"]), None);
        assert_eq!(e.learning_stats().improved_patterns, 1);
    }

    #[test]
    fn test_problematic_patterns_threshold() {
        let e = engine();
        // 4 FP / 6 samples = 0.67 fpr over >5 samples
        for _ in 0..2 {
            e.record_feedback(feedback(true, true, &["noisy"]), None);
        }
        for _ in 0..4 {
            e.record_feedback(feedback(true, false, &["noisy"]), None);
        }
        // Too few samples to qualify
        e.record_feedback(feedback(true, false, &["young"]), None);

        let problems = e.problematic_patterns();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].pattern_id, "noisy");
    }

    #[test]
    fn test_reset_pattern_restores_neutral() {
        let e = engine();
        for _ in 0..10 {
            e.record_feedback(feedback(true, false, &["bad"]), None);
        }
        assert!(e.get_pattern_weight("bad") < 1.0);
        e.reset_pattern("bad");
        assert_eq!(e.get_pattern_weight("bad"), 1.0);
    }

    #[test]
    fn test_confirmed_text_mined_for_patterns() {
        let e = engine();
        e.record_feedback(
            feedback(true, true, &[]),
            Some("wire money now before your account closes"),
        );
        assert!(e.learning_stats().new_patterns_discovered > 0);
    }

    #[test]
    fn test_unconfirmed_text_not_mined() {
        let e = engine();
        e.record_feedback(
            feedback(true, false, &[]),
            Some("wire money now before your account closes"),
        );
        assert_eq!(e.learning_stats().new_patterns_discovered, 0);
    }
}
