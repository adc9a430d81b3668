//! Temporal Tracker
//!
//! Bounded sliding window of frame snapshots (ring buffer, capacity 30,
//! minimum 5 for analysis). Catches the artifacts invisible in any single
//! frame: missing blinks, landmark jitter, impossible head-pose motion,
//! decoupled eye/mouth response, unstable face shape.
//!
//! One tracker per media item. Sharing a tracker across unrelated items
//! without `reset()` mixes their temporal signals - the tracker does not
//! auto-detect context switches.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::TemporalConfig;
use crate::features::pixels::pearson;
use crate::media::LandmarkId;

use super::snapshot::FrameSnapshot;

// ============================================================================
// REPORT
// ============================================================================

/// Temporal analysis output. Sub-scores are independent [0,1] anomaly
/// measures; the composite is their fixed weighting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalReport {
    pub blink_score: f32,
    pub jitter_score: f32,
    pub pose_score: f32,
    pub coordination_score: f32,
    pub shape_score: f32,
    /// Weighted composite in [0,1]
    pub composite: f32,
    /// 1 - composite; low coherence is itself a manipulation indicator
    pub coherence: f32,
    pub findings: Vec<String>,
    pub frames_analyzed: usize,
    /// True when fewer than the minimum frames were recorded
    pub insufficient_data: bool,
}

impl TemporalReport {
    fn insufficient(frames: usize, min_frames: usize) -> Self {
        Self {
            coherence: 1.0,
            findings: vec![format!(
                "Insufficient frames for temporal analysis ({} of {} required)",
                frames, min_frames
            )],
            frames_analyzed: frames,
            insufficient_data: true,
            ..Default::default()
        }
    }
}

// ============================================================================
// TRACKER
// ============================================================================

/// Sliding-window tracker over one media item's frames
pub struct TemporalTracker {
    config: TemporalConfig,
    frames: VecDeque<FrameSnapshot>,
}

impl TemporalTracker {
    pub fn new(config: TemporalConfig) -> Self {
        let capacity = config.capacity;
        Self {
            config,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a snapshot, evicting the oldest beyond capacity. O(1).
    pub fn record_frame(&mut self, snapshot: FrameSnapshot) {
        if self.frames.len() >= self.config.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(snapshot);
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Clear the window. Must be called before reusing the tracker for a
    /// different media item.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Run all five sub-analyses over the window.
    /// Under the minimum frame count this returns the explicit
    /// insufficient-data report with all sub-scores 0.
    pub fn analyze(&self) -> TemporalReport {
        let frames: Vec<&FrameSnapshot> = self.frames.iter().collect();
        if frames.len() < self.config.min_frames {
            return TemporalReport::insufficient(frames.len(), self.config.min_frames);
        }

        let mut report = TemporalReport {
            frames_analyzed: frames.len(),
            ..Default::default()
        };

        report.blink_score = self.analyze_blinks(&frames, &mut report.findings);
        report.jitter_score = self.analyze_jitter(&frames, &mut report.findings);
        report.pose_score = self.analyze_pose(&frames, &mut report.findings);
        report.coordination_score = self.analyze_coordination(&frames, &mut report.findings);
        report.shape_score = self.analyze_shape(&frames, &mut report.findings);

        let w = &self.config.sub_weights;
        report.composite = (report.blink_score * w[0]
            + report.jitter_score * w[1]
            + report.pose_score * w[2]
            + report.coordination_score * w[3]
            + report.shape_score * w[4])
            .clamp(0.0, 1.0);
        report.coherence = 1.0 - report.composite;
        report
    }

    // ------------------------------------------------------------------
    // Blink rate
    // ------------------------------------------------------------------

    fn analyze_blinks(&self, frames: &[&FrameSnapshot], findings: &mut Vec<String>) -> f32 {
        let threshold = self.config.eye_open_threshold;
        let span_ms = frames.last().map(|f| f.timestamp_ms).unwrap_or(0)
            - frames.first().map(|f| f.timestamp_ms).unwrap_or(0);

        // Open -> closed -> open transitions on the combined eye signal
        let mut blinks: Vec<i64> = Vec::new(); // timestamps of blink completion
        let mut asymmetric = 0usize;
        let mut closed = false;
        let mut closed_left_only = false;
        let mut closed_right_only = false;

        for frame in frames {
            let open = match frame.eye_openness() {
                Some(v) => v,
                None => continue,
            };

            if !closed && open < threshold {
                closed = true;
                // One-eye-only closure at blink onset
                closed_left_only = matches!(
                    (frame.left_eye_open, frame.right_eye_open),
                    (Some(l), Some(r)) if l < threshold && r >= threshold
                );
                closed_right_only = matches!(
                    (frame.left_eye_open, frame.right_eye_open),
                    (Some(l), Some(r)) if r < threshold && l >= threshold
                );
            } else if closed && open >= threshold {
                closed = false;
                blinks.push(frame.timestamp_ms);
                if closed_left_only || closed_right_only {
                    asymmetric += 1;
                }
            }
        }

        let mut score = 0.0f32;

        if blinks.is_empty() && span_ms > self.config.no_blink_span_ms {
            score += 0.5;
            findings.push(format!(
                "No blinks over {:.1}s of footage - natural blinking is near-continuous",
                span_ms as f32 / 1000.0
            ));
        }

        if span_ms > 0 && !blinks.is_empty() {
            let per_minute = blinks.len() as f32 * 60_000.0 / span_ms as f32;
            if per_minute > self.config.max_blink_rate {
                score += 0.4;
                findings.push(format!(
                    "Blink rate {:.0}/min exceeds natural ceiling {:.0}/min",
                    per_minute, self.config.max_blink_rate
                ));
            }
        }

        if !blinks.is_empty() {
            let asym_ratio = asymmetric as f32 / blinks.len() as f32;
            if asym_ratio > self.config.asymmetric_blink_ratio {
                score += 0.4;
                findings.push(format!(
                    "{:.0}% of blinks were one-eyed (limit {:.0}%)",
                    asym_ratio * 100.0,
                    self.config.asymmetric_blink_ratio * 100.0
                ));
            }
        }

        // Too-regular blink intervals (synthetic schedulers blink on a clock)
        if blinks.len() >= 3 {
            let intervals: Vec<f32> = blinks
                .windows(2)
                .map(|w| (w[1] - w[0]) as f32)
                .collect();
            if let Some(cv) = coefficient_of_variation(&intervals) {
                if cv < self.config.blink_interval_cv_min {
                    score += 0.3;
                    findings.push(format!(
                        "Blink intervals unnaturally regular (CV {:.2} below {:.2})",
                        cv, self.config.blink_interval_cv_min
                    ));
                }
            }
        }

        score.min(1.0)
    }

    // ------------------------------------------------------------------
    // Landmark jitter
    // ------------------------------------------------------------------

    fn analyze_jitter(&self, frames: &[&FrameSnapshot], findings: &mut Vec<String>) -> f32 {
        let displacements: Vec<f32> = frames
            .windows(2)
            .filter_map(|w| w[1].displacement_from(w[0]))
            .collect();
        if displacements.len() < 3 {
            return 0.0;
        }

        let disp_mean = mean(&displacements);
        let stddev = stddev(&displacements, disp_mean);
        let mut score = 0.0f32;

        // High-frequency micro-jitter: big variance without real motion
        if stddev > self.config.jitter_stddev_max && disp_mean < self.config.jitter_mean_max {
            score += 0.5;
            findings.push(format!(
                "High-frequency landmark jitter (stddev {:.3} with mean {:.3})",
                stddev, disp_mean
            ));
        }

        // Jerky acceleration
        let accels: Vec<f32> = displacements.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        if !accels.is_empty() {
            let accel_mean = mean(&accels);
            if accel_mean > self.config.accel_mean_max {
                score += 0.3;
                findings.push(format!(
                    "Jerky landmark acceleration (mean {:.3} above {:.3})",
                    accel_mean, self.config.accel_mean_max
                ));
            }
        }

        // Oscillation: sign reversals with matched magnitude on eye-center motion
        let eye_xs: Vec<f32> = frames
            .iter()
            .filter_map(|f| f.landmarks.get(&LandmarkId::LeftEye).map(|p| p.x))
            .collect();
        if eye_xs.len() >= 4 {
            let deltas: Vec<f32> = eye_xs.windows(2).map(|w| w[1] - w[0]).collect();
            let mut oscillating = 0usize;
            let mut triples = 0usize;
            for pair in deltas.windows(2) {
                triples += 1;
                let (a, b) = (pair[0], pair[1]);
                if a * b < 0.0 && a.abs() > 1e-6 {
                    let ratio = b.abs() / a.abs();
                    if (0.5..=2.0).contains(&ratio) {
                        oscillating += 1;
                    }
                }
            }
            if triples > 0 {
                let ratio = oscillating as f32 / triples as f32;
                if ratio > self.config.oscillation_ratio_max {
                    score += 0.3;
                    findings.push(format!(
                        "Oscillating landmark motion in {:.0}% of consecutive triples",
                        ratio * 100.0
                    ));
                }
            }
        }

        score.min(1.0)
    }

    // ------------------------------------------------------------------
    // Head-pose consistency
    // ------------------------------------------------------------------

    fn analyze_pose(&self, frames: &[&FrameSnapshot], findings: &mut Vec<String>) -> f32 {
        let mut score = 0.0f32;
        let limits = self.config.pose_delta_max_deg;

        let mut violations = 0usize;
        let deltas: Vec<[f32; 3]> = frames
            .windows(2)
            .map(|w| {
                [
                    w[1].yaw - w[0].yaw,
                    w[1].pitch - w[0].pitch,
                    w[1].roll - w[0].roll,
                ]
            })
            .collect();
        for d in &deltas {
            if d[0].abs() > limits[0] || d[1].abs() > limits[1] || d[2].abs() > limits[2] {
                violations += 1;
            }
        }
        if !deltas.is_empty() {
            let ratio = violations as f32 / deltas.len() as f32;
            if ratio > self.config.pose_violation_ratio {
                score += 0.5;
                findings.push(format!(
                    "Impossible head-pose jumps in {:.0}% of frame transitions",
                    ratio * 100.0
                ));
            }
        }

        // Per-axis jitter
        let yaws: Vec<f32> = frames.iter().map(|f| f.yaw).collect();
        let pitches: Vec<f32> = frames.iter().map(|f| f.pitch).collect();
        let rolls: Vec<f32> = frames.iter().map(|f| f.roll).collect();
        let max_axis_stddev = [&yaws, &pitches, &rolls]
            .iter()
            .map(|series| {
                let m = mean(series);
                stddev(series, m)
            })
            .fold(0.0f32, f32::max);
        if max_axis_stddev > self.config.pose_stddev_max_deg {
            score += 0.3;
            findings.push(format!(
                "Head-pose jitter stddev {:.1} deg exceeds {:.1} deg",
                max_axis_stddev, self.config.pose_stddev_max_deg
            ));
        }

        // Frozen pose: literally zero variance over a long window
        if frames.len() > self.config.pose_frozen_frames && max_axis_stddev < 1e-4 {
            score += 0.4;
            findings.push(format!(
                "Head pose frozen across {} frames - natural heads always drift",
                frames.len()
            ));
        }

        score.min(1.0)
    }

    // ------------------------------------------------------------------
    // Eye-mouth coordination
    // ------------------------------------------------------------------

    fn analyze_coordination(&self, frames: &[&FrameSnapshot], findings: &mut Vec<String>) -> f32 {
        let pairs: Vec<(f32, f32)> = frames
            .iter()
            .filter_map(|f| match (f.eye_openness(), f.smile) {
                (Some(eye), Some(smile)) => Some((eye, smile)),
                _ => None,
            })
            .collect();
        if pairs.len() < self.config.min_frames {
            return 0.0;
        }

        let eyes: Vec<f32> = pairs.iter().map(|p| p.0).collect();
        let smiles: Vec<f32> = pairs.iter().map(|p| p.1).collect();
        let smile_range = range(&smiles);
        let eye_range = range(&eyes);
        let mut score = 0.0f32;

        // Real smiles squeeze the eyes; a big smile swing with dead eyes
        // means the regions are animated independently
        if smile_range > self.config.smile_range_min && eye_range < 0.05 {
            score += 0.5;
            findings.push(format!(
                "Eyes unresponsive (range {:.2}) despite smile swing of {:.2}",
                eye_range, smile_range
            ));
        }

        if let Some(corr) = pearson(&eyes, &smiles) {
            if corr > self.config.coordination_corr_max {
                score += 0.4;
                findings.push(format!(
                    "Eye/smile correlation {:.2} anomalously high - regions move in lockstep",
                    corr
                ));
            }
        }

        score.min(1.0)
    }

    // ------------------------------------------------------------------
    // Face-shape stability
    // ------------------------------------------------------------------

    fn analyze_shape(&self, frames: &[&FrameSnapshot], findings: &mut Vec<String>) -> f32 {
        let aspects: Vec<f32> = frames.iter().filter_map(|f| f.aspect_ratio()).collect();
        if aspects.len() < self.config.min_frames {
            return 0.0;
        }

        let mut score = 0.0f32;

        if let Some(cv) = coefficient_of_variation(&aspects) {
            if cv > self.config.aspect_cv_max {
                score += 0.5;
                findings.push(format!(
                    "Face aspect ratio unstable (CV {:.3} above {:.3})",
                    cv, self.config.aspect_cv_max
                ));
            }
        }

        let areas: Vec<f32> = frames.iter().map(|f| f.face_area()).collect();
        let mut jumps = 0usize;
        for w in areas.windows(2) {
            if w[0] > 1e-6 && ((w[1] - w[0]).abs() / w[0]) > self.config.area_jump_fraction {
                jumps += 1;
            }
        }
        if jumps > self.config.area_jump_count_max {
            score += 0.4;
            findings.push(format!(
                "{} sudden face-area changes of more than {:.0}%",
                jumps,
                self.config.area_jump_fraction * 100.0
            ));
        }

        score.min(1.0)
    }
}

// ============================================================================
// SERIES HELPERS
// ============================================================================

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn stddev(values: &[f32], mean: f32) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32).sqrt()
}

fn range(values: &[f32]) -> f32 {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}

fn coefficient_of_variation(values: &[f32]) -> Option<f32> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    if m.abs() < 1e-9 {
        return None;
    }
    Some(stddev(values, m) / m)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Point2;
    use std::collections::HashMap;

    fn snapshot(timestamp_ms: i64) -> FrameSnapshot {
        let mut landmarks = HashMap::new();
        landmarks.insert(LandmarkId::LeftEye, Point2::new(30.0, 50.0));
        landmarks.insert(LandmarkId::RightEye, Point2::new(65.0, 50.0));
        FrameSnapshot {
            timestamp_ms,
            left_eye_open: Some(0.9),
            right_eye_open: Some(0.9),
            smile: Some(0.1),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            landmarks,
            face_width: 100.0,
            face_height: 140.0,
            face_center: Point2::new(50.0, 70.0),
        }
    }

    fn tracker() -> TemporalTracker {
        TemporalTracker::new(TemporalConfig::default())
    }

    #[test]
    fn test_insufficient_under_five_frames() {
        let mut t = tracker();
        for i in 0..4 {
            t.record_frame(snapshot(i * 100));
        }
        let report = t.analyze();
        assert!(report.insufficient_data);
        assert_eq!(report.blink_score, 0.0);
        assert_eq!(report.jitter_score, 0.0);
        assert_eq!(report.pose_score, 0.0);
        assert_eq!(report.coordination_score, 0.0);
        assert_eq!(report.shape_score, 0.0);
        assert_eq!(report.composite, 0.0);
        assert!(report.findings[0].contains("Insufficient frames"));

        // The fifth frame unlocks normal analysis
        t.record_frame(snapshot(400));
        let report = t.analyze();
        assert!(!report.insufficient_data);
        assert_eq!(report.frames_analyzed, 5);
    }

    #[test]
    fn test_ring_buffer_eviction() {
        let mut t = tracker();
        for i in 0..40 {
            t.record_frame(snapshot(i * 100));
        }
        assert_eq!(t.frame_count(), 30);
        let report = t.analyze();
        assert_eq!(report.frames_analyzed, 30);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut t = tracker();
        for i in 0..10 {
            t.record_frame(snapshot(i * 100));
        }
        t.reset();
        assert_eq!(t.frame_count(), 0);
        assert!(t.analyze().insufficient_data);
    }

    #[test]
    fn test_no_blinks_flagged_over_long_span() {
        // 30 identical frames across 6 seconds, eyes always open
        let mut t = tracker();
        for i in 0..30 {
            t.record_frame(snapshot(i * 200));
        }
        let report = t.analyze();
        assert!(report.blink_score >= 0.5);
        assert!(report.findings.iter().any(|f| f.contains("No blinks")));
    }

    #[test]
    fn test_no_blinks_not_flagged_on_short_clip() {
        // 30 frames across only 3 seconds - too short to demand a blink
        let mut t = tracker();
        for i in 0..30 {
            t.record_frame(snapshot(i * 100));
        }
        let report = t.analyze();
        assert!(!report.findings.iter().any(|f| f.contains("No blinks")));
    }

    #[test]
    fn test_normal_blinking_scores_low() {
        // Blink every ~3s with natural-ish variation
        let mut t = tracker();
        for i in 0..30 {
            let mut s = snapshot(i * 250);
            if i % 12 == 0 && i > 0 {
                s.left_eye_open = Some(0.1);
                s.right_eye_open = Some(0.1);
            }
            t.record_frame(s);
        }
        let report = t.analyze();
        assert!(report.blink_score < 0.5, "findings: {:?}", report.findings);
    }

    #[test]
    fn test_frozen_pose_flagged() {
        let mut t = tracker();
        for i in 0..15 {
            t.record_frame(snapshot(i * 100));
        }
        let report = t.analyze();
        assert!(report.pose_score > 0.0);
        assert!(report.findings.iter().any(|f| f.contains("frozen")));
    }

    #[test]
    fn test_pose_jumps_flagged() {
        let mut t = tracker();
        for i in 0..10 {
            let mut s = snapshot(i * 2000); // long span, avoid no-blink noise interplay
            s.yaw = if i % 2 == 0 { -20.0 } else { 20.0 };
            t.record_frame(s);
        }
        let report = t.analyze();
        assert!(report.pose_score >= 0.5);
        assert!(report
            .findings
            .iter()
            .any(|f| f.contains("head-pose jumps")));
    }

    #[test]
    fn test_dead_eyes_with_smile_swing() {
        let mut t = tracker();
        for i in 0..10 {
            let mut s = snapshot(i * 100);
            s.smile = Some(if i % 2 == 0 { 0.05 } else { 0.85 });
            t.record_frame(s);
        }
        let report = t.analyze();
        assert!(report.coordination_score >= 0.5);
        assert!(report.findings.iter().any(|f| f.contains("unresponsive")));
    }

    #[test]
    fn test_face_area_jumps_flagged() {
        let mut t = tracker();
        for i in 0..10 {
            let mut s = snapshot(i * 100);
            if i % 3 == 0 {
                s.face_width = 160.0;
                s.face_height = 180.0;
            }
            t.record_frame(s);
        }
        let report = t.analyze();
        assert!(report.shape_score > 0.0, "findings: {:?}", report.findings);
    }

    #[test]
    fn test_composite_weighting() {
        let mut t = tracker();
        for i in 0..30 {
            t.record_frame(snapshot(i * 200));
        }
        let report = t.analyze();
        let w = TemporalConfig::default().sub_weights;
        let expected = report.blink_score * w[0]
            + report.jitter_score * w[1]
            + report.pose_score * w[2]
            + report.coordination_score * w[3]
            + report.shape_score * w[4];
        assert!((report.composite - expected).abs() < 1e-6);
        assert!((report.coherence - (1.0 - report.composite)).abs() < 1e-6);
    }
}
