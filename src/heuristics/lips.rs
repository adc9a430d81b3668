//! Lip Contour & Audio-Visual Sync Analysis
//!
//! Two related checks: (a) naturalness of the mouth contour in a single
//! frame - jagged or asymmetric contours flag generated mouths; (b) how
//! well the mouth-opening series tracks the audio energy envelope across
//! frames - dubbed or synthesized speech decouples them.

use crate::config::ContourConfig;
use crate::features::{contour, pixels};
use crate::media::Point2;
use super::AnalyzerOutput;

/// Score one frame's mouth contour naturalness
pub fn analyze_contour(mouth_contour: &[Point2], config: &ContourConfig) -> AnalyzerOutput {
    let mut out = AnalyzerOutput::empty();

    let smoothness = contour::smoothness(mouth_contour);
    let asymmetry = contour::asymmetry(mouth_contour);

    if smoothness.is_none() && asymmetry.is_none() {
        out.confidence = Some(0.0);
        return out;
    }

    if let Some(s) = smoothness {
        if s > config.jagged_threshold {
            out.flag(
                config.jagged_increment,
                format!(
                    "Jagged lip contour: turning angle {:.2} exceeds {:.2}",
                    s, config.jagged_threshold
                ),
            );
        }
    }

    if let Some(a) = asymmetry {
        if a > config.asymmetry_threshold {
            out.flag(
                config.asymmetry_increment,
                format!(
                    "Asymmetric lip contour: divergence {:.2} exceeds {:.2}",
                    a, config.asymmetry_threshold
                ),
            );
        }
    }

    out.confidence = Some(0.8);
    out
}

/// Audio-visual sync anomaly from a per-frame mouth-opening series and a
/// per-frame audio energy series (already aligned to the same frame times).
///
/// Healthy speech correlates positively; the anomaly score grows as the
/// correlation drops toward zero or goes negative. Too few frames or a flat
/// series returns a zero score with no findings.
pub fn analyze_sync(mouth_openings: &[f32], audio_energy: &[f32]) -> AnalyzerOutput {
    let mut out = AnalyzerOutput::empty();

    let n = mouth_openings.len().min(audio_energy.len());
    if n < 5 {
        out.confidence = Some(0.0);
        return out;
    }

    let corr = match pixels::pearson(&mouth_openings[..n], &audio_energy[..n]) {
        Some(c) => c,
        None => {
            // One of the series is flat - sync is unmeasurable, not anomalous
            out.confidence = Some(0.0);
            return out;
        }
    };

    // corr 1.0 -> 0.0 anomaly, corr 0.0 -> 0.5, corr -1.0 -> 1.0
    out.score = ((1.0 - corr) / 2.0).clamp(0.0, 1.0);
    if corr < 0.2 {
        out.findings.push(format!(
            "Mouth movement poorly tracks audio energy (correlation {:.2})",
            corr
        ));
    }
    out.confidence = Some(((n as f32) / 30.0).min(1.0));
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_smooth_symmetric_contour_scores_zero() {
        let contour = vec![
            p(0.0, 1.0),
            p(1.0, 1.8),
            p(2.0, 2.2),
            p(3.0, 2.2),
            p(4.0, 1.8),
            p(5.0, 1.0),
        ];
        let out = analyze_contour(&contour, &ContourConfig::default());
        assert_eq!(out.score, 0.0, "findings: {:?}", out.findings);
    }

    #[test]
    fn test_jagged_contour_flagged() {
        let contour: Vec<Point2> = (0..12)
            .map(|i| p(i as f32, if i % 2 == 0 { 0.0 } else { 4.0 }))
            .collect();
        let out = analyze_contour(&contour, &ContourConfig::default());
        assert!(out.score > 0.0);
        assert!(out.findings.iter().any(|f| f.contains("Jagged")));
    }

    #[test]
    fn test_empty_contour_neutral() {
        let out = analyze_contour(&[], &ContourConfig::default());
        assert_eq!(out.score, 0.0);
        assert_eq!(out.confidence, Some(0.0));
    }

    #[test]
    fn test_synced_series_low_anomaly() {
        let mouth = [0.1, 0.5, 0.8, 0.4, 0.2, 0.6, 0.9, 0.3];
        let audio = [0.1, 0.5, 0.8, 0.4, 0.2, 0.6, 0.9, 0.3];
        let out = analyze_sync(&mouth, &audio);
        assert!(out.score < 0.1);
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_desynced_series_high_anomaly() {
        let mouth = [0.1, 0.5, 0.8, 0.4, 0.2, 0.6, 0.9, 0.3];
        let audio = [0.9, 0.3, 0.1, 0.5, 0.8, 0.2, 0.1, 0.7];
        let out = analyze_sync(&mouth, &audio);
        assert!(out.score > 0.5);
        assert!(!out.findings.is_empty());
    }

    #[test]
    fn test_sync_too_few_frames() {
        let out = analyze_sync(&[0.1, 0.2], &[0.3, 0.4]);
        assert_eq!(out.score, 0.0);
        assert_eq!(out.confidence, Some(0.0));
    }

    #[test]
    fn test_sync_flat_series_unmeasurable() {
        let mouth = [0.5; 10];
        let audio = [0.1, 0.5, 0.8, 0.4, 0.2, 0.6, 0.9, 0.3, 0.2, 0.5];
        let out = analyze_sync(&mouth, &audio);
        assert_eq!(out.score, 0.0);
    }
}
