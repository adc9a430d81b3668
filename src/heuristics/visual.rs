//! Pixel-Statistics Artifact Check
//!
//! GAN synthesis and heavy re-compression leave fingerprints in raw pixel
//! statistics even when the face geometry looks right: decorrelated color
//! channels, 8x8 block seams, and an unusual high-frequency profile.

use crate::config::VisualConfig;
use crate::features::pixels::PixelStats;
use super::AnalyzerOutput;

/// Score one frame's pixel statistics
pub fn analyze(stats: &PixelStats, config: &VisualConfig) -> AnalyzerOutput {
    let mut out = AnalyzerOutput::empty();

    // A fully-zeroed stat block means the frame was unusable
    if stats.high_freq_energy == 0.0
        && stats.block_artifact == 0.0
        && stats.channel_correlation == 0.0
    {
        out.confidence = Some(0.0);
        return out;
    }

    if stats.channel_correlation < config.channel_corr_min {
        out.flag(
            0.35,
            format!(
                "Color channels decorrelated ({:.2}, natural floor {:.2})",
                stats.channel_correlation, config.channel_corr_min
            ),
        );
    }

    if stats.block_artifact > config.block_artifact_max {
        out.flag(
            0.30,
            format!(
                "Block-boundary seams at {:.0}% excess gradient",
                stats.block_artifact * 100.0
            ),
        );
    }

    if stats.high_freq_energy < config.high_freq_min {
        out.flag(
            0.25,
            "Over-smoothed texture: high-frequency detail below natural floor".to_string(),
        );
    }

    out.confidence = Some(0.7);
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unusable_frame_is_neutral() {
        let out = analyze(&PixelStats::default(), &VisualConfig::default());
        assert_eq!(out.score, 0.0);
        assert_eq!(out.confidence, Some(0.0));
    }

    #[test]
    fn test_natural_stats_score_zero() {
        let stats = PixelStats {
            high_freq_energy: 0.05,
            block_artifact: 0.1,
            channel_correlation: 0.9,
        };
        let out = analyze(&stats, &VisualConfig::default());
        assert_eq!(out.score, 0.0);
    }

    #[test]
    fn test_decorrelated_channels_flagged() {
        let stats = PixelStats {
            high_freq_energy: 0.05,
            block_artifact: 0.1,
            channel_correlation: 0.2,
        };
        let out = analyze(&stats, &VisualConfig::default());
        assert!(out.score > 0.0);
        assert!(out.findings.iter().any(|f| f.contains("decorrelated")));
    }

    #[test]
    fn test_multiple_artifacts_accumulate() {
        let stats = PixelStats {
            high_freq_energy: 0.001,
            block_artifact: 0.8,
            channel_correlation: 0.2,
        };
        let out = analyze(&stats, &VisualConfig::default());
        assert!((out.score - 0.9).abs() < 1e-6);
        assert_eq!(out.findings.len(), 3);
    }

    #[test]
    fn test_thresholds_come_from_config() {
        // Stats that pass the defaults trip a tightened correlation floor
        let stats = PixelStats {
            high_freq_energy: 0.05,
            block_artifact: 0.1,
            channel_correlation: 0.9,
        };
        assert_eq!(analyze(&stats, &VisualConfig::default()).score, 0.0);

        let strict = VisualConfig {
            channel_corr_min: 0.95,
            ..Default::default()
        };
        assert!(analyze(&stats, &strict).score > 0.0);
    }
}
