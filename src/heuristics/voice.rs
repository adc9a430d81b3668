//! Voice-Clone Heuristic
//!
//! Scores jitter/shimmer micro-variation and spectral flatness. Synthesized
//! speech is typically too stable: human vocal folds never repeat a cycle
//! exactly. Empty input returns the explicit empty guard result, never an
//! error.

use crate::config::VoiceConfig;
use crate::features::audio::{self, AudioFeatures};
use serde::{Deserialize, Serialize};

/// Voice-clone analysis result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceCloneResult {
    pub is_cloned: bool,
    /// 0.0 when the input was empty or unvoiced
    pub confidence: f32,
    /// Anomaly score in [0,1]
    pub score: f32,
    pub findings: Vec<String>,
}

/// Analyze a PCM buffer for voice-clone indicators
pub fn analyze(samples: &[f32], sample_rate: u32, config: &VoiceConfig) -> VoiceCloneResult {
    // Explicit empty-input guard
    if samples.is_empty() || sample_rate == 0 {
        return VoiceCloneResult::default();
    }

    let features = audio::extract_features(samples, sample_rate, config.chunk_size, config.silence_rms);
    analyze_features(&features, config)
}

/// Score pre-extracted audio features
pub fn analyze_features(features: &AudioFeatures, config: &VoiceConfig) -> VoiceCloneResult {
    let mut result = VoiceCloneResult::default();

    // All-silence buffers carry no usable voice signal
    if features.chunk_energy.is_empty() || features.silence_ratio >= 1.0 {
        return result;
    }

    let mut measured = 0usize;

    if let Some(jitter) = features.jitter {
        measured += 1;
        if jitter < config.jitter_min {
            result.score += 0.35;
            result.findings.push(format!(
                "Pitch jitter {:.4} below natural floor {:.4} - unnaturally stable phonation",
                jitter, config.jitter_min
            ));
        }
    }

    if let Some(shimmer) = features.shimmer {
        measured += 1;
        if shimmer < config.shimmer_min {
            result.score += 0.35;
            result.findings.push(format!(
                "Amplitude shimmer {:.4} below natural floor {:.4}",
                shimmer, config.shimmer_min
            ));
        }
    }

    if let Some(flatness) = features.flatness {
        measured += 1;
        if flatness > config.flatness_max {
            result.score += 0.30;
            result.findings.push(format!(
                "Energy distribution too uniform (flatness {:.2} above {:.2})",
                flatness, config.flatness_max
            ));
        }
    }

    result.score = result.score.min(1.0);
    result.is_cloned = result.score > config.clone_threshold;
    result.confidence = if measured == 0 {
        0.0
    } else {
        (measured as f32 / 3.0) * (1.0 - features.silence_ratio)
    };
    result
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_audio_guard() {
        let result = analyze(&[], 16_000, &VoiceConfig::default());
        assert!(!result.is_cloned);
        assert_eq!(result.confidence, 0.0);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_zero_sample_rate_guard() {
        let result = analyze(&[0.1, 0.2, 0.3], 0, &VoiceConfig::default());
        assert!(!result.is_cloned);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_pure_tone_flags_stability() {
        // A mathematically perfect tone has near-zero jitter and shimmer
        let sample_rate = 16_000u32;
        let samples: Vec<f32> = (0..sample_rate * 2)
            .map(|i| (2.0 * std::f32::consts::PI * 120.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        let result = analyze(&samples, sample_rate, &VoiceConfig::default());
        assert!(result.score > 0.0, "pure tone should trip stability checks");
        assert!(!result.findings.is_empty());
    }

    #[test]
    fn test_silence_has_no_verdict() {
        let samples = vec![0.0f32; 32_000];
        let result = analyze(&samples, 16_000, &VoiceConfig::default());
        assert!(!result.is_cloned);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_clone_threshold_comes_from_config() {
        // Only jitter below the natural floor: anomaly score 0.35
        let features = AudioFeatures {
            chunk_energy: vec![0.5, 0.5],
            jitter: Some(0.001),
            shimmer: Some(0.05),
            flatness: Some(0.3),
            silence_ratio: 0.0,
        };
        let default = analyze_features(&features, &VoiceConfig::default());
        assert!((default.score - 0.35).abs() < 1e-6);
        assert!(!default.is_cloned);

        let strict = VoiceConfig {
            clone_threshold: 0.3,
            ..Default::default()
        };
        assert!(analyze_features(&features, &strict).is_cloned);
    }

    #[test]
    fn test_features_with_nothing_measured() {
        let features = AudioFeatures {
            chunk_energy: vec![0.5, 0.5],
            jitter: None,
            shimmer: None,
            flatness: None,
            silence_ratio: 0.0,
        };
        let result = analyze_features(&features, &VoiceConfig::default());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.score, 0.0);
    }
}
