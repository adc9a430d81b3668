//! Audio Feature Extraction
//!
//! Per-chunk energy, pitch-period estimation and the jitter/shimmer
//! micro-variation measures the voice heuristics score. Human phonation
//! always carries small cycle-to-cycle variation; synthesis pipelines tend
//! to flatten it.

use serde::{Deserialize, Serialize};

/// Pitch search range in Hz (covers adult speech)
const PITCH_MIN_HZ: f32 = 60.0;
const PITCH_MAX_HZ: f32 = 400.0;

/// Summary of one analyzed audio buffer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Per-chunk RMS energy
    pub chunk_energy: Vec<f32>,
    /// Pitch-period jitter: mean relative change of consecutive periods
    pub jitter: Option<f32>,
    /// Amplitude shimmer: mean relative change of consecutive chunk peaks
    pub shimmer: Option<f32>,
    /// Spectral flatness proxy in [0,1]; higher = smoother spectrum
    pub flatness: Option<f32>,
    /// Fraction of chunks below the silence floor
    pub silence_ratio: f32,
}

/// Extract features from mono PCM. Empty input returns default (all `None`),
/// never an error - the caller's empty-input guard decides what to do.
pub fn extract_features(samples: &[f32], sample_rate: u32, chunk_size: usize, silence_rms: f32) -> AudioFeatures {
    if samples.is_empty() || sample_rate == 0 || chunk_size == 0 {
        return AudioFeatures::default();
    }

    let chunks: Vec<&[f32]> = samples.chunks(chunk_size).filter(|c| c.len() >= chunk_size / 2).collect();
    if chunks.is_empty() {
        return AudioFeatures::default();
    }

    let chunk_energy: Vec<f32> = chunks.iter().map(|c| rms(c)).collect();
    let silent = chunk_energy.iter().filter(|e| **e < silence_rms).count();
    let silence_ratio = silent as f32 / chunk_energy.len() as f32;

    // Voiced chunks only for pitch work
    let voiced: Vec<&&[f32]> = chunks
        .iter()
        .zip(chunk_energy.iter())
        .filter(|(_, e)| **e >= silence_rms)
        .map(|(c, _)| c)
        .collect();

    let periods: Vec<f32> = voiced
        .iter()
        .filter_map(|c| pitch_period(c, sample_rate))
        .collect();

    let jitter = relative_variation(&periods);

    let peaks: Vec<f32> = voiced
        .iter()
        .map(|c| c.iter().fold(0.0f32, |m, s| m.max(s.abs())))
        .filter(|p| *p > 0.0)
        .collect();
    let shimmer = relative_variation(&peaks);

    let flatness = spectral_flatness(&chunk_energy);

    AudioFeatures {
        chunk_energy,
        jitter,
        shimmer,
        flatness,
        silence_ratio,
    }
}

/// Root mean square of a sample slice
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Fundamental period estimate via normalized autocorrelation peak search.
/// Returns the period in samples, or `None` when no clear peak exists.
pub fn pitch_period(chunk: &[f32], sample_rate: u32) -> Option<f32> {
    let min_lag = (sample_rate as f32 / PITCH_MAX_HZ) as usize;
    let max_lag = (sample_rate as f32 / PITCH_MIN_HZ) as usize;
    if chunk.len() < max_lag + 1 || min_lag >= max_lag {
        return None;
    }

    let energy: f32 = chunk.iter().map(|s| s * s).sum();
    if energy < 1e-9 {
        return None;
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        let mut corr = 0.0f32;
        for i in 0..chunk.len() - lag {
            corr += chunk[i] * chunk[i + lag];
        }
        let corr = corr / energy;
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    // Weak peak = unvoiced / noise
    if best_corr < 0.3 || best_lag == 0 {
        return None;
    }
    Some(best_lag as f32)
}

/// Mean relative change between consecutive values. Needs >= 3 values.
pub fn relative_variation(values: &[f32]) -> Option<f32> {
    if values.len() < 3 {
        return None;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    if mean < 1e-9 {
        return None;
    }
    let total: f32 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(total / (values.len() - 1) as f32 / mean)
}

/// Geometric mean / arithmetic mean of chunk energies. 1.0 = perfectly flat
/// energy distribution, near 0 = highly peaked.
pub fn spectral_flatness(energies: &[f32]) -> Option<f32> {
    let positive: Vec<f32> = energies.iter().copied().filter(|e| *e > 1e-12).collect();
    if positive.len() < 2 {
        return None;
    }
    let n = positive.len() as f32;
    let log_mean = positive.iter().map(|e| e.ln()).sum::<f32>() / n;
    let arith_mean = positive.iter().sum::<f32>() / n;
    Some((log_mean.exp() / arith_mean).clamp(0.0, 1.0))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_empty_input_gives_default() {
        let features = extract_features(&[], 16_000, 1024, 1e-4);
        assert!(features.chunk_energy.is_empty());
        assert!(features.jitter.is_none());
        assert!(features.shimmer.is_none());
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_period_of_sine() {
        let samples = sine(100.0, 16_000, 0.2);
        let period = pitch_period(&samples[..2048], 16_000).unwrap();
        // 16000 / 100 = 160 samples per period
        assert!((period - 160.0).abs() < 8.0, "got period {}", period);
    }

    #[test]
    fn test_pitch_period_of_silence() {
        let samples = vec![0.0f32; 2048];
        assert!(pitch_period(&samples, 16_000).is_none());
    }

    #[test]
    fn test_pure_sine_has_low_jitter() {
        let samples = sine(120.0, 16_000, 1.0);
        let features = extract_features(&samples, 16_000, 2048, 1e-4);
        let jitter = features.jitter.expect("voiced signal should yield jitter");
        assert!(jitter < 0.05, "pure tone jitter should be tiny, got {}", jitter);
    }

    #[test]
    fn test_relative_variation() {
        assert!(relative_variation(&[1.0, 1.0]).is_none());
        let flat = relative_variation(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(flat, 0.0);
        let varied = relative_variation(&[1.0, 2.0, 1.0, 2.0]).unwrap();
        assert!(varied > 0.5);
    }

    #[test]
    fn test_spectral_flatness_bounds() {
        let flat = spectral_flatness(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!((flat - 1.0).abs() < 1e-5);
        let peaked = spectral_flatness(&[10.0, 0.001, 0.001, 0.001]).unwrap();
        assert!(peaked < 0.2);
    }

    #[test]
    fn test_silence_ratio() {
        let mut samples = vec![0.0f32; 4096];
        samples.extend(sine(100.0, 16_000, 0.256));
        let features = extract_features(&samples, 16_000, 1024, 1e-4);
        assert!(features.silence_ratio > 0.3);
        assert!(features.silence_ratio < 1.0);
    }
}
