//! Raw-Pixel Statistics
//!
//! Frame-level statistics that expose GAN synthesis and re-compression
//! artifacts without needing a face: high-frequency energy, 8x8 block
//! boundary discontinuity, and inter-channel correlation.

use crate::media::VideoFrame;
use serde::{Deserialize, Serialize};

/// Pixel statistics for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixelStats {
    /// Mean absolute horizontal luma gradient, normalized to [0,1]
    pub high_freq_energy: f32,
    /// Excess gradient at 8x8 block boundaries vs elsewhere, [0,1]
    pub block_artifact: f32,
    /// Mean absolute correlation between R/G and G/B channels, [0,1].
    /// Natural images correlate strongly; GAN output often decorrelates.
    pub channel_correlation: f32,
}

/// Compute pixel statistics. Malformed frames produce zeroed stats - the
/// malformed-input policy is applied upstream, this stays total.
pub fn extract_stats(frame: &VideoFrame) -> PixelStats {
    if frame.is_malformed() || frame.width < 9 || frame.height < 2 {
        return PixelStats::default();
    }

    let w = frame.width as usize;
    let h = frame.height as usize;
    let px = &frame.pixels;

    let luma = |x: usize, y: usize| -> f32 {
        let i = (y * w + x) * 4;
        // BT.601 luma from RGBA bytes
        0.299 * px[i] as f32 + 0.587 * px[i + 1] as f32 + 0.114 * px[i + 2] as f32
    };

    // Horizontal gradients, split into block-boundary and interior buckets
    let mut grad_sum = 0.0f64;
    let mut grad_n = 0u64;
    let mut boundary_sum = 0.0f64;
    let mut boundary_n = 0u64;
    let mut interior_sum = 0.0f64;
    let mut interior_n = 0u64;

    for y in 0..h {
        for x in 1..w {
            let g = (luma(x, y) - luma(x - 1, y)).abs() as f64;
            grad_sum += g;
            grad_n += 1;
            if x % 8 == 0 {
                boundary_sum += g;
                boundary_n += 1;
            } else {
                interior_sum += g;
                interior_n += 1;
            }
        }
    }

    let mean_grad = if grad_n > 0 { grad_sum / grad_n as f64 } else { 0.0 };
    // 255 is the max luma step; normalize into [0,1]
    let high_freq_energy = (mean_grad / 255.0) as f32;

    let block_artifact = if boundary_n > 0 && interior_n > 0 {
        let boundary_mean = boundary_sum / boundary_n as f64;
        let interior_mean = interior_sum / interior_n as f64;
        if boundary_mean > interior_mean && boundary_mean > 1e-9 {
            (((boundary_mean - interior_mean) / boundary_mean) as f32).clamp(0.0, 1.0)
        } else {
            0.0
        }
    } else {
        0.0
    };

    let channel_correlation = channel_corr(px, w * h);

    PixelStats {
        high_freq_energy,
        block_artifact,
        channel_correlation,
    }
}

/// Mean of |corr(R,G)| and |corr(G,B)| over all pixels
fn channel_corr(px: &[u8], pixel_count: usize) -> f32 {
    if pixel_count < 2 {
        return 0.0;
    }

    let mut r = Vec::with_capacity(pixel_count);
    let mut g = Vec::with_capacity(pixel_count);
    let mut b = Vec::with_capacity(pixel_count);
    for i in 0..pixel_count {
        r.push(px[i * 4] as f32);
        g.push(px[i * 4 + 1] as f32);
        b.push(px[i * 4 + 2] as f32);
    }

    let rg = pearson(&r, &g).unwrap_or(0.0).abs();
    let gb = pearson(&g, &b).unwrap_or(0.0).abs();
    (rg + gb) / 2.0
}

/// Pearson correlation of two equal-length series.
/// Returns `None` when either series has zero variance.
pub fn pearson(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let n = a.len() as f32;
    let mean_a = a.iter().sum::<f32>() / n;
    let mean_b = b.iter().sum::<f32>() / n;

    let mut cov = 0.0f32;
    let mut var_a = 0.0f32;
    let mut var_b = 0.0f32;
    for i in 0..a.len() {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < 1e-9 || var_b < 1e-9 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

// ============================================================================
// TESTS
// ============================================================================
