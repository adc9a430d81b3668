//! Contour Metrics
//!
//! Smoothness and symmetry of the lip/mouth contour. Generated mouths tend
//! to show jagged turning angles and left/right asymmetry that real
//! articulation does not.

use crate::media::Point2;

/// Mean turning angle between consecutive contour segments, normalized by PI.
/// 0.0 = perfectly straight, 1.0 = full reversals at every point.
/// Needs at least 3 points; returns `None` otherwise.
pub fn smoothness(contour: &[Point2]) -> Option<f32> {
    if contour.len() < 3 {
        return None;
    }

    let mut total_turn = 0.0f32;
    let mut count = 0usize;

    for window in contour.windows(3) {
        let (a, b, c) = (window[0], window[1], window[2]);
        let v1 = (b.x - a.x, b.y - a.y);
        let v2 = (c.x - b.x, c.y - b.y);

        let len1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        let len2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
        if len1 < 1e-6 || len2 < 1e-6 {
            continue;
        }

        let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (len1 * len2)).clamp(-1.0, 1.0);
        total_turn += cos.acos();
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(total_turn / count as f32 / std::f32::consts::PI)
}

/// Left/right symmetry divergence of a contour around its vertical midline.
/// Mirrors the right half onto the left and measures mean vertical deviation,
/// normalized by contour width. 0.0 = perfectly symmetric.
pub fn asymmetry(contour: &[Point2]) -> Option<f32> {
    if contour.len() < 4 {
        return None;
    }

    let min_x = contour.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = contour.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let width = max_x - min_x;
    if width < 1e-6 {
        return None;
    }
    let mid_x = (min_x + max_x) / 2.0;

    let left: Vec<&Point2> = contour.iter().filter(|p| p.x <= mid_x).collect();
    let right: Vec<&Point2> = contour.iter().filter(|p| p.x > mid_x).collect();
    if left.is_empty() || right.is_empty() {
        return None;
    }

    // For each left point, compare against the closest mirrored right point
    let mut total_dev = 0.0f32;
    let mut count = 0usize;

    for lp in &left {
        let mirrored_x = 2.0 * mid_x - lp.x;
        let closest = right.iter().min_by(|a, b| {
            let da = (a.x - mirrored_x).abs();
            let db = (b.x - mirrored_x).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(rp) = closest {
            total_dev += (lp.y - rp.y).abs() / width;
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(total_dev / count as f32)
}

/// Vertical mouth opening: contour height / contour width.
/// Drives the audio-visual sync correlation.
pub fn opening_ratio(contour: &[Point2]) -> Option<f32> {
    if contour.len() < 3 {
        return None;
    }

    let min_x = contour.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = contour.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = contour.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = contour.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

    let width = max_x - min_x;
    if width < 1e-6 {
        return None;
    }
    Some((max_y - min_y) / width)
}

// ============================================================================
// TESTS
// ============================================================================
