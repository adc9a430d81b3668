//! 3D Mesh Metrics
//!
//! Regularity, depth continuity and symmetry of the dense face mesh when the
//! platform mesh detector ran. Face swaps tend to leave an irregular
//! triangulation, depth steps at the blend boundary, and a depth profile
//! that differs between face halves.

use crate::media::Point3;
use serde::{Deserialize, Serialize};

/// Mesh-derived metrics for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshMetrics {
    /// Coefficient of variation of triangle areas
    pub area_cv: Option<f32>,
    /// Fraction of adjacent point pairs with a large depth step
    pub depth_jump_ratio: Option<f32>,
    /// Divergence of the left vs right mean depth profile
    pub depth_asymmetry: Option<f32>,
}

/// Minimum points for meaningful mesh analysis
const MIN_MESH_POINTS: usize = 12;

/// Depth step (relative to mean |z|) counted as a discontinuity
const DEPTH_JUMP_FACTOR: f32 = 0.5;

/// Compute all mesh metrics. Points are assumed to be in detector order,
/// which places neighboring surface points adjacently.
pub fn extract_metrics(points: &[Point3]) -> MeshMetrics {
    if points.len() < MIN_MESH_POINTS {
        return MeshMetrics::default();
    }

    MeshMetrics {
        area_cv: triangle_area_cv(points),
        depth_jump_ratio: depth_jump_ratio(points),
        depth_asymmetry: depth_asymmetry(points),
    }
}

/// Coefficient of variation (stddev / mean) of consecutive-triple triangle
/// areas. A regular surface mesh keeps triangle sizes comparable.
pub fn triangle_area_cv(points: &[Point3]) -> Option<f32> {
    if points.len() < 3 {
        return None;
    }

    let areas: Vec<f32> = points
        .windows(3)
        .map(|w| triangle_area(&w[0], &w[1], &w[2]))
        .filter(|a| *a > 1e-9)
        .collect();

    if areas.len() < 4 {
        return None;
    }

    let mean = areas.iter().sum::<f32>() / areas.len() as f32;
    if mean < 1e-9 {
        return None;
    }
    let variance = areas.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / areas.len() as f32;
    Some(variance.sqrt() / mean)
}

/// Fraction of adjacent point pairs whose depth step exceeds
/// DEPTH_JUMP_FACTOR x mean absolute depth.
pub fn depth_jump_ratio(points: &[Point3]) -> Option<f32> {
    if points.len() < 2 {
        return None;
    }

    let mean_abs_z =
        points.iter().map(|p| p.z.abs()).sum::<f32>() / points.len() as f32;
    let threshold = (mean_abs_z * DEPTH_JUMP_FACTOR).max(1e-6);

    let jumps = points
        .windows(2)
        .filter(|w| (w[1].z - w[0].z).abs() > threshold)
        .count();

    Some(jumps as f32 / (points.len() - 1) as f32)
}

/// Divergence of mean depth between the left and right face halves,
/// normalized by overall mean absolute depth.
pub fn depth_asymmetry(points: &[Point3]) -> Option<f32> {
    if points.len() < 4 {
        return None;
    }

    let mid_x = points.iter().map(|p| p.x).sum::<f32>() / points.len() as f32;

    let (mut left_sum, mut left_n) = (0.0f32, 0usize);
    let (mut right_sum, mut right_n) = (0.0f32, 0usize);
    for p in points {
        if p.x <= mid_x {
            left_sum += p.z;
            left_n += 1;
        } else {
            right_sum += p.z;
            right_n += 1;
        }
    }
    if left_n == 0 || right_n == 0 {
        return None;
    }

    let left_mean = left_sum / left_n as f32;
    let right_mean = right_sum / right_n as f32;
    let overall = points.iter().map(|p| p.z.abs()).sum::<f32>() / points.len() as f32;
    if overall < 1e-6 {
        return Some(0.0);
    }
    Some((left_mean - right_mean).abs() / overall)
}

fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f32 {
    // Cross product magnitude / 2
    let ab = (b.x - a.x, b.y - a.y, b.z - a.z);
    let ac = (c.x - a.x, c.y - a.y, c.z - a.z);
    let cross = (
        ab.1 * ac.2 - ab.2 * ac.1,
        ab.2 * ac.0 - ab.0 * ac.2,
        ab.0 * ac.1 - ab.1 * ac.0,
    );
    (cross.0 * cross.0 + cross.1 * cross.1 + cross.2 * cross.2).sqrt() / 2.0
}

// ============================================================================
// TESTS
// ============================================================================
