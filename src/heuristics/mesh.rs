//! Mesh Regularity / Depth / Symmetry Check
//!
//! Scores the 3D mesh metrics when mesh points are available. Face swaps
//! leave irregular triangulation, depth steps at the blend boundary and a
//! lopsided depth profile.

use crate::config::MeshConfig;
use crate::features::mesh::MeshMetrics;
use super::AnalyzerOutput;

/// Score one frame's mesh metrics. Frames without a usable mesh yield a
/// zero score with zero confidence, never an error.
pub fn analyze(metrics: &MeshMetrics, config: &MeshConfig) -> AnalyzerOutput {
    let mut out = AnalyzerOutput::empty();

    if metrics.area_cv.is_none()
        && metrics.depth_jump_ratio.is_none()
        && metrics.depth_asymmetry.is_none()
    {
        out.confidence = Some(0.0);
        return out;
    }

    if let Some(cv) = metrics.area_cv {
        if cv > config.area_cv_max {
            out.flag(
                config.area_cv_increment,
                format!(
                    "Irregular mesh triangulation: area CV {:.2} exceeds {:.1}",
                    cv, config.area_cv_max
                ),
            );
        }
    }

    if let Some(ratio) = metrics.depth_jump_ratio {
        if ratio > config.depth_discontinuity_max {
            out.flag(
                config.depth_discontinuity_increment,
                format!(
                    "Surface depth discontinuities: {:.0}% of adjacent points jump (limit {:.0}%)",
                    ratio * 100.0,
                    config.depth_discontinuity_max * 100.0
                ),
            );
        }
    }

    if let Some(asym) = metrics.depth_asymmetry {
        if asym > config.depth_asymmetry_max {
            out.flag(
                config.depth_asymmetry_increment,
                format!(
                    "Left/right depth profile divergence {:.2} exceeds {:.2}",
                    asym, config.depth_asymmetry_max
                ),
            );
        }
    }

    out.confidence = Some(0.8);
    out
}

// ============================================================================
// TESTS
// ============================================================================
