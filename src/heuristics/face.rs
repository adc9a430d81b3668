//! Landmark-Proportion Check
//!
//! Compares facial proportion metrics against known anthropometric ranges.
//! Each out-of-range metric adds its configured increment; generated faces
//! drift outside these ranges far more often than camera footage does.

use crate::config::FaceProportionConfig;
use crate::features::landmarks::FaceGeometry;
use super::AnalyzerOutput;

/// Score one frame's facial proportions. Metrics that could not be computed
/// are skipped, not penalized.
pub fn analyze(geometry: &FaceGeometry, config: &FaceProportionConfig) -> AnalyzerOutput {
    let mut out = AnalyzerOutput::empty();
    let mut checked = 0usize;

    if let Some(ratio) = geometry.inter_eye_ratio {
        checked += 1;
        if ratio < config.inter_eye_min || ratio > config.inter_eye_max {
            out.flag(
                config.inter_eye_increment,
                format!(
                    "Inter-eye distance ratio {:.3} outside [{:.2}, {:.2}]",
                    ratio, config.inter_eye_min, config.inter_eye_max
                ),
            );
        }
    }

    if let Some(ratio) = geometry.nose_eye_ratio {
        checked += 1;
        if ratio < config.nose_eye_min || ratio > config.nose_eye_max {
            out.flag(
                config.nose_eye_increment,
                format!(
                    "Nose-to-eye distance ratio {:.3} outside [{:.2}, {:.2}]",
                    ratio, config.nose_eye_min, config.nose_eye_max
                ),
            );
        }
    }

    if let Some(ratio) = geometry.mouth_width_ratio {
        checked += 1;
        if ratio < config.mouth_width_min || ratio > config.mouth_width_max {
            out.flag(
                config.mouth_width_increment,
                format!(
                    "Mouth width ratio {:.3} outside [{:.2}, {:.2}]",
                    ratio, config.mouth_width_min, config.mouth_width_max
                ),
            );
        }
    }

    if let Some(tilt) = geometry.eye_tilt_deg {
        checked += 1;
        if tilt.abs() > config.eye_tilt_max_deg {
            out.flag(
                config.eye_tilt_increment,
                format!(
                    "Eye-level tilt {:.1} deg exceeds {:.1} deg",
                    tilt, config.eye_tilt_max_deg
                ),
            );
        }
    }

    for (name, third) in [
        ("upper", geometry.upper_third_ratio),
        ("middle", geometry.middle_third_ratio),
    ] {
        if let Some(ratio) = third {
            checked += 1;
            if ratio < config.facial_third_min || ratio > config.facial_third_max {
                out.flag(
                    config.facial_third_increment,
                    format!(
                        "Facial {} third {:.3} outside [{:.2}, {:.2}]",
                        name, ratio, config.facial_third_min, config.facial_third_max
                    ),
                );
            }
        }
    }

    // Confidence scales with how many metrics were actually checkable
    out.confidence = if checked == 0 {
        Some(0.0)
    } else {
        Some((checked as f32 / 6.0).min(1.0))
    };
    out
}

// ============================================================================
// TESTS
// ============================================================================
