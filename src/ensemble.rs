//! Ensemble Fusion & Decision
//!
//! Pure functions combining per-capability heuristic and model scores into
//! one composite and a verdict. Fusion rule per capability: the model score
//! can only raise the heuristic floor, never lower it, so a badly calibrated
//! or absent model degrades the ensemble gracefully instead of masking a
//! heuristic detection.

use serde::{Deserialize, Serialize};

use crate::config::{DecisionConfig, EnsembleWeights};

// ============================================================================
// FUSION
// ============================================================================

/// Fuse one capability's heuristic and optional model score.
/// `None` means the slot is heuristic-only or degraded.
pub fn fuse(heuristic: f32, model: Option<f32>) -> f32 {
    match model {
        Some(m) => heuristic.max(m).clamp(0.0, 1.0),
        None => heuristic.clamp(0.0, 1.0),
    }
}

/// Fused [0,1] score per video ensemble channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoChannelScores {
    pub visual_artifact: f32,
    pub face_landmark: f32,
    pub face_mesh: f32,
    pub temporal: f32,
    pub gan_artifact: f32,
    pub av_sync: f32,
    pub voice_synthesis: f32,
}

/// Weighted video composite, rescaled by temporal coherence.
///
/// Low coherence amplifies the base score: scale runs from 0.7 at perfect
/// coherence to 1.0 at zero coherence, so frame-level evidence alone never
/// quite reaches the score that frame-level plus temporal evidence does.
pub fn video_composite(
    channels: &VideoChannelScores,
    weights: &EnsembleWeights,
    temporal_coherence: f32,
) -> f32 {
    let base = channels.visual_artifact * weights.visual_artifact
        + channels.face_landmark * weights.face_landmark
        + channels.face_mesh * weights.face_mesh
        + channels.temporal * weights.temporal
        + channels.gan_artifact * weights.gan_artifact
        + channels.av_sync * weights.av_sync
        + channels.voice_synthesis * weights.voice_synthesis;
    let scale = 0.7 + 0.3 * (1.0 - temporal_coherence.clamp(0.0, 1.0));
    (base * scale).clamp(0.0, 1.0)
}

// ============================================================================
// DECISION
// ============================================================================

/// Threshold decision with the human-review band
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Verdict {
    pub is_positive: bool,
    /// True when the composite landed within the band around the threshold
    pub requires_review: bool,
}

pub fn decide(composite: f32, threshold: f32, review_band: f32) -> Verdict {
    Verdict {
        is_positive: composite >= threshold,
        requires_review: (composite - threshold).abs() <= review_band,
    }
}

pub fn decide_video(composite: f32, decision: &DecisionConfig) -> Verdict {
    decide(composite, decision.video_positive, decision.review_band)
}

pub fn decide_text(composite: f32, decision: &DecisionConfig) -> Verdict {
    decide(composite, decision.text_positive, decision.review_band)
}

// ============================================================================
// TESTS
// ============================================================================
