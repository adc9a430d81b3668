//! Model Slots - Per-Capability Dispatch
//!
//! Each detection capability is a tagged variant: heuristic-only, or backed
//! by a loaded model. The variant is resolved once at startup - scoring code
//! never null-checks a handle. An absent or failing model contributes 0.0
//! for its capability and logs once; heuristics carry the detection.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::inference::{InferenceError, LoadedModel, ModelStatus};

// ============================================================================
// CAPABILITIES
// ============================================================================

/// The closed set of model-backed capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    FaceLandmark,
    FaceMesh,
    VisualArtifact,
    GanArtifact,
    AudioSynthesis,
    TextClassifier,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::FaceLandmark,
        Capability::FaceMesh,
        Capability::VisualArtifact,
        Capability::GanArtifact,
        Capability::AudioSynthesis,
        Capability::TextClassifier,
    ];

    /// Stable key used in model-score maps and the ensemble weight table
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::FaceLandmark => "face_landmark",
            Capability::FaceMesh => "face_mesh",
            Capability::VisualArtifact => "visual_artifact",
            Capability::GanArtifact => "gan_artifact",
            Capability::AudioSynthesis => "audio_synthesis",
            Capability::TextClassifier => "text_classifier",
        }
    }
}

// ============================================================================
// MODEL SLOT
// ============================================================================

/// Dispatch state for one capability, fixed at startup
#[derive(Debug)]
pub enum SlotBacking {
    /// No model available - heuristics only
    Heuristic,
    ModelBacked(LoadedModel),
}

/// One capability slot
#[derive(Debug)]
pub struct ModelSlot {
    capability: Capability,
    backing: SlotBacking,
    /// Degradation is logged once per slot, not once per frame
    warned: AtomicBool,
}

impl ModelSlot {
    pub fn heuristic(capability: Capability) -> Self {
        Self {
            capability,
            backing: SlotBacking::Heuristic,
            warned: AtomicBool::new(false),
        }
    }

    pub fn model_backed(capability: Capability, model: LoadedModel) -> Self {
        Self {
            capability,
            backing: SlotBacking::ModelBacked(model),
            warned: AtomicBool::new(false),
        }
    }

    /// Resolve a slot from an optional model path. Load failures degrade to
    /// heuristic-only and are logged here, once.
    pub fn resolve(capability: Capability, path: Option<&str>, input_len: usize) -> Self {
        match path {
            None => Self::heuristic(capability),
            Some(path) => match LoadedModel::from_file(path, input_len) {
                Ok(model) => Self::model_backed(capability, model),
                Err(e) => {
                    log::warn!(
                        "Model slot '{}' degraded to heuristic-only: {}",
                        capability.as_str(),
                        e
                    );
                    Self::heuristic(capability)
                }
            },
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self.backing, SlotBacking::ModelBacked(_))
    }

    pub fn status(&self) -> Option<ModelStatus> {
        match &self.backing {
            SlotBacking::Heuristic => None,
            SlotBacking::ModelBacked(model) => Some(model.status()),
        }
    }

    /// Score one input vector. Total: a heuristic-only slot or any inference
    /// failure yields 0.0 for this capability and the analysis continues.
    pub fn score(&self, input: &[f32]) -> f32 {
        match &self.backing {
            SlotBacking::Heuristic => 0.0,
            SlotBacking::ModelBacked(model) => match model.score(input) {
                Ok(score) => score,
                Err(e) => {
                    self.warn_once(&e);
                    0.0
                }
            },
        }
    }

    fn warn_once(&self, error: &InferenceError) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            log::warn!(
                "Model slot '{}' inference failing, contributing 0.0: {}",
                self.capability.as_str(),
                error
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
