//! Model Registry
//!
//! Resolves the closed slot set once at engine construction and serves
//! scoring calls afterwards. Per-capability input lengths are part of the
//! model contract.

use std::collections::HashMap;

use crate::config::ModelPaths;
use crate::features::FEATURE_COUNT;

use super::inference::ModelStatus;
use super::slot::{Capability, ModelSlot};

/// Input length for the audio-synthesis model: summary stats per buffer
pub const AUDIO_INPUT_LEN: usize = 8;

/// Input length for the text-classifier model: lexical summary vector
pub const TEXT_INPUT_LEN: usize = 8;

/// All resolved slots, fixed for the registry's lifetime
pub struct ModelRegistry {
    slots: HashMap<Capability, ModelSlot>,
}

impl ModelRegistry {
    /// Resolve every capability slot from the configured paths.
    /// Missing or corrupt models degrade to heuristic-only here, once.
    pub fn resolve(paths: &ModelPaths) -> Self {
        let mut slots = HashMap::new();

        let entries: [(Capability, Option<&String>, usize); 6] = [
            (Capability::FaceLandmark, paths.face_landmark.as_ref(), FEATURE_COUNT),
            (Capability::FaceMesh, paths.face_mesh.as_ref(), FEATURE_COUNT),
            (Capability::VisualArtifact, paths.visual_artifact.as_ref(), FEATURE_COUNT),
            (Capability::GanArtifact, paths.gan_artifact.as_ref(), FEATURE_COUNT),
            (Capability::AudioSynthesis, paths.audio_synthesis.as_ref(), AUDIO_INPUT_LEN),
            (Capability::TextClassifier, paths.text_classifier.as_ref(), TEXT_INPUT_LEN),
        ];

        for (capability, path, input_len) in entries {
            let slot = ModelSlot::resolve(capability, path.map(String::as_str), input_len);
            slots.insert(capability, slot);
        }

        let backed = slots.values().filter(|s| s.is_model_backed()).count();
        log::info!(
            "Model registry resolved: {}/{} slots model-backed",
            backed,
            slots.len()
        );

        Self { slots }
    }

    /// Heuristic-only registry (no models configured)
    pub fn heuristic_only() -> Self {
        Self::resolve(&ModelPaths::default())
    }

    /// Score one capability. Unknown/degraded slots contribute 0.0.
    pub fn score(&self, capability: Capability, input: &[f32]) -> f32 {
        self.slots
            .get(&capability)
            .map(|slot| slot.score(input))
            .unwrap_or(0.0)
    }

    pub fn is_model_backed(&self, capability: Capability) -> bool {
        self.slots
            .get(&capability)
            .map(|slot| slot.is_model_backed())
            .unwrap_or(false)
    }

    /// Status of every model-backed slot, keyed by capability name
    pub fn statuses(&self) -> HashMap<String, ModelStatus> {
        self.slots
            .iter()
            .filter_map(|(cap, slot)| slot.status().map(|s| (cap.as_str().to_string(), s)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_only_registry() {
        let registry = ModelRegistry::heuristic_only();
        for capability in Capability::ALL {
            assert!(!registry.is_model_backed(capability));
            assert_eq!(registry.score(capability, &[0.5; FEATURE_COUNT]), 0.0);
        }
        assert!(registry.statuses().is_empty());
    }

    #[test]
    fn test_bad_paths_degrade_all() {
        let paths = ModelPaths {
            face_landmark: Some("/missing/a.onnx".to_string()),
            gan_artifact: Some("/missing/b.onnx".to_string()),
            ..Default::default()
        };
        let registry = ModelRegistry::resolve(&paths);
        assert!(!registry.is_model_backed(Capability::FaceLandmark));
        assert!(!registry.is_model_backed(Capability::GanArtifact));
    }
}
