//! Feature Layout - Model Input Schema
//!
//! **This file controls the model-input feature schema.**
//!
//! Rules (never break these):
//! 1. Add feature -> increment FEATURE_VERSION
//! 2. Change order -> increment FEATURE_VERSION
//! 3. Remove feature -> increment FEATURE_VERSION
//!
//! Model slots are trained against a specific layout; the hash lets a slot
//! reject input from a mismatched build instead of silently mis-scoring.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact vector order. Single source of truth.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Facial geometry (0-5) ===
    "inter_eye_ratio",        // 0: inter-eye distance / face width
    "nose_eye_ratio",         // 1: nose-to-eye-line distance / inter-eye distance
    "mouth_width_ratio",      // 2: mouth width / face width
    "eye_tilt_deg",           // 3: eye-level tilt in degrees
    "upper_third_ratio",      // 4: upper facial third / face height
    "middle_third_ratio",     // 5: middle facial third / face height

    // === Contour (6-7) ===
    "contour_smoothness",     // 6: mean turning angle / PI along the mouth contour
    "contour_asymmetry",      // 7: left/right contour divergence

    // === 3D mesh (8-10) ===
    "mesh_area_cv",           // 8: coefficient of variation of triangle areas
    "mesh_depth_jump_ratio",  // 9: depth discontinuity ratio
    "mesh_depth_asymmetry",   // 10: left/right depth-profile divergence

    // === Pixel statistics (11-13) ===
    "pixel_high_freq",        // 11: high-frequency energy estimate
    "pixel_block_artifact",   // 12: 8x8 block-boundary discontinuity
    "pixel_channel_corr",     // 13: inter-channel correlation

    // === Head pose (14-15) ===
    "pose_yaw_abs",           // 14: absolute yaw in degrees
    "pose_pitch_abs",         // 15: absolute pitch in degrees
];

/// Total number of features. Must match FEATURE_LAYOUT.len().
pub const FEATURE_COUNT: usize = 16;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash of the layout, used to detect mismatches at runtime
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a model expects a different feature layout
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches the current layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let current = layout_hash();
    if version != FEATURE_VERSION || hash != current {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current,
            actual_version: version,
            actual_hash: hash,
        });
    }
    Ok(())
}

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned model-input vector with layout metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.values.get(i).copied())
    }

    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        if let Some(index) = feature_index(name) {
            self.values[index] = value;
            true
        } else {
            false
        }
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
