//! Engine Configuration - Thresholds & Weights
//!
//! Every empirical cutoff used by the analyzers lives here, not as scattered
//! literals. The defaults are the tuned production values; they are exposed
//! as config so sensitivity can be adjusted without code changes.

use serde::{Deserialize, Serialize};

// ============================================================================
// DECISION THRESHOLDS (Constants - the tuned defaults)
// ============================================================================

/// Video composite above this = positive detection
pub const VIDEO_POSITIVE_THRESHOLD: f32 = 0.50;

/// Text composite above this = positive detection
///
/// Text scams are cheap to act on; video forensics must minimize false
/// accusation, hence the lower video bar but wider human-review band.
pub const TEXT_POSITIVE_THRESHOLD: f32 = 0.60;

/// Scores within +/- this band of the threshold require human review
pub const REVIEW_BAND: f32 = 0.10;

/// Fixed moderate score (0-100) for malformed/unparseable input
pub const MALFORMED_INPUT_SCORE: f32 = 50.0;

// ============================================================================
// CONFIG STRUCTS
// ============================================================================

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub decision: DecisionConfig,
    pub ensemble: EnsembleWeights,
    pub face: FaceProportionConfig,
    pub contour: ContourConfig,
    pub mesh: MeshConfig,
    pub visual: VisualConfig,
    pub temporal: TemporalConfig,
    pub voice: VoiceConfig,
    pub text: TextConfig,
    pub learning: LearningConfig,
    pub models: ModelPaths,
}

impl EngineConfig {
    /// High sensitivity - lower decision thresholds, more alerts
    pub fn high_sensitivity() -> Self {
        Self {
            decision: DecisionConfig {
                video_positive: 0.40,
                text_positive: 0.50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Low sensitivity - higher decision thresholds, fewer alerts
    pub fn low_sensitivity() -> Self {
        Self {
            decision: DecisionConfig {
                video_positive: 0.60,
                text_positive: 0.70,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Decision boundaries per modality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub video_positive: f32,
    pub text_positive: f32,
    /// +/- band around the threshold flagged "requires human review"
    pub review_band: f32,
    /// Score (0-100) assigned to malformed but non-crashing input
    pub malformed_input_score: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            video_positive: VIDEO_POSITIVE_THRESHOLD,
            text_positive: TEXT_POSITIVE_THRESHOLD,
            review_band: REVIEW_BAND,
            malformed_input_score: MALFORMED_INPUT_SCORE,
        }
    }
}

/// Fixed linear-combination weights for the video ensemble.
/// Must sum to 1.0 - `validate()` checks this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub visual_artifact: f32,
    pub face_landmark: f32,
    pub face_mesh: f32,
    pub temporal: f32,
    pub gan_artifact: f32,
    pub av_sync: f32,
    pub voice_synthesis: f32,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            visual_artifact: 0.18,
            face_landmark: 0.18,
            face_mesh: 0.14,
            temporal: 0.12,
            gan_artifact: 0.10,
            av_sync: 0.10,
            voice_synthesis: 0.18,
        }
    }
}

impl EnsembleWeights {
    pub fn sum(&self) -> f32 {
        self.visual_artifact
            + self.face_landmark
            + self.face_mesh
            + self.temporal
            + self.gan_artifact
            + self.av_sync
            + self.voice_synthesis
    }

    pub fn validate(&self) -> Result<(), String> {
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(format!("ensemble weights sum to {:.4}, expected 1.0", sum));
        }
        Ok(())
    }
}

/// Anthropometric ranges for the landmark-proportion check.
/// Each out-of-range metric adds its increment to the anomaly score, cap 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceProportionConfig {
    /// inter-eye distance / face width
    pub inter_eye_min: f32,
    pub inter_eye_max: f32,
    pub inter_eye_increment: f32,

    /// nose-to-eye-line distance / inter-eye distance
    pub nose_eye_min: f32,
    pub nose_eye_max: f32,
    pub nose_eye_increment: f32,

    /// mouth width / face width
    pub mouth_width_min: f32,
    pub mouth_width_max: f32,
    pub mouth_width_increment: f32,

    /// absolute eye-level tilt (degrees)
    pub eye_tilt_max_deg: f32,
    pub eye_tilt_increment: f32,

    /// each facial third as a fraction of face height
    pub facial_third_min: f32,
    pub facial_third_max: f32,
    pub facial_third_increment: f32,
}

impl Default for FaceProportionConfig {
    fn default() -> Self {
        Self {
            inter_eye_min: 0.28,
            inter_eye_max: 0.42,
            inter_eye_increment: 0.25,
            nose_eye_min: 0.55,
            nose_eye_max: 1.00,
            nose_eye_increment: 0.20,
            mouth_width_min: 0.32,
            mouth_width_max: 0.58,
            mouth_width_increment: 0.20,
            eye_tilt_max_deg: 6.0,
            eye_tilt_increment: 0.15,
            facial_third_min: 0.24,
            facial_third_max: 0.42,
            facial_third_increment: 0.30,
        }
    }
}

/// Lip/mouth contour naturalness thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourConfig {
    /// mean turning angle / PI above this = jagged contour
    pub jagged_threshold: f32,
    pub jagged_increment: f32,
    /// left/right divergence above this = asymmetric contour
    pub asymmetry_threshold: f32,
    pub asymmetry_increment: f32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            jagged_threshold: 0.3,
            jagged_increment: 0.35,
            asymmetry_threshold: 0.35,
            asymmetry_increment: 0.30,
        }
    }
}

/// 3D mesh regularity / depth thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// coefficient of variation of triangle areas above this = irregular
    pub area_cv_max: f32,
    pub area_cv_increment: f32,
    /// depth (z) discontinuity ratio above this = surface artifacts
    pub depth_discontinuity_max: f32,
    pub depth_discontinuity_increment: f32,
    /// left/right depth-profile divergence above this = asymmetric surface
    pub depth_asymmetry_max: f32,
    pub depth_asymmetry_increment: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            area_cv_max: 2.0,
            area_cv_increment: 0.35,
            depth_discontinuity_max: 0.15,
            depth_discontinuity_increment: 0.35,
            depth_asymmetry_max: 0.25,
            depth_asymmetry_increment: 0.30,
        }
    }
}

/// Pixel-statistics artifact thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Natural footage keeps channel correlation above this
    pub channel_corr_min: f32,
    /// Block-boundary excess above this flags re-compression seams
    pub block_artifact_max: f32,
    /// High-frequency energy below this = over-smoothed (GAN denoiser look)
    pub high_freq_min: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            channel_corr_min: 0.55,
            block_artifact_max: 0.45,
            high_freq_min: 0.004,
        }
    }
}

/// Temporal tracker window and sub-analysis thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Ring buffer capacity (frames)
    pub capacity: usize,
    /// Minimum frames before analyze() produces sub-scores
    pub min_frames: usize,

    // Blink analysis
    /// Eye-openness below this counts as closed
    pub eye_open_threshold: f32,
    /// Zero blinks over a span longer than this (ms) is flagged
    pub no_blink_span_ms: i64,
    /// Blinks per minute above this is flagged
    pub max_blink_rate: f32,
    /// Fraction of one-eye-only blinks above this is flagged
    pub asymmetric_blink_ratio: f32,
    /// Blink-interval coefficient of variation below this = too regular
    pub blink_interval_cv_min: f32,

    // Landmark jitter
    /// High-frequency jitter: displacement stddev above this...
    pub jitter_stddev_max: f32,
    /// ...while mean displacement stays below this
    pub jitter_mean_max: f32,
    /// Mean frame-to-frame acceleration above this = jerky motion
    pub accel_mean_max: f32,
    /// Fraction of oscillating consecutive triples above this is flagged
    pub oscillation_ratio_max: f32,

    // Head pose
    /// Per-axis frame-to-frame delta limits (degrees): yaw, pitch, roll
    pub pose_delta_max_deg: [f32; 3],
    /// Fraction of frames allowed to exceed the delta limits
    pub pose_violation_ratio: f32,
    /// Pose-angle jitter stddev above this (degrees) is flagged
    pub pose_stddev_max_deg: f32,
    /// Zero pose variance over more than this many frames is flagged
    pub pose_frozen_frames: usize,

    // Eye-mouth coordination
    /// Smile-probability range above this with flat eye response is flagged
    pub smile_range_min: f32,
    /// Eye/smile correlation above this is anomalously coupled
    pub coordination_corr_max: f32,

    // Face shape stability
    /// Aspect-ratio coefficient of variation above this is flagged
    pub aspect_cv_max: f32,
    /// Frame-to-frame area change above this fraction counts as sudden
    pub area_jump_fraction: f32,
    /// More than this many sudden area changes is flagged
    pub area_jump_count_max: usize,

    /// Sub-score weights: blink, jitter, pose, coordination, shape
    pub sub_weights: [f32; 5],
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            capacity: 30,
            min_frames: 5,
            eye_open_threshold: 0.4,
            no_blink_span_ms: 5_000,
            max_blink_rate: 40.0,
            asymmetric_blink_ratio: 0.15,
            blink_interval_cv_min: 0.15,
            jitter_stddev_max: 0.02,
            jitter_mean_max: 0.05,
            accel_mean_max: 0.015,
            oscillation_ratio_max: 0.40,
            pose_delta_max_deg: [15.0, 12.0, 10.0],
            pose_violation_ratio: 0.10,
            pose_stddev_max_deg: 3.0,
            pose_frozen_frames: 10,
            smile_range_min: 0.3,
            coordination_corr_max: 0.7,
            aspect_cv_max: 0.08,
            area_jump_fraction: 0.20,
            area_jump_count_max: 2,
            sub_weights: [0.25, 0.25, 0.20, 0.15, 0.15],
        }
    }
}

/// Voice-clone heuristic thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Analysis chunk size in samples
    pub chunk_size: usize,
    /// Pitch-period jitter below this = unnaturally stable (synthetic)
    pub jitter_min: f32,
    /// Amplitude shimmer below this = unnaturally stable (synthetic)
    pub shimmer_min: f32,
    /// Spectral flatness proxy above this = over-smooth spectrum
    pub flatness_max: f32,
    /// RMS below this counts the chunk as silence
    pub silence_rms: f32,
    /// Accumulated anomaly score above this = clone verdict
    pub clone_threshold: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            jitter_min: 0.005,
            shimmer_min: 0.02,
            flatness_max: 0.75,
            silence_rms: 1e-4,
            clone_threshold: 0.5,
        }
    }
}

/// Text scam heuristic tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Urgency score = matched keywords / this normalizer, capped at 1.0
    pub urgency_normalizer: f32,
    /// Score multiplier when the sender is in the user's contacts.
    /// Known senders can still be compromised, so this dampens rather
    /// than whitelists.
    pub known_contact_dampening: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            urgency_normalizer: 3.0,
            known_contact_dampening: 0.6,
        }
    }
}

/// Adaptive learning engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Feedback history cap (FIFO eviction)
    pub feedback_cap: usize,
    /// Discovered-pattern store cap (FIFO eviction)
    pub discovered_cap: usize,
    /// Weight lower bound
    pub weight_min: f32,
    /// Weight span above the lower bound (max = min + span)
    pub weight_span: f32,
    /// Sigmoid gain applied to (accuracy - penalty * fpr)
    pub sigmoid_gain: f32,
    /// False positives are penalized this many times harder than accuracy rewards
    pub false_positive_penalty: f32,
    /// Pseudo sample count given to seeded patterns
    pub seed_pseudo_samples: f32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            feedback_cap: 10_000,
            discovered_cap: 5_000,
            weight_min: 0.1,
            weight_span: 1.4,
            sigmoid_gain: 5.0,
            false_positive_penalty: 2.0,
            seed_pseudo_samples: 10.0,
        }
    }
}

/// Optional on-disk model locations, one per capability slot.
/// `None` means the slot runs heuristic-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPaths {
    pub face_landmark: Option<String>,
    pub face_mesh: Option<String>,
    pub visual_artifact: Option<String>,
    pub gan_artifact: Option<String>,
    pub audio_synthesis: Option<String>,
    pub text_classifier: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================
