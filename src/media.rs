//! Media Boundary Types
//!
//! Input contracts consumed from collaborators: decoded frame buffers with
//! optional platform face observations, mono PCM audio, and raw text.
//! Absence is always explicit (`Option`), never a sentinel value - an absent
//! audio track must be distinguishable from a silent one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// VIDEO
// ============================================================================

/// One decoded video frame (fixed RGBA8 pixel format, already downscaled),
/// plus whatever the platform face detector reported for it.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub timestamp_ms: i64,
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major, width * height * 4 bytes
    pub pixels: Vec<u8>,
    /// Platform face-detection output for this frame, if a face was found
    pub face: Option<FaceObservation>,
}

impl VideoFrame {
    /// Zero-byte or zero-dimension frames are malformed input, not errors.
    pub fn is_malformed(&self) -> bool {
        self.width == 0
            || self.height == 0
            || self.pixels.len() != (self.width * self.height * 4) as usize
    }
}

/// Named 2D point in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// 3D mesh point (z = depth relative to the face plane)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Landmark identifiers reported by the platform face detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkId {
    LeftEye,
    RightEye,
    NoseBase,
    MouthLeft,
    MouthRight,
    MouthBottom,
    LeftCheek,
    RightCheek,
    LeftEar,
    RightEar,
    ChinBottom,
    ForeheadTop,
}

/// Face bounding box in frame coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceBox {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Per-frame face detector output.
///
/// Eye-openness probabilities are `Option` rather than the platform's `-1.0`
/// "unavailable" sentinel; conversion back to a sentinel happens only at a
/// specific model's tensor boundary if that model requires it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub left_eye_open: Option<f32>,
    pub right_eye_open: Option<f32>,
    pub smile: Option<f32>,
    /// Head pose Euler angles in degrees: yaw, pitch, roll
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub landmarks: HashMap<LandmarkId, Point2>,
    /// Lip/mouth contour points, ordered along the contour
    pub mouth_contour: Vec<Point2>,
    /// Dense 3D mesh points when the mesh detector ran
    pub mesh: Option<Vec<Point3>>,
    pub bounds: FaceBox,
}

impl FaceObservation {
    pub fn landmark(&self, id: LandmarkId) -> Option<Point2> {
        self.landmarks.get(&id).copied()
    }
}

// ============================================================================
// AUDIO
// ============================================================================

/// Decoded mono PCM audio. Callers pass `Option<AudioTrack>`; `None` means
/// the media item has no audio track at all.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioTrack {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() || self.sample_rate == 0
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Raw text input for scam scans, with optional sender context from the
/// messaging layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMessage {
    pub body: String,
    pub sender: Option<SenderContext>,
}

impl TextMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            sender: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Sender metadata supplied by the messaging layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderContext {
    /// Phone number / address / account id as the platform reports it
    pub address: Option<String>,
    /// True when the sender is in the user's contacts
    pub known_contact: bool,
    /// Free-form platform attributes (carrier hints, channel, etc.)
    pub attributes: HashMap<String, String>,
}

// ============================================================================
// TESTS
// ============================================================================
