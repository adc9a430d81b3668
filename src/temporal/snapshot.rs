//! Frame Snapshots
//!
//! The per-frame facial state retained by the temporal tracker. Snapshots
//! are created once per analyzed frame and owned exclusively by one
//! tracker's ring buffer.

use crate::media::{FaceObservation, LandmarkId, Point2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-frame facial state for temporal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub timestamp_ms: i64,
    /// Eye-openness probabilities; `None` when the detector could not tell
    pub left_eye_open: Option<f32>,
    pub right_eye_open: Option<f32>,
    pub smile: Option<f32>,
    /// Head pose Euler angles in degrees
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub landmarks: HashMap<LandmarkId, Point2>,
    pub face_width: f32,
    pub face_height: f32,
    pub face_center: Point2,
}

impl FrameSnapshot {
    pub fn from_observation(timestamp_ms: i64, face: &FaceObservation) -> Self {
        Self {
            timestamp_ms,
            left_eye_open: face.left_eye_open,
            right_eye_open: face.right_eye_open,
            smile: face.smile,
            yaw: face.yaw,
            pitch: face.pitch,
            roll: face.roll,
            landmarks: face.landmarks.clone(),
            face_width: face.bounds.width,
            face_height: face.bounds.height,
            face_center: Point2::new(face.bounds.center_x, face.bounds.center_y),
        }
    }

    /// Mean openness over whichever eyes reported, `None` when neither did
    pub fn eye_openness(&self) -> Option<f32> {
        match (self.left_eye_open, self.right_eye_open) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Bounding-box area
    pub fn face_area(&self) -> f32 {
        self.face_width * self.face_height
    }

    /// Width/height aspect ratio; `None` for degenerate boxes
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.face_height < 1e-6 {
            None
        } else {
            Some(self.face_width / self.face_height)
        }
    }

    /// Mean normalized landmark displacement against another snapshot
    pub fn displacement_from(&self, other: &FrameSnapshot) -> Option<f32> {
        let width = self.face_width.max(1e-6);
        let mut total = 0.0f32;
        let mut count = 0usize;
        for (id, p) in &self.landmarks {
            if let Some(q) = other.landmarks.get(id) {
                total += p.distance(q) / width;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(total / count as f32)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
