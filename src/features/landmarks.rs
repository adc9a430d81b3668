//! Facial Geometry Extraction
//!
//! Pure functions turning named landmark positions into the proportion
//! metrics checked by the face heuristics. Metrics that cannot be computed
//! from the available landmarks are `None`, never a guessed value.

use crate::media::{FaceObservation, LandmarkId};
use serde::{Deserialize, Serialize};

/// Proportion metrics derived from one frame's landmarks.
/// All ratios are normalized by face width/height so they are scale-free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceGeometry {
    /// inter-eye distance / face width
    pub inter_eye_ratio: Option<f32>,
    /// nose-base distance below the eye line / inter-eye distance
    pub nose_eye_ratio: Option<f32>,
    /// mouth width / face width
    pub mouth_width_ratio: Option<f32>,
    /// eye-level tilt in degrees (0 = level)
    pub eye_tilt_deg: Option<f32>,
    /// upper facial third (forehead-to-eyes) / face height
    pub upper_third_ratio: Option<f32>,
    /// middle facial third (eyes-to-nose) / face height
    pub middle_third_ratio: Option<f32>,
}

/// Extract proportion metrics from a face observation
pub fn extract_geometry(face: &FaceObservation) -> FaceGeometry {
    let width = face.bounds.width.max(1e-6);
    let height = face.bounds.height.max(1e-6);

    let left_eye = face.landmark(LandmarkId::LeftEye);
    let right_eye = face.landmark(LandmarkId::RightEye);
    let nose = face.landmark(LandmarkId::NoseBase);
    let mouth_left = face.landmark(LandmarkId::MouthLeft);
    let mouth_right = face.landmark(LandmarkId::MouthRight);
    let forehead = face.landmark(LandmarkId::ForeheadTop);

    let inter_eye = match (left_eye, right_eye) {
        (Some(l), Some(r)) => Some(l.distance(&r)),
        _ => None,
    };

    let inter_eye_ratio = inter_eye.map(|d| d / width);

    let eye_tilt_deg = match (left_eye, right_eye) {
        (Some(l), Some(r)) => {
            let dx = r.x - l.x;
            let dy = r.y - l.y;
            if dx.abs() < 1e-6 {
                None
            } else {
                Some((dy / dx).atan().to_degrees())
            }
        }
        _ => None,
    };

    let eye_line_y = match (left_eye, right_eye) {
        (Some(l), Some(r)) => Some((l.y + r.y) / 2.0),
        _ => None,
    };

    let nose_eye_ratio = match (nose, eye_line_y, inter_eye) {
        (Some(n), Some(ey), Some(ie)) if ie > 1e-6 => Some((n.y - ey).abs() / ie),
        _ => None,
    };

    let mouth_width_ratio = match (mouth_left, mouth_right) {
        (Some(l), Some(r)) => Some(l.distance(&r) / width),
        _ => None,
    };

    // Facial thirds: forehead -> eye line -> nose base, each over face height
    let upper_third_ratio = match (forehead, eye_line_y) {
        (Some(f), Some(ey)) => Some((ey - f.y).abs() / height),
        _ => None,
    };
    let middle_third_ratio = match (eye_line_y, nose) {
        (Some(ey), Some(n)) => Some((n.y - ey).abs() / height),
        _ => None,
    };

    FaceGeometry {
        inter_eye_ratio,
        nose_eye_ratio,
        mouth_width_ratio,
        eye_tilt_deg,
        upper_third_ratio,
        middle_third_ratio,
    }
}

// ============================================================================
// TESTS
// ============================================================================
