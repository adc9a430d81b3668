//! Cross-extractor tests for the full frame-vector pipeline

use super::*;
use crate::media::{FaceBox, FaceObservation, LandmarkId, Point2, Point3, VideoFrame};
use std::collections::HashMap;

fn bare_frame() -> VideoFrame {
    VideoFrame {
        timestamp_ms: 0,
        width: 16,
        height: 16,
        pixels: vec![128u8; 16 * 16 * 4],
        face: None,
    }
}

fn face() -> FaceObservation {
    let mut landmarks = HashMap::new();
    landmarks.insert(LandmarkId::LeftEye, Point2::new(30.0, 50.0));
    landmarks.insert(LandmarkId::RightEye, Point2::new(65.0, 50.0));
    landmarks.insert(LandmarkId::NoseBase, Point2::new(47.5, 80.0));
    landmarks.insert(LandmarkId::MouthLeft, Point2::new(30.0, 105.0));
    landmarks.insert(LandmarkId::MouthRight, Point2::new(70.0, 105.0));
    FaceObservation {
        left_eye_open: Some(0.9),
        right_eye_open: Some(0.9),
        smile: Some(0.2),
        yaw: -12.0,
        pitch: 4.0,
        roll: 1.0,
        landmarks,
        mouth_contour: vec![
            Point2::new(30.0, 105.0),
            Point2::new(40.0, 102.0),
            Point2::new(50.0, 101.0),
            Point2::new(60.0, 102.0),
            Point2::new(70.0, 105.0),
        ],
        mesh: None,
        bounds: FaceBox {
            center_x: 50.0,
            center_y: 70.0,
            width: 100.0,
            height: 140.0,
        },
    }
}

#[test]
fn test_build_frame_vector_without_face() {
    let frame = bare_frame();
    let vector = build_frame_vector(&frame, None);
    assert!(vector.validate().is_ok());
    // Facial slots stay at the 0.0 absent-signal value
    assert_eq!(vector.get_by_name("inter_eye_ratio"), Some(0.0));
    assert_eq!(vector.get_by_name("mesh_area_cv"), Some(0.0));
}

#[test]
fn test_build_frame_vector_with_face() {
    let face = face();
    let mut frame = bare_frame();
    frame.face = Some(face.clone());

    let vector = build_frame_vector(&frame, Some(&face));
    assert!((vector.get_by_name("inter_eye_ratio").unwrap() - 0.35).abs() < 1e-4);
    assert!((vector.get_by_name("mouth_width_ratio").unwrap() - 0.40).abs() < 1e-4);
    assert_eq!(vector.get_by_name("pose_yaw_abs"), Some(12.0));
    assert_eq!(vector.get_by_name("pose_pitch_abs"), Some(4.0));
    // A real contour populates the contour slots
    assert!(vector.get_by_name("contour_smoothness").unwrap() >= 0.0);
}

#[test]
fn test_mesh_slots_populated_when_mesh_present() {
    let mut face = face();
    // Flat regular grid strip
    face.mesh = Some(
        (0..20)
            .map(|i| Point3 {
                x: (i % 5) as f32 * 10.0,
                y: (i / 5) as f32 * 10.0,
                z: 5.0 + (i % 3) as f32 * 0.1,
            })
            .collect(),
    );
    let mut frame = bare_frame();
    frame.face = Some(face.clone());

    let vector = build_frame_vector(&frame, Some(&face));
    assert!(vector.get_by_name("mesh_depth_jump_ratio").is_some());
}

#[test]
fn test_vector_layout_stable_across_inputs() {
    // Same layout hash regardless of which signals were available
    let bare = build_frame_vector(&bare_frame(), None);
    let face = face();
    let mut with_face = bare_frame();
    with_face.face = Some(face.clone());
    let full = build_frame_vector(&with_face, Some(&face));

    assert_eq!(bare.version, full.version);
    assert_eq!(bare.layout_hash, full.layout_hash);
    assert_eq!(bare.values.len(), full.values.len());
}
