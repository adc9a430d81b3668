//! Feature Extractors
//!
//! Pure, stateless functions turning frames, PCM buffers and text into
//! numeric descriptors. No thresholds live here - scoring belongs to
//! `heuristics` and fusion to `ensemble`.

pub mod audio;
pub mod contour;
pub mod landmarks;
pub mod layout;
pub mod mesh;
pub mod pixels;
pub mod text;

pub use layout::{FeatureVector, FEATURE_COUNT, FEATURE_VERSION};

use crate::media::{FaceObservation, VideoFrame};

/// Build the versioned model-input vector for one frame.
/// Missing signals stay at 0.0 - slots trained on this layout expect that.
pub fn build_frame_vector(frame: &VideoFrame, face: Option<&FaceObservation>) -> FeatureVector {
    let mut vector = FeatureVector::new();

    let stats = pixels::extract_stats(frame);
    vector.set_by_name("pixel_high_freq", stats.high_freq_energy);
    vector.set_by_name("pixel_block_artifact", stats.block_artifact);
    vector.set_by_name("pixel_channel_corr", stats.channel_correlation);

    if let Some(face) = face {
        let geom = landmarks::extract_geometry(face);
        if let Some(v) = geom.inter_eye_ratio {
            vector.set_by_name("inter_eye_ratio", v);
        }
        if let Some(v) = geom.nose_eye_ratio {
            vector.set_by_name("nose_eye_ratio", v);
        }
        if let Some(v) = geom.mouth_width_ratio {
            vector.set_by_name("mouth_width_ratio", v);
        }
        if let Some(v) = geom.eye_tilt_deg {
            vector.set_by_name("eye_tilt_deg", v);
        }
        if let Some(v) = geom.upper_third_ratio {
            vector.set_by_name("upper_third_ratio", v);
        }
        if let Some(v) = geom.middle_third_ratio {
            vector.set_by_name("middle_third_ratio", v);
        }

        if let Some(v) = contour::smoothness(&face.mouth_contour) {
            vector.set_by_name("contour_smoothness", v);
        }
        if let Some(v) = contour::asymmetry(&face.mouth_contour) {
            vector.set_by_name("contour_asymmetry", v);
        }

        if let Some(mesh_points) = &face.mesh {
            let metrics = mesh::extract_metrics(mesh_points);
            if let Some(v) = metrics.area_cv {
                vector.set_by_name("mesh_area_cv", v);
            }
            if let Some(v) = metrics.depth_jump_ratio {
                vector.set_by_name("mesh_depth_jump_ratio", v);
            }
            if let Some(v) = metrics.depth_asymmetry {
                vector.set_by_name("mesh_depth_asymmetry", v);
            }
        }

        vector.set_by_name("pose_yaw_abs", face.yaw.abs());
        vector.set_by_name("pose_pitch_abs", face.pitch.abs());
    }

    vector
}

#[cfg(test)]
mod tests;
