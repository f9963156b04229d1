//! Eye and head geometry signals from face-mesh landmarks.
//!
//! # Landmark indices (MediaPipe 468-point face mesh)
//!
//! Each eye is described by six points in the order
//! `[corner_a, top, _, corner_b, _, bottom]`:
//!
//! - 0 / 3: horizontal corners
//! - 1 / 5: upper and lower lid used for the vertical opening
//! - 2 / 4: second lid pair (kept for completeness, unused by the ratio)
//!
//! The nose tip (index 1) carries the depth estimate used as a
//! head-orientation proxy.

use focus_models::{Keypoint, LandmarkSet};
use tracing::trace;

use crate::config::AttentionConfig;

/// Left eye landmarks.
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// Right eye landmarks.
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
/// Nose tip landmark.
pub const NOSE_TIP: usize = 1;

const EPS: f64 = 1e-9;

/// Geometry signals for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGeometry {
    /// Mean of the left and right eye opening ratios.
    pub eye_aspect_ratio: f64,
    pub is_facing_camera: bool,
}

/// Extract eye and head signals from a face.
///
/// Never fails: unusable eye geometry (missing indices, zero-width eye,
/// non-finite coordinates) yields `config.fallback_ear`, and a missing nose
/// keypoint counts as facing the camera.
pub fn extract_geometry(landmarks: &LandmarkSet, config: &AttentionConfig) -> EyeGeometry {
    let eye_aspect_ratio = eye_aspect_ratio(landmarks).unwrap_or_else(|| {
        trace!(
            landmarks = landmarks.len(),
            fallback = config.fallback_ear,
            "Eye geometry unusable, using fallback EAR"
        );
        config.fallback_ear
    });

    let is_facing_camera = landmarks
        .get(NOSE_TIP)
        .map(|nose| (nose.z as f64).abs() < config.facing_depth_threshold)
        .unwrap_or(true);

    EyeGeometry {
        eye_aspect_ratio,
        is_facing_camera,
    }
}

/// Average eye opening ratio, or `None` if either eye is unusable.
pub fn eye_aspect_ratio(landmarks: &LandmarkSet) -> Option<f64> {
    let left = single_eye_ratio(landmarks, &LEFT_EYE)?;
    let right = single_eye_ratio(landmarks, &RIGHT_EYE)?;
    Some((left + right) / 2.0)
}

fn single_eye_ratio(landmarks: &LandmarkSet, indices: &[usize; 6]) -> Option<f64> {
    let point = |slot: usize| -> Option<&Keypoint> { landmarks.get(indices[slot]) };

    let corner_a = point(0)?;
    let top = point(1)?;
    let corner_b = point(3)?;
    let bottom = point(5)?;

    let vertical = (top.y as f64 - bottom.y as f64).abs();
    let horizontal = (corner_a.x as f64 - corner_b.x as f64).abs();
    if !horizontal.is_finite() || horizontal <= EPS {
        return None;
    }

    let ratio = vertical / horizontal;
    ratio.is_finite().then_some(ratio)
}
