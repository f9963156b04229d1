//! Attention scoring from eye and head geometry.

use focus_models::LandmarkSet;
use tracing::trace;

use crate::config::AttentionConfig;
use crate::geometry::{extract_geometry, EyeGeometry};

/// Score a face, or return the neutral default when there is none.
///
/// Missing or empty landmarks yield exactly `config.no_face_attention`.
pub fn calculate_attention(landmarks: Option<&LandmarkSet>, config: &AttentionConfig) -> f64 {
    match landmarks {
        Some(set) if !set.is_empty() => score_geometry(&extract_geometry(set, config), config),
        _ => config.no_face_attention,
    }
}

/// Apply eye-closure and head-turn penalties to the baseline, clamped to [0, 1].
pub fn score_geometry(geometry: &EyeGeometry, config: &AttentionConfig) -> f64 {
    let mut attention = config.baseline_attention;

    if geometry.eye_aspect_ratio < config.eyes_closed_ear {
        attention -= config.eyes_closed_penalty;
        trace!(ear = geometry.eye_aspect_ratio, "Eyes detected as closed");
    }

    if !geometry.is_facing_camera {
        attention -= config.head_turn_penalty;
        trace!("Head turned away from camera");
    }

    clamp_unit(attention)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::face;

    fn geometry(ear: f64, facing: bool) -> EyeGeometry {
        EyeGeometry {
            eye_aspect_ratio: ear,
            is_facing_camera: facing,
        }
    }

    #[test]
    fn test_absent_landmarks_neutral() {
        let config = AttentionConfig::default();
        assert_eq!(calculate_attention(None, &config), 0.5);
        assert_eq!(calculate_attention(Some(&LandmarkSet::default()), &config), 0.5);
    }

    #[test]
    fn test_penalties() {
        let config = AttentionConfig::default();
        assert_eq!(score_geometry(&geometry(0.3, true), &config), 1.0);
        assert!((score_geometry(&geometry(0.1, true), &config) - 0.6).abs() < 1e-12);
        assert!((score_geometry(&geometry(0.3, false), &config) - 0.7).abs() < 1e-12);
        assert!((score_geometry(&geometry(0.1, false), &config) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = AttentionConfig::default();
        assert_eq!(score_geometry(&geometry(0.15, true), &config), 1.0);
    }

    #[test]
    fn test_clamped_when_penalties_stack_below_zero() {
        let config = AttentionConfig {
            eyes_closed_penalty: 0.8,
            head_turn_penalty: 0.7,
            ..AttentionConfig::default()
        };
        assert_eq!(score_geometry(&geometry(0.0, false), &config), 0.0);
    }

    #[test]
    fn test_clamped_above_one() {
        let config = AttentionConfig {
            baseline_attention: 1.2,
            head_turn_penalty: 0.1,
            ..AttentionConfig::default()
        };
        assert_eq!(score_geometry(&geometry(0.3, false), &config), 1.0);
    }

    #[test]
    fn test_scores_full_face() {
        let config = AttentionConfig::default();
        assert_eq!(calculate_attention(Some(&face(0.1, 0.03, 0.0)), &config), 1.0);

        let tired = calculate_attention(Some(&face(0.1, 0.005, 0.3)), &config);
        assert!((tired - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_always_in_unit_range() {
        let config = AttentionConfig::default();
        for ear in [0.0, 0.05, 0.149, 0.15, 0.3, 10.0] {
            for facing in [true, false] {
                let score = score_geometry(&geometry(ear, facing), &config);
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }
}
