//! Configuration for attention estimation and the capture loop.
//!
//! The scoring and classification constants are uncalibrated heuristics.
//! They live here rather than in the algorithms so that a deployment can
//! recalibrate them against real data without code changes.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VisionError, VisionResult};

/// Heuristic constants for the geometry, scoring and classification stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    // === Scoring ===
    /// Attention before any penalty is applied (default: 1.0)
    pub baseline_attention: f64,

    /// Eye aspect ratio below which the eyes count as closed (default: 0.15)
    pub eyes_closed_ear: f64,

    /// Penalty applied when the eyes are closed (default: 0.4)
    pub eyes_closed_penalty: f64,

    /// Penalty applied when the head is turned away (default: 0.3)
    pub head_turn_penalty: f64,

    /// Nose depth magnitude under which the face counts as facing the camera (default: 0.1)
    pub facing_depth_threshold: f64,

    /// Eye aspect ratio used when the eye geometry is unusable (default: 0.3)
    pub fallback_ear: f64,

    /// Attention reported for a frame without landmarks (default: 0.5)
    pub no_face_attention: f64,

    // === Classification ===
    /// Strictly above this, the sample is Attentive (default: 0.8)
    pub attentive_above: f64,

    /// Strictly below this, the sample is Distracted (default: 0.4)
    pub distracted_below: f64,

    /// Strictly below this (and not Distracted), the sample is Tired (default: 0.6)
    pub tired_below: f64,

    /// Fixed confidence for Tired samples (default: 0.7)
    pub tired_confidence: f64,

    /// Fixed confidence for Neutral samples (default: 0.6)
    pub neutral_confidence: f64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            baseline_attention: 1.0,
            eyes_closed_ear: 0.15,
            eyes_closed_penalty: 0.4,
            head_turn_penalty: 0.3,
            facing_depth_threshold: 0.1,
            fallback_ear: 0.3,
            no_face_attention: 0.5,

            attentive_above: 0.8,
            distracted_below: 0.4,
            tired_below: 0.6,
            tired_confidence: 0.7,
            neutral_confidence: 0.6,
        }
    }
}

impl AttentionConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            baseline_attention: env_or("FOCUS_BASELINE_ATTENTION", d.baseline_attention),
            eyes_closed_ear: env_or("FOCUS_EYES_CLOSED_EAR", d.eyes_closed_ear),
            eyes_closed_penalty: env_or("FOCUS_EYES_CLOSED_PENALTY", d.eyes_closed_penalty),
            head_turn_penalty: env_or("FOCUS_HEAD_TURN_PENALTY", d.head_turn_penalty),
            facing_depth_threshold: env_or("FOCUS_FACING_DEPTH_THRESHOLD", d.facing_depth_threshold),
            fallback_ear: env_or("FOCUS_FALLBACK_EAR", d.fallback_ear),
            no_face_attention: env_or("FOCUS_NO_FACE_ATTENTION", d.no_face_attention),
            attentive_above: env_or("FOCUS_ATTENTIVE_ABOVE", d.attentive_above),
            distracted_below: env_or("FOCUS_DISTRACTED_BELOW", d.distracted_below),
            tired_below: env_or("FOCUS_TIRED_BELOW", d.tired_below),
            tired_confidence: env_or("FOCUS_TIRED_CONFIDENCE", d.tired_confidence),
            neutral_confidence: env_or("FOCUS_NEUTRAL_CONFIDENCE", d.neutral_confidence),
        }
    }

    /// Reject non-finite values, out-of-range scores and mis-ordered thresholds.
    pub fn validate(&self) -> VisionResult<()> {
        let unit_fields = [
            ("baseline_attention", self.baseline_attention),
            ("no_face_attention", self.no_face_attention),
            ("attentive_above", self.attentive_above),
            ("distracted_below", self.distracted_below),
            ("tired_below", self.tired_below),
            ("tired_confidence", self.tired_confidence),
            ("neutral_confidence", self.neutral_confidence),
        ];
        for (name, value) in unit_fields {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(VisionError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let non_negative = [
            ("eyes_closed_ear", self.eyes_closed_ear),
            ("eyes_closed_penalty", self.eyes_closed_penalty),
            ("head_turn_penalty", self.head_turn_penalty),
            ("facing_depth_threshold", self.facing_depth_threshold),
            ("fallback_ear", self.fallback_ear),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(VisionError::invalid_config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !(self.distracted_below <= self.tired_below && self.tired_below <= self.attentive_above) {
            return Err(VisionError::invalid_config(format!(
                "thresholds must satisfy distracted_below ({}) <= tired_below ({}) <= attentive_above ({})",
                self.distracted_below, self.tired_below, self.attentive_above
            )));
        }

        Ok(())
    }
}

/// How the capture loop is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapturePacing {
    /// A background task reschedules itself after each completed tick.
    #[default]
    SelfPaced,
    /// The caller steps the loop explicitly.
    Manual,
}

/// Capture loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Minimum spacing between ticks in milliseconds (default: 16, one display refresh at 60 Hz)
    pub frame_interval_ms: u64,

    pub pacing: CapturePacing,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            pacing: CapturePacing::SelfPaced,
        }
    }
}

impl CaptureConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        let pacing = match std::env::var("FOCUS_CAPTURE_PACING") {
            Ok(v) if v.eq_ignore_ascii_case("manual") => CapturePacing::Manual,
            _ => d.pacing,
        };
        Self {
            frame_interval_ms: env_or("FOCUS_FRAME_INTERVAL_MS", d.frame_interval_ms),
            pacing,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> VisionResult<()> {
        if self.pacing == CapturePacing::SelfPaced && self.frame_interval_ms == 0 {
            return Err(VisionError::invalid_config(
                "frame_interval_ms must be positive for self-paced capture",
            ));
        }
        Ok(())
    }
}

/// Complete monitor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub attention: AttentionConfig,
    pub capture: CaptureConfig,
}

impl MonitorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            attention: AttentionConfig::from_env(),
            capture: CaptureConfig::from_env(),
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> VisionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VisionResult<()> {
        self.attention.validate()?;
        self.capture.validate()
    }

    /// Manually stepped configuration, mostly useful in tests and replays.
    pub fn manual() -> Self {
        Self {
            capture: CaptureConfig {
                pacing: CapturePacing::Manual,
                ..CaptureConfig::default()
            },
            ..Self::default()
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
