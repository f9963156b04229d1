//! Metrics for the capture loop.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use focus_models::Emotion;
use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_SAMPLED_TOTAL: &str = "focus_frames_sampled_total";
    pub const FRAMES_SKIPPED_TOTAL: &str = "focus_frames_skipped_total";
    pub const FACES_DETECTED_TOTAL: &str = "focus_faces_detected_total";
    pub const NO_FACE_FRAMES_TOTAL: &str = "focus_no_face_frames_total";
    pub const DETECTION_FAILURES_TOTAL: &str = "focus_detection_failures_total";
    pub const DETECTION_DURATION_SECONDS: &str = "focus_detection_duration_seconds";
    pub const STALE_RESULTS_TOTAL: &str = "focus_stale_results_total";
    pub const DETECTOR_INIT_FAILURES_TOTAL: &str = "focus_detector_init_failures_total";
    pub const SESSIONS_STARTED_TOTAL: &str = "focus_sessions_started_total";
    pub const EMOTION_SAMPLES_TOTAL: &str = "focus_emotion_samples_total";
    pub const CURRENT_ATTENTION: &str = "focus_current_attention";
}

/// Record one detector invocation and how long it took.
pub fn record_detection(detector: &'static str, duration_secs: f64) {
    let labels = [("detector", detector)];
    counter!(names::FRAMES_SAMPLED_TOTAL, &labels).increment(1);
    histogram!(names::DETECTION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a tick that had no frame to work with.
pub fn record_frame_skipped() {
    counter!(names::FRAMES_SKIPPED_TOTAL).increment(1);
}

pub fn record_no_face() {
    counter!(names::NO_FACE_FRAMES_TOTAL).increment(1);
}

pub fn record_detection_failure(detector: &'static str) {
    counter!(names::DETECTION_FAILURES_TOTAL, "detector" => detector).increment(1);
}

/// Record a completion that arrived after its session ended.
pub fn record_stale_result() {
    counter!(names::STALE_RESULTS_TOTAL).increment(1);
}

pub fn record_init_failure() {
    counter!(names::DETECTOR_INIT_FAILURES_TOTAL).increment(1);
}

pub fn record_session_started() {
    counter!(names::SESSIONS_STARTED_TOTAL).increment(1);
}

/// Record a classified face.
pub fn record_sample(emotion: Emotion, attention: f64) {
    counter!(names::FACES_DETECTED_TOTAL).increment(1);
    counter!(names::EMOTION_SAMPLES_TOTAL, "emotion" => emotion.as_str()).increment(1);
    gauge!(names::CURRENT_ATTENTION).set(attention);
}
