//! Shared data models for attention tracking.
//!
//! This crate provides Serde-serializable types for:
//! - Facial keypoints and per-frame landmark sets
//! - Emotion categories and the samples derived from them
//! - Capture session state snapshots
//! - Session summary reports

pub mod emotion;
pub mod landmark;
pub mod report;
pub mod session;

// Re-export common types
pub use emotion::{Emotion, EmotionParseError, EmotionSample};
pub use landmark::{Keypoint, LandmarkSet};
pub use report::SessionReport;
pub use session::{SessionId, SessionPhase, SessionState};
