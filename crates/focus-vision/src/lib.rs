#![deny(unreachable_patterns)]
//! Facial attention estimation.
//!
//! This crate provides:
//! - Eye aspect ratio and head-facing signals from face-mesh landmarks
//! - A heuristic attention score and its emotion classification
//! - A capture loop that samples a video source through an external
//!   landmark detector, one detection in flight at a time
//! - Session summary reports
//! - Configuration, error types and metrics for all of the above

pub mod aggregator;
pub mod attention;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod monitor;

pub use aggregator::summarize;
pub use attention::{calculate_attention, score_geometry};
pub use classifier::{classify, Classification};
pub use config::{AttentionConfig, CaptureConfig, CapturePacing, MonitorConfig};
pub use detector::{
    DetectorLoader, Frame, FrameSource, LandmarkDetector, ScriptedDetector, ScriptedFrame,
    SharedLoader, SyntheticFrameSource,
};
pub use error::{VisionError, VisionResult};
pub use geometry::{extract_geometry, EyeGeometry};
pub use monitor::{
    AttentionMonitor, MonitorBuilder, MonitorEvent, ReportCallback, SampleCallback, TickOutcome,
};
