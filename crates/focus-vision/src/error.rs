//! Error types for attention estimation.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while estimating attention.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Landmark detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Analysis already running")]
    AlreadyRunning,

    #[error("Analysis is not active")]
    NotActive,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("A detection is already in flight")]
    DetectionInFlight,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl VisionError {
    /// Create a detector initialization failure.
    pub fn detector_unavailable(message: impl Into<String>) -> Self {
        Self::DetectorUnavailable(message.into())
    }

    /// Create a per-frame detection failure.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the capture loop should keep going after this error.
    ///
    /// A failed frame never ends a session; a failed detector load does.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VisionError::DetectionFailed(_))
    }
}
