//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid recording at line {line}: {message}")]
    InvalidRecording { line: usize, message: String },

    #[error("Replay failed: {0}")]
    ReplayFailed(String),

    #[error("Vision error: {0}")]
    Vision(#[from] focus_vision::VisionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_recording(line: usize, msg: impl Into<String>) -> Self {
        Self::InvalidRecording {
            line,
            message: msg.into(),
        }
    }

    pub fn replay_failed(msg: impl Into<String>) -> Self {
        Self::ReplayFailed(msg.into())
    }
}
