//! Structured session logging utilities.
//!
//! Provides consistent lifecycle log lines for a replayed session with
//! its session ID attached.

use chrono::{DateTime, Utc};
use focus_models::{SessionId, SessionReport};
use tracing::{info, warn, Span};

/// Session logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    source: String,
    started_at: DateTime<Utc>,
}

impl SessionLogger {
    /// Create a logger for a session fed from `source` (a file name or
    /// other label for where frames come from).
    pub fn new(session_id: &SessionId, source: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            source: source.to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn log_start(&self, frames: usize) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            frames,
            "Session started"
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            source = %self.source,
            "Session progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            source = %self.source,
            "Session warning: {}", message
        );
    }

    /// Log the end of the session with its summary figures.
    pub fn log_completion(&self, report: &SessionReport) {
        let elapsed = Utc::now() - self.started_at;
        info!(
            session_id = %self.session_id,
            source = %self.source,
            samples = report.sample_count,
            average_attention = report.average_attention,
            attentive_minutes = report.attentive_minutes,
            elapsed_ms = elapsed.num_milliseconds(),
            "Session completed"
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Create a tracing span for this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            source = %self.source
        )
    }
}
