//! Replay configuration.

use std::path::{Path, PathBuf};

use focus_vision::{CapturePacing, MonitorConfig};

use crate::error::{WorkerError, WorkerResult};

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// JSON-lines landmark recording to replay
    pub replay_file: Option<PathBuf>,
    /// Optional JSON file with a full monitor configuration
    pub config_file: Option<PathBuf>,
    /// Tick spacing override; replays default to the monitor's own setting
    pub frame_interval_ms: Option<u64>,
    /// Extra ticks to run after the recording is exhausted
    pub idle_ticks: usize,
    /// Install the Prometheus recorder and log the exposition at exit
    pub metrics: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            replay_file: None,
            config_file: None,
            frame_interval_ms: None,
            idle_ticks: 3,
            metrics: false,
        }
    }
}

impl ReplayConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            replay_file: std::env::var("FOCUS_REPLAY_FILE").ok().map(PathBuf::from),
            config_file: std::env::var("FOCUS_CONFIG_FILE").ok().map(PathBuf::from),
            frame_interval_ms: std::env::var("FOCUS_FRAME_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            idle_ticks: std::env::var("FOCUS_IDLE_TICKS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            metrics: std::env::var("FOCUS_METRICS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Recording path, required for a replay.
    pub fn replay_path(&self) -> WorkerResult<&Path> {
        self.replay_file
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("no recording given (set FOCUS_REPLAY_FILE)"))
    }

    /// Resolve the monitor configuration for a replay.
    ///
    /// Reads `config_file` when set, otherwise the `FOCUS_*` environment.
    /// Replays are always self-paced.
    pub async fn monitor_config(&self) -> WorkerResult<MonitorConfig> {
        let mut config = match &self.config_file {
            Some(path) => {
                let json = tokio::fs::read_to_string(path).await?;
                MonitorConfig::from_json(&json)?
            }
            None => MonitorConfig::from_env(),
        };

        config.capture.pacing = CapturePacing::SelfPaced;
        if let Some(interval) = self.frame_interval_ms {
            config.capture.frame_interval_ms = interval;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_replay_file() {
        let config = ReplayConfig::default();
        assert!(matches!(
            config.replay_path(),
            Err(WorkerError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_monitor_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"attention": {{"head_turn_penalty": 0.2}}, "capture": {{"pacing": "manual"}}}}"#
        )
        .unwrap();

        let config = ReplayConfig {
            config_file: Some(file.path().to_path_buf()),
            frame_interval_ms: Some(2),
            ..ReplayConfig::default()
        };
        let monitor = config.monitor_config().await.unwrap();

        assert_eq!(monitor.attention.head_turn_penalty, 0.2);
        assert_eq!(monitor.capture.pacing, CapturePacing::SelfPaced);
        assert_eq!(monitor.capture.frame_interval_ms, 2);
    }

    #[tokio::test]
    async fn test_invalid_interval_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = ReplayConfig {
            config_file: Some(file.path().to_path_buf()),
            frame_interval_ms: Some(0),
            ..ReplayConfig::default()
        };
        assert!(matches!(
            config.monitor_config().await,
            Err(WorkerError::Vision(_))
        ));
    }
}
