//! Recorded landmark streams and their replay through the monitor.
//!
//! A recording is JSON lines, one detector result per line:
//!
//! ```text
//! {"landmarks": [[0.31, 0.42, -0.01], ...]}   a face
//! {"landmarks": null}                         no face
//! {"error": "inference timed out"}            a failed detection
//! ```
//!
//! Blank lines are ignored.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use focus_models::{Keypoint, LandmarkSet, SessionReport};
use focus_vision::{
    AttentionMonitor, MonitorConfig, ScriptedDetector, ScriptedFrame, SharedLoader,
    SyntheticFrameSource,
};
use serde::Deserialize;
use tracing::{debug, Instrument};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::SessionLogger;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedFrame {
    #[serde(default)]
    landmarks: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    error: Option<String>,
}

impl From<RecordedFrame> for ScriptedFrame {
    fn from(frame: RecordedFrame) -> Self {
        match (frame.error, frame.landmarks) {
            (Some(message), _) => ScriptedFrame::Fail(message),
            (None, Some(points)) => {
                ScriptedFrame::Face(points.into_iter().map(Keypoint::from).collect::<LandmarkSet>())
            }
            (None, None) => ScriptedFrame::NoFace,
        }
    }
}

/// Parse a JSON-lines recording.
pub fn parse_recording(input: &str) -> WorkerResult<Vec<ScriptedFrame>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<RecordedFrame>(line)
                .map(ScriptedFrame::from)
                .map_err(|e| WorkerError::invalid_recording(index + 1, e.to_string()))
        })
        .collect()
}

/// Read and parse a recording file.
pub async fn load_recording(path: &Path) -> WorkerResult<Vec<ScriptedFrame>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let frames = parse_recording(&contents)?;
    debug!(path = %path.display(), frames = frames.len(), "Recording loaded");
    Ok(frames)
}

/// Run a self-paced session over `frames`, then stop and return its report.
///
/// The session runs until every recorded frame has been handed to the
/// detector plus `idle_ticks` more (at least one, so the last recorded
/// frame has been applied before the session stops).
pub async fn run_replay(
    config: MonitorConfig,
    frames: Vec<ScriptedFrame>,
    idle_ticks: usize,
    source_label: &str,
) -> WorkerResult<SessionReport> {
    // Ticks run one at a time: once call n + 1 has begun, tick n is applied.
    let target_calls = frames.len() + idle_ticks.max(1);
    let frame_count = frames.len();
    let poll = config.capture.frame_interval().max(Duration::from_millis(1));

    let detector = Arc::new(ScriptedDetector::new(frames));
    let monitor = AttentionMonitor::builder(
        config,
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .with_sample_callback(|sample| {
        debug!(
            sequence = sample.sequence,
            emotion = %sample.emotion,
            attention = sample.attention,
            "Replayed sample"
        );
    })
    .build()?;

    let session_id = monitor.start().await?;
    let logger = SessionLogger::new(&session_id, source_label);
    logger.log_start(frame_count);

    async {
        let mut last_reported = 0;
        while detector.calls() < target_calls {
            tokio::time::sleep(poll).await;
            let consumed = frame_count - detector.remaining();
            if consumed > 0 && consumed != last_reported && consumed % 100 == 0 {
                logger.log_progress(&format!("{}/{} frames", consumed, frame_count));
                last_reported = consumed;
            }
        }
    }
    .instrument(logger.create_span())
    .await;

    let report = monitor
        .stop()
        .ok_or_else(|| WorkerError::replay_failed("session ended before the recording finished"))?;
    if report.sample_count == 0 {
        logger.log_warning("no face was found in the recording");
    }
    logger.log_completion(&report);

    Ok(report)
}
