//! Capture loop integration tests with the self-paced scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use focus_models::{Emotion, Keypoint, LandmarkSet, SessionState};
use focus_vision::geometry::{LEFT_EYE, NOSE_TIP, RIGHT_EYE};
use focus_vision::{
    AttentionConfig, AttentionMonitor, CaptureConfig, CapturePacing, Frame, LandmarkDetector,
    MonitorConfig, MonitorEvent, ScriptedDetector, ScriptedFrame, SharedLoader,
    SyntheticFrameSource, VisionResult,
};
use tokio::sync::{mpsc, watch, Notify};

const WAIT: Duration = Duration::from_secs(5);

/// A face whose eyes are open or closed and whose head faces the camera or not.
fn face(eyes_open: bool, facing: bool) -> LandmarkSet {
    let opening = if eyes_open { 0.03 } else { 0.005 };
    let mut set = LandmarkSet::new(vec![Keypoint::new(0.5, 0.5, 0.0); 468]);
    for (eye, cx) in [(LEFT_EYE, 0.35_f32), (RIGHT_EYE, 0.65_f32)] {
        set.set(eye[0], Keypoint::new(cx - 0.05, 0.4, 0.0));
        set.set(eye[3], Keypoint::new(cx + 0.05, 0.4, 0.0));
        set.set(eye[1], Keypoint::new(cx, 0.4 - opening / 2.0, 0.0));
        set.set(eye[5], Keypoint::new(cx, 0.4 + opening / 2.0, 0.0));
    }
    let nose_z = if facing { 0.0 } else { 0.25 };
    set.set(NOSE_TIP, Keypoint::new(0.5, 0.55, nose_z));
    set
}

fn self_paced(attention: AttentionConfig) -> MonitorConfig {
    MonitorConfig {
        attention,
        capture: CaptureConfig {
            frame_interval_ms: 1,
            pacing: CapturePacing::SelfPaced,
        },
    }
}

async fn wait_for_history(rx: &mut watch::Receiver<SessionState>, len: usize) {
    tokio::time::timeout(WAIT, rx.wait_for(|s| s.history.len() >= len))
        .await
        .expect("timed out waiting for history")
        .expect("monitor dropped");
}

async fn wait_for_calls(detector: &ScriptedDetector, calls: usize) {
    tokio::time::timeout(WAIT, async {
        while detector.calls() < calls {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("timed out waiting for detector calls");
}

#[tokio::test]
async fn test_three_faces_produce_three_samples() {
    // Baseline and penalties chosen so the three faces score 0.9, 0.3 and 0.5
    let attention = AttentionConfig {
        baseline_attention: 0.9,
        eyes_closed_penalty: 0.4,
        head_turn_penalty: 0.2,
        ..AttentionConfig::default()
    };
    let detector = Arc::new(ScriptedDetector::new([
        ScriptedFrame::Face(face(true, true)),
        ScriptedFrame::Face(face(false, false)),
        ScriptedFrame::Face(face(false, true)),
    ]));
    let samples_seen = Arc::new(AtomicUsize::new(0));
    let counter = samples_seen.clone();
    let (tx, mut events) = mpsc::unbounded_channel();

    let monitor = AttentionMonitor::builder(
        self_paced(attention),
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .with_sample_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .with_event_channel(tx)
    .build()
    .unwrap();

    let mut rx = monitor.subscribe();
    monitor.start().await.unwrap();
    wait_for_history(&mut rx, 3).await;

    // Exhausted script reports no face: further ticks must not grow history
    wait_for_calls(&detector, 6).await;

    let state = monitor.snapshot();
    assert!(state.is_active());
    assert_eq!(state.history.len(), 3);

    let emotions: Vec<Emotion> = state.history.iter().map(|s| s.emotion).collect();
    assert_eq!(emotions, vec![Emotion::Attentive, Emotion::Distracted, Emotion::Tired]);
    assert!((state.history[0].confidence - 0.9).abs() < 1e-9);
    assert!((state.history[1].confidence - 0.7).abs() < 1e-9);
    assert!((state.history[2].confidence - 0.7).abs() < 1e-9);
    assert!((state.current_attention - 0.5).abs() < 1e-9);
    assert_eq!(state.current_emotion.as_ref().map(|s| s.emotion), Some(Emotion::Tired));

    let sequences: Vec<u64> = state.history.iter().map(|s| s.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    assert_eq!(samples_seen.load(Ordering::SeqCst), 3);

    let report = monitor.stop().unwrap();
    assert_eq!(report.sample_count, 3);
    assert!((report.average_attention - (0.9 + 0.3 + 0.5) / 3.0).abs() < 1e-9);

    let mut started = 0;
    let mut sampled = 0;
    let mut stopped = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            MonitorEvent::Started { .. } => started += 1,
            MonitorEvent::Sample(_) => sampled += 1,
            MonitorEvent::Stopped { .. } => stopped += 1,
            MonitorEvent::InitializationFailed { .. } => panic!("unexpected init failure"),
        }
    }
    assert_eq!((started, sampled, stopped), (1, 3, 1));
}

#[tokio::test]
async fn test_detection_failure_does_not_end_session() {
    let detector = Arc::new(ScriptedDetector::new([
        ScriptedFrame::Face(face(true, true)),
        ScriptedFrame::Fail("inference error".into()),
        ScriptedFrame::Face(face(true, true)),
    ]));
    let monitor = AttentionMonitor::new(
        self_paced(AttentionConfig::default()),
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .unwrap();

    let mut rx = monitor.subscribe();
    monitor.start().await.unwrap();
    wait_for_history(&mut rx, 2).await;
    wait_for_calls(&detector, 4).await;

    let state = monitor.snapshot();
    assert!(state.is_active());
    assert_eq!(state.history.len(), 2);
    assert_eq!(detector.remaining(), 0);
}

#[tokio::test]
async fn test_stop_halts_sampling() {
    let detector = Arc::new(ScriptedDetector::new([ScriptedFrame::Face(face(true, true))]));
    let monitor = AttentionMonitor::new(
        self_paced(AttentionConfig::default()),
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .unwrap();

    let mut rx = monitor.subscribe();
    monitor.start().await.unwrap();
    wait_for_history(&mut rx, 1).await;
    monitor.stop().unwrap();

    // Allow a pending tick to drain, then make sure the loop is quiet
    tokio::time::sleep(Duration::from_millis(20)).await;
    let calls = detector.calls();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(detector.calls(), calls);

    let state = monitor.snapshot();
    assert!(state.is_idle());
    assert!(state.current_emotion.is_none());
    assert_eq!(state.history.len(), 1);
}

/// Detector that parks every call until released.
struct GatedDetector {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl LandmarkDetector for GatedDetector {
    async fn detect(&self, _frame: &Frame) -> VisionResult<Option<LandmarkSet>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Some(face(true, true)))
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[tokio::test]
async fn test_late_result_discarded_after_restart() {
    let detector = Arc::new(GatedDetector {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let samples_seen = Arc::new(AtomicUsize::new(0));
    let counter = samples_seen.clone();
    let monitor = AttentionMonitor::builder(
        self_paced(AttentionConfig::default()),
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .with_sample_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .build()
    .unwrap();

    monitor.start().await.unwrap();
    tokio::time::timeout(WAIT, detector.entered.notified()).await.unwrap();

    // First session ends with a detection in flight, and a new one begins
    let report = monitor.stop().unwrap();
    assert_eq!(report.sample_count, 0);
    monitor.start().await.unwrap();

    // Let the first session's detection finish; the second session's loop
    // then issues its own call, which parks again
    detector.release.notify_one();
    tokio::time::timeout(WAIT, detector.entered.notified()).await.unwrap();

    let state = monitor.snapshot();
    assert!(state.is_active());
    assert!(state.history.is_empty());
    assert_eq!(samples_seen.load(Ordering::SeqCst), 0);

    monitor.stop();
}

#[tokio::test]
async fn test_dropping_monitor_ends_loop() {
    let detector = Arc::new(ScriptedDetector::new([]));
    let monitor = AttentionMonitor::new(
        self_paced(AttentionConfig::default()),
        Arc::new(SharedLoader::new(detector.clone())),
        Arc::new(SyntheticFrameSource::default()),
    )
    .unwrap();

    monitor.start().await.unwrap();
    wait_for_calls(&detector, 2).await;
    drop(monitor);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let calls = detector.calls();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(detector.calls(), calls);
}
