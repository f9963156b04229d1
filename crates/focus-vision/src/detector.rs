//! Capability traits for the external landmark detector and video source.
//!
//! The landmark model itself is a black box: given a frame it returns zero
//! or one face. These traits give the capture loop a uniform interface to
//! whatever host provides it, and this module ships the in-process
//! implementations used for replays and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use focus_models::LandmarkSet;

use crate::error::{VisionError, VisionResult};

/// One video frame handed to the detector.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Pixel payload (layout is detector-specific)
    pub data: Bytes,
    /// Capture time in seconds
    pub timestamp: f64,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Bytes, timestamp: f64, width: u32, height: u32) -> Self {
        Self {
            data,
            timestamp,
            width,
            height,
        }
    }

    pub fn from_vec(data: Vec<u8>, timestamp: f64, width: u32, height: u32) -> Self {
        Self::new(Bytes::from(data), timestamp, width, height)
    }
}

/// Live video handle.
pub trait FrameSource: Send + Sync {
    /// Current frame, or `None` while the source is unavailable.
    fn current_frame(&self) -> Option<Frame>;
}

/// Face landmark detector.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Detect at most one face in a frame.
    ///
    /// `Ok(None)` means no face was found, which is not an error.
    async fn detect(&self, frame: &Frame) -> VisionResult<Option<LandmarkSet>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// One-time asynchronous acquisition of a detector.
#[async_trait]
pub trait DetectorLoader: Send + Sync {
    async fn load(&self) -> VisionResult<Arc<dyn LandmarkDetector>>;
}

// ============================================================================
// In-process implementations
// ============================================================================

/// Loader that hands out an already constructed detector.
pub struct SharedLoader {
    detector: Arc<dyn LandmarkDetector>,
}

impl SharedLoader {
    pub fn new(detector: Arc<dyn LandmarkDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl DetectorLoader for SharedLoader {
    async fn load(&self) -> VisionResult<Arc<dyn LandmarkDetector>> {
        Ok(Arc::clone(&self.detector))
    }
}

/// Blank frames with increasing timestamps.
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    fps: f64,
    available: AtomicBool,
    counter: AtomicU64,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            available: AtomicBool::new(true),
            counter: AtomicU64::new(0),
        }
    }

    /// Simulate the camera dropping out or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of frames handed out so far.
    pub fn frames_served(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new(640, 480, 60.0)
    }
}

impl FrameSource for SyntheticFrameSource {
    fn current_frame(&self) -> Option<Frame> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        let timestamp = if self.fps > 0.0 { index as f64 / self.fps } else { 0.0 };
        Some(Frame::new(Bytes::new(), timestamp, self.width, self.height))
    }
}

/// Scripted result for one detection call.
#[derive(Debug, Clone)]
pub enum ScriptedFrame {
    Face(LandmarkSet),
    NoFace,
    Fail(String),
}

/// Detector that replays a fixed script, then reports no face.
pub struct ScriptedDetector {
    script: Mutex<VecDeque<ScriptedFrame>>,
    calls: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: impl IntoIterator<Item = ScriptedFrame>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append more results to the end of the script.
    pub fn push(&self, frame: ScriptedFrame) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(frame);
    }

    /// Scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Total detection calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LandmarkDetector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame) -> VisionResult<Option<LandmarkSet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(ScriptedFrame::Face(set)) => Ok(Some(set)),
            Some(ScriptedFrame::NoFace) | None => Ok(None),
            Some(ScriptedFrame::Fail(message)) => Err(VisionError::detection_failed(message)),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_models::Keypoint;

    #[tokio::test]
    async fn test_scripted_detector_replays_in_order() {
        let face = LandmarkSet::new(vec![Keypoint::default(); 3]);
        let detector = ScriptedDetector::new([
            ScriptedFrame::Face(face.clone()),
            ScriptedFrame::NoFace,
            ScriptedFrame::Fail("boom".into()),
        ]);
        let frame = Frame::from_vec(vec![], 0.0, 1, 1);

        assert_eq!(detector.detect(&frame).await.unwrap(), Some(face));
        assert_eq!(detector.detect(&frame).await.unwrap(), None);
        assert!(matches!(
            detector.detect(&frame).await,
            Err(VisionError::DetectionFailed(_))
        ));
        // Exhausted scripts report no face
        assert_eq!(detector.detect(&frame).await.unwrap(), None);
        assert_eq!(detector.calls(), 4);
        assert_eq!(detector.remaining(), 0);
    }

    #[test]
    fn test_synthetic_source_availability() {
        let source = SyntheticFrameSource::new(4, 4, 10.0);
        let first = source.current_frame().unwrap();
        let second = source.current_frame().unwrap();
        assert_eq!(first.timestamp, 0.0);
        assert!((second.timestamp - 0.1).abs() < 1e-12);

        source.set_available(false);
        assert!(source.current_frame().is_none());
        assert_eq!(source.frames_served(), 2);
    }

    #[test]
    fn test_shared_loader_returns_same_detector() {
        let detector: Arc<dyn LandmarkDetector> = Arc::new(ScriptedDetector::new([]));
        let loader = SharedLoader::new(Arc::clone(&detector));
        let loaded = tokio_test::assert_ok!(tokio_test::block_on(loader.load()));
        assert_eq!(loaded.name(), "scripted");
        assert!(Arc::ptr_eq(&loaded, &detector));
    }
}
