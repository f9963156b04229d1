//! Capture loop controller.
//!
//! [`AttentionMonitor`] owns the only mutable [`SessionState`] and drives the
//! per-frame pipeline:
//!
//! ```text
//! frame source -> detector -> geometry -> attention -> classifier -> history
//! ```
//!
//! State changes are published through a `tokio::sync::watch` channel, so
//! consumers read snapshots or subscribe without ever writing. Exactly one
//! detection is in flight at a time: the self-paced loop only schedules the
//! next tick after the current one completes, and manual stepping is
//! guarded by an async mutex.
//!
//! Every activation and every stop advances a session epoch. A detection
//! that completes after its session ended sees a different epoch (checked
//! under the watch lock) and its result is dropped instead of applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use focus_models::{EmotionSample, LandmarkSet, SessionId, SessionPhase, SessionReport, SessionState};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn, Instrument};

use crate::aggregator::summarize;
use crate::attention::calculate_attention;
use crate::classifier::classify;
use crate::config::{CapturePacing, MonitorConfig};
use crate::detector::{DetectorLoader, FrameSource, LandmarkDetector};
use crate::error::{VisionError, VisionResult};
use crate::metrics;

/// Invoked once per frame that yields a face.
pub type SampleCallback = Arc<dyn Fn(&EmotionSample) + Send + Sync>;

/// Invoked when a session ends.
pub type ReportCallback = Arc<dyn Fn(&SessionReport) + Send + Sync>;

/// Notifications for whoever renders the monitor.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Started { session_id: SessionId },
    Sample(EmotionSample),
    /// The detector could not be loaded; the user should be told and may retry.
    InitializationFailed { message: String },
    Stopped { report: SessionReport },
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Sampled(EmotionSample),
    NoFace,
    /// The video source had no frame.
    NoFrame,
    DetectionFailed(String),
    /// The session ended while detection was running; the result was dropped.
    Stale,
}

struct ActiveSession {
    id: SessionId,
    epoch: u64,
    started_at: DateTime<Utc>,
    history_offset: usize,
    detector: Arc<dyn LandmarkDetector>,
}

struct MonitorInner {
    config: MonitorConfig,
    loader: Arc<dyn DetectorLoader>,
    source: Arc<dyn FrameSource>,
    detector: Mutex<Option<Arc<dyn LandmarkDetector>>>,
    state: watch::Sender<SessionState>,
    epoch: AtomicU64,
    session: Mutex<Option<ActiveSession>>,
    in_flight: tokio::sync::Mutex<()>,
    on_sample: Option<SampleCallback>,
    on_report: Option<ReportCallback>,
    events: Option<mpsc::UnboundedSender<MonitorEvent>>,
}

/// Builder for [`AttentionMonitor`].
pub struct MonitorBuilder {
    config: MonitorConfig,
    loader: Arc<dyn DetectorLoader>,
    source: Arc<dyn FrameSource>,
    on_sample: Option<SampleCallback>,
    on_report: Option<ReportCallback>,
    events: Option<mpsc::UnboundedSender<MonitorEvent>>,
}

impl MonitorBuilder {
    pub fn with_sample_callback(mut self, callback: impl Fn(&EmotionSample) + Send + Sync + 'static) -> Self {
        self.on_sample = Some(Arc::new(callback));
        self
    }

    pub fn with_report_callback(mut self, callback: impl Fn(&SessionReport) + Send + Sync + 'static) -> Self {
        self.on_report = Some(Arc::new(callback));
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<MonitorEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Validate the configuration and build the monitor in the idle phase.
    pub fn build(self) -> VisionResult<AttentionMonitor> {
        self.config.validate()?;
        let (state, _) = watch::channel(SessionState::default());

        Ok(AttentionMonitor {
            inner: Arc::new(MonitorInner {
                config: self.config,
                loader: self.loader,
                source: self.source,
                detector: Mutex::new(None),
                state,
                epoch: AtomicU64::new(0),
                session: Mutex::new(None),
                in_flight: tokio::sync::Mutex::new(()),
                on_sample: self.on_sample,
                on_report: self.on_report,
                events: self.events,
            }),
        })
    }
}

/// Attention capture loop with an observable session state.
pub struct AttentionMonitor {
    inner: Arc<MonitorInner>,
}

impl AttentionMonitor {
    pub fn builder(
        config: MonitorConfig,
        loader: Arc<dyn DetectorLoader>,
        source: Arc<dyn FrameSource>,
    ) -> MonitorBuilder {
        MonitorBuilder {
            config,
            loader,
            source,
            on_sample: None,
            on_report: None,
            events: None,
        }
    }

    /// Build a monitor without callbacks.
    pub fn new(
        config: MonitorConfig,
        loader: Arc<dyn DetectorLoader>,
        source: Arc<dyn FrameSource>,
    ) -> VisionResult<Self> {
        Self::builder(config, loader, source).build()
    }

    /// Start a session: load the detector (once), then begin sampling.
    ///
    /// Fails with `AlreadyRunning` unless idle, with the loader's error if the
    /// detector cannot be acquired (the monitor returns to idle), and with
    /// `Cancelled` if `stop()` was called while loading.
    pub async fn start(&self) -> VisionResult<SessionId> {
        let inner = &self.inner;

        let began = inner.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Idle {
                return false;
            }
            s.phase = SessionPhase::Loading;
            true
        });
        if !began {
            return Err(VisionError::AlreadyRunning);
        }
        let loading_epoch = inner.epoch.load(Ordering::SeqCst);
        debug!("Loading landmark detector");

        let detector = match inner.acquire_detector().await {
            Ok(detector) => detector,
            Err(e) => {
                error!(error = %e, "Failed to start facial analysis");
                metrics::record_init_failure();
                inner.state.send_if_modified(|s| {
                    if s.phase != SessionPhase::Loading
                        || inner.epoch.load(Ordering::SeqCst) != loading_epoch
                    {
                        return false;
                    }
                    s.phase = SessionPhase::Idle;
                    true
                });
                inner.emit(MonitorEvent::InitializationFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let session_id = SessionId::new();
        let started_at = Utc::now();

        // Lock order: session, then the watch channel (same as stop()).
        let mut session = inner.lock_session();
        let mut activation = None;
        inner.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Loading || inner.epoch.load(Ordering::SeqCst) != loading_epoch {
                return false;
            }
            let epoch = inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            s.phase = SessionPhase::Active;
            s.session_id = Some(session_id.clone());
            activation = Some((epoch, s.history.len()));
            true
        });
        let Some((epoch, history_offset)) = activation else {
            debug!("Analysis stopped while the detector was loading");
            return Err(VisionError::Cancelled);
        };

        // Cached only after activation; a teardown while loading leaves no detector.
        *inner.lock_detector() = Some(Arc::clone(&detector));
        *session = Some(ActiveSession {
            id: session_id.clone(),
            epoch,
            started_at,
            history_offset,
            detector: Arc::clone(&detector),
        });

        if inner.config.capture.pacing == CapturePacing::SelfPaced {
            let span = tracing::info_span!("capture", session_id = %session_id);
            tokio::spawn(run_capture_loop(Arc::clone(inner), epoch, detector).instrument(span));
        }
        drop(session);

        metrics::record_session_started();
        info!(session_id = %session_id, "Facial analysis started");
        inner.emit(MonitorEvent::Started {
            session_id: session_id.clone(),
        });

        Ok(session_id)
    }

    /// Stop the current session and return its report.
    ///
    /// Clears the current emotion and halts scheduling; history is kept. A
    /// detection already in flight completes but its result is discarded.
    /// Returns `None` if nothing was active (stopping while loading cancels
    /// the pending start).
    pub fn stop(&self) -> Option<SessionReport> {
        let inner = &self.inner;
        let mut session = inner.lock_session();
        let mut ended = None;

        inner.state.send_if_modified(|s| {
            if s.phase == SessionPhase::Idle {
                return false;
            }
            inner.epoch.fetch_add(1, Ordering::SeqCst);
            if s.phase == SessionPhase::Active {
                let offset = session
                    .as_ref()
                    .map(|a| a.history_offset)
                    .unwrap_or(s.history.len())
                    .min(s.history.len());
                ended = Some(s.history[offset..].to_vec());
            }
            s.phase = SessionPhase::Idle;
            s.session_id = None;
            s.current_emotion = None;
            true
        });

        let active = session.take();
        drop(session);

        let (active, history) = match (active, ended) {
            (Some(active), Some(history)) => (active, history),
            _ => {
                debug!("Stop requested with no active session");
                return None;
            }
        };

        let report = summarize(Some(active.id.clone()), &history, active.started_at, Utc::now());
        info!(
            session_id = %active.id,
            samples = report.sample_count,
            average_attention = report.average_attention,
            "Facial analysis stopped"
        );

        if let Some(callback) = &inner.on_report {
            callback(&report);
        }
        inner.emit(MonitorEvent::Stopped {
            report: report.clone(),
        });

        Some(report)
    }

    /// Stop, release the detector and clear all history.
    pub fn teardown(&self) -> Option<SessionReport> {
        let report = self.stop();
        *self.inner.lock_detector() = None;
        self.inner.state.send_modify(|s| {
            s.history.clear();
            s.current_attention = 0.0;
        });
        debug!("Attention monitor torn down");
        report
    }

    /// Run exactly one tick. Only available with manual pacing.
    pub async fn step(&self) -> VisionResult<TickOutcome> {
        if self.inner.config.capture.pacing != CapturePacing::Manual {
            return Err(VisionError::invalid_config(
                "step() requires manual capture pacing",
            ));
        }

        let (epoch, detector) = {
            let session = self.inner.lock_session();
            match session.as_ref() {
                Some(active) => (active.epoch, Arc::clone(&active.detector)),
                None => return Err(VisionError::NotActive),
            }
        };

        let _in_flight = self
            .inner
            .in_flight
            .try_lock()
            .map_err(|_| VisionError::DetectionInFlight)?;
        Ok(self.inner.tick(epoch, detector.as_ref()).await)
    }

    /// Report for the running session so far.
    pub fn report(&self) -> Option<SessionReport> {
        let session = self.inner.lock_session();
        let active = session.as_ref()?;
        let state = self.inner.state.borrow();
        let offset = active.history_offset.min(state.history.len());
        Some(summarize(
            Some(active.id.clone()),
            &state.history[offset..],
            active.started_at,
            Utc::now(),
        ))
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }
}

impl Drop for AttentionMonitor {
    fn drop(&mut self) {
        // The capture task holds its own reference to the inner state, so it
        // has to be told to exit.
        let inner = &self.inner;
        let _session = inner.lock_session().take();
        inner.state.send_if_modified(|s| {
            if s.phase == SessionPhase::Idle {
                return false;
            }
            inner.epoch.fetch_add(1, Ordering::SeqCst);
            s.phase = SessionPhase::Idle;
            s.current_emotion = None;
            true
        });
        *inner.lock_detector() = None;
    }
}

impl MonitorInner {
    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_detector(&self) -> MutexGuard<'_, Option<Arc<dyn LandmarkDetector>>> {
        self.detector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reuse the cached detector, or load it. The caller caches a fresh one.
    async fn acquire_detector(&self) -> VisionResult<Arc<dyn LandmarkDetector>> {
        let cached = self.lock_detector().clone();
        if let Some(detector) = cached {
            return Ok(detector);
        }

        let detector = self.loader.load().await?;
        info!(detector = detector.name(), "Landmark detector loaded");
        Ok(detector)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch && self.state.borrow().phase == SessionPhase::Active
    }

    fn emit(&self, event: MonitorEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Sample one frame. Failures are logged and reported, never propagated.
    async fn tick(&self, epoch: u64, detector: &dyn LandmarkDetector) -> TickOutcome {
        let Some(frame) = self.source.current_frame() else {
            trace!("Video source unavailable, skipping tick");
            metrics::record_frame_skipped();
            return TickOutcome::NoFrame;
        };

        let started = Instant::now();
        let result = detector.detect(&frame).await;
        metrics::record_detection(detector.name(), started.elapsed().as_secs_f64());

        match result {
            Ok(Some(landmarks)) if !landmarks.is_empty() => self.apply(epoch, &landmarks),
            Ok(_) => {
                trace!(timestamp = frame.timestamp, "No face detected in frame");
                metrics::record_no_face();
                TickOutcome::NoFace
            }
            Err(e) => {
                warn!(
                    detector = detector.name(),
                    timestamp = frame.timestamp,
                    error = %e,
                    "Error in facial analysis, continuing"
                );
                metrics::record_detection_failure(detector.name());
                TickOutcome::DetectionFailed(e.to_string())
            }
        }
    }

    fn apply(&self, epoch: u64, landmarks: &LandmarkSet) -> TickOutcome {
        let config = &self.config.attention;
        let attention = calculate_attention(Some(landmarks), config);
        let classification = classify(attention, config);

        let mut applied = None;
        self.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Active || self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            let sample = classification.into_sample(attention, s.history.len() as u64, Utc::now());
            s.current_emotion = Some(sample.clone());
            s.current_attention = attention;
            s.history.push(sample.clone());
            applied = Some(sample);
            true
        });

        let Some(sample) = applied else {
            debug!(attention, "Discarding detection from an ended session");
            metrics::record_stale_result();
            return TickOutcome::Stale;
        };

        debug!(
            attention,
            emotion = %sample.emotion,
            confidence = sample.confidence,
            "Emotion sample recorded"
        );
        metrics::record_sample(sample.emotion, attention);

        if let Some(callback) = &self.on_sample {
            callback(&sample);
        }
        self.emit(MonitorEvent::Sample(sample.clone()));

        TickOutcome::Sampled(sample)
    }
}

/// Self-paced loop: the next tick is scheduled only once the current one
/// has completed.
async fn run_capture_loop(inner: Arc<MonitorInner>, epoch: u64, detector: Arc<dyn LandmarkDetector>) {
    let mut ticker = tokio::time::interval(inner.config.capture.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(detector = detector.name(), "Capture loop running");

    while inner.is_current(epoch) {
        ticker.tick().await;
        if !inner.is_current(epoch) {
            break;
        }
        let _in_flight = inner.in_flight.lock().await;
        inner.tick(epoch, detector.as_ref()).await;
    }

    debug!("Capture loop exited");
}
