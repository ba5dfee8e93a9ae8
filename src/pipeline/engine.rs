//! The streaming read/classify loop and its cadence logic.
//!
//! The cadence decision is factored into [`StreamEngine`] so it can be
//! driven deterministically with synthetic timestamps; the worker loop in
//! [`run_stream_loop`] feeds it real device reads and wall-clock `Instant`s.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::classify::SceneClassifier;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::event::{StreamCallbacks, StreamStatus};
use crate::pipeline::gate::{is_silent, mean_abs_level};
use crate::pipeline::window::WindowBuffer;
use crate::scene::SceneResult;
use crate::session::SessionState;
use crate::source::CaptureDevice;

/// Outcome of one cadence tick.
pub(crate) enum EngineStep {
    /// Not due yet: window not primed, or the interval has not elapsed.
    Idle,
    /// The window was due but too quiet; the cadence slot was consumed.
    LowSignal { level: f32 },
    /// A classification ran.
    Classified(SceneResult),
}

/// Sliding-window scheduler for streaming classification.
///
/// Classification fires only once the window has wrapped (so a snapshot is
/// all real audio) and at least the configured interval has passed since the
/// previous attempt. A gate-rejected window still stamps the attempt time:
/// silence does not earn an earlier retry.
pub(crate) struct StreamEngine {
    window: WindowBuffer,
    config: AnalyzerConfig,
    last_inference: Option<Instant>,
}

impl StreamEngine {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            window: WindowBuffer::new(config.window_samples()),
            config: config.clone(),
            last_inference: None,
        }
    }

    /// Feeds one chunk of captured PCM into the window.
    pub fn ingest(&mut self, pcm: &[i16]) {
        self.window.push_pcm(pcm);
    }

    /// Runs one cadence check at `now`, classifying through `classify` if a
    /// window is due and passes the gate.
    pub fn tick<F>(&mut self, now: Instant, classify: F) -> Result<EngineStep, AnalyzerError>
    where
        F: FnOnce(&[f32]) -> Result<SceneResult, AnalyzerError>,
    {
        if !self.window.wrapped() {
            return Ok(EngineStep::Idle);
        }
        if let Some(last) = self.last_inference {
            if now.duration_since(last) < self.config.inference_interval {
                return Ok(EngineStep::Idle);
            }
        }
        // Stamp before gating: a rejected window consumes this slot.
        self.last_inference = Some(now);

        let snapshot = self.window.snapshot();
        let level = mean_abs_level(&snapshot, snapshot.len());
        if is_silent(level, snapshot.len(), self.config.silence_threshold) {
            return Ok(EngineStep::LowSignal { level });
        }
        classify(&snapshot).map(EngineStep::Classified)
    }
}

/// The streaming worker: reads chunks, maintains the window, and reports
/// through the callbacks until the running flag clears or a fatal error
/// ends the loop.
///
/// Every exit path funnels through the same cleanup: stop and release the
/// device, then emit the terminal status. The caller's join on this worker
/// is what makes `stop_streaming` a synchronization point.
pub(crate) fn run_stream_loop(
    mut device: Box<dyn CaptureDevice>,
    classifier: Arc<Mutex<Box<dyn SceneClassifier>>>,
    config: AnalyzerConfig,
    state: Arc<SessionState>,
    callbacks: StreamCallbacks,
) {
    if let Err(err) = device.start() {
        tracing::error!(%err, "capture device failed to start");
        (callbacks.on_error)(err);
        finish(device, &state, &callbacks);
        return;
    }

    (callbacks.on_status)(StreamStatus::Listening);
    tracing::info!(
        sample_rate = config.sample_rate,
        window_samples = config.window_samples(),
        "streaming capture started"
    );

    let mut engine = StreamEngine::new(&config);
    let mut pcm = vec![0i16; config.chunk_samples];

    while state.running.load(Ordering::SeqCst) {
        let read = match device.read(&mut pcm) {
            Ok(read) => read,
            Err(err) => {
                // Transient: report and keep the loop alive.
                tracing::warn!(%err, "device read failed");
                (callbacks.on_error)(err);
                continue;
            }
        };
        if read == 0 {
            continue;
        }

        state.chunks_read.fetch_add(1, Ordering::SeqCst);
        state
            .samples_captured
            .fetch_add(read as u64, Ordering::SeqCst);
        engine.ingest(&pcm[..read]);

        match engine.tick(Instant::now(), |window| classifier.lock().classify(window)) {
            Ok(EngineStep::Idle) => {}
            Ok(EngineStep::LowSignal { level }) => {
                (callbacks.on_error)(AnalyzerError::LowSignal {
                    level,
                    threshold: config.silence_threshold,
                });
            }
            Ok(EngineStep::Classified(result)) => {
                let inferences = state.inferences.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(inferences, "classification delivered");
                (callbacks.on_result)(result);
            }
            Err(err) => {
                tracing::error!(%err, "classification failed; ending session");
                (callbacks.on_error)(err);
                break;
            }
        }
    }

    finish(device, &state, &callbacks);
    tracing::info!("streaming capture stopped");
}

/// Shared cleanup: stop the device, release it, emit the terminal status.
fn finish(mut device: Box<dyn CaptureDevice>, state: &SessionState, callbacks: &StreamCallbacks) {
    device.stop();
    drop(device);
    state.running.store(false, Ordering::SeqCst);
    (callbacks.on_status)(StreamStatus::Stopped);
}
