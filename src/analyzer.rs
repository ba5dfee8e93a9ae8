//! The caller-facing analyzer: builder, one-shot capture, streaming
//! lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::classify::SceneClassifier;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::event::StreamCallbacks;
use crate::pipeline;
use crate::scene::SceneResult;
use crate::session::{SessionState, SessionStats, StreamingSession};
use crate::source::{CaptureDevice, MicDevice};

/// Factory producing a fresh capture device per session.
type DeviceFactory = Box<dyn Fn() -> Result<Box<dyn CaptureDevice>, AnalyzerError> + Send + Sync>;

/// Specifies which capture device sessions should open.
enum DeviceSelection {
    /// Use the system's default input device.
    SystemDefault,
    /// Use a specific device by name.
    ByName(String),
    /// Use a caller-supplied factory (tests, custom hardware).
    Custom(DeviceFactory),
}

/// Builder for [`SceneAnalyzer`].
///
/// # Example
///
/// ```rust,ignore
/// use scene_audio::{SceneAnalyzer, StreamCallbacks};
///
/// let mut analyzer = SceneAnalyzer::builder()
///     .classifier(my_classifier)
///     .build()?;
///
/// let (callbacks, mut updates) = StreamCallbacks::channel();
/// analyzer.start_streaming(callbacks)?;
/// while let Some(update) = updates.recv().await {
///     println!("{update:?}");
/// }
/// analyzer.stop_streaming().await;
/// ```
#[must_use]
pub struct SceneAnalyzerBuilder {
    device: DeviceSelection,
    classifier: Option<Box<dyn SceneClassifier>>,
    config: AnalyzerConfig,
}

impl Default for SceneAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneAnalyzerBuilder {
    /// Creates a builder targeting the system default input device.
    pub fn new() -> Self {
        Self {
            device: DeviceSelection::SystemDefault,
            classifier: None,
            config: AnalyzerConfig::default(),
        }
    }

    /// Selects an input device by name.
    pub fn device_by_name(mut self, name: impl Into<String>) -> Self {
        self.device = DeviceSelection::ByName(name.into());
        self
    }

    /// Supplies a device factory, bypassing microphone discovery.
    ///
    /// The factory runs once per session (one-shot call or streaming
    /// start), so every session gets a fresh device.
    pub fn device_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn CaptureDevice>, AnalyzerError> + Send + Sync + 'static,
    {
        self.device = DeviceSelection::Custom(Box::new(factory));
        self
    }

    /// Sets the classifier collaborator. Required.
    pub fn classifier<C: SceneClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Overrides the capture configuration.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NoClassifierConfigured`] if no classifier
    /// was supplied.
    pub fn build(self) -> Result<SceneAnalyzer, AnalyzerError> {
        let classifier = self
            .classifier
            .ok_or(AnalyzerError::NoClassifierConfigured)?;
        Ok(SceneAnalyzer {
            device: self.device,
            classifier: Arc::new(Mutex::new(classifier)),
            config: self.config,
            session: None,
        })
    }
}

/// Captures microphone audio and classifies acoustic scenes.
///
/// Two modes share one classifier and one device selection:
///
/// - [`capture_and_classify`](Self::capture_and_classify) records a single
///   fixed-duration window and classifies it once.
/// - [`start_streaming`](Self::start_streaming) /
///   [`stop_streaming`](Self::stop_streaming) run a background worker that
///   re-classifies a sliding window on a fixed cadence, reporting through
///   caller-supplied callbacks.
///
/// At most one streaming session is live per analyzer; the session worker
/// exclusively owns its capture device and releases it on every exit path.
pub struct SceneAnalyzer {
    device: DeviceSelection,
    classifier: Arc<Mutex<Box<dyn SceneClassifier>>>,
    config: AnalyzerConfig,
    session: Option<StreamingSession>,
}

impl SceneAnalyzer {
    /// Creates a builder.
    pub fn builder() -> SceneAnalyzerBuilder {
        SceneAnalyzerBuilder::new()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn open_device(&self) -> Result<Box<dyn CaptureDevice>, AnalyzerError> {
        match &self.device {
            DeviceSelection::SystemDefault => {
                Ok(Box::new(MicDevice::open_default(&self.config)?))
            }
            DeviceSelection::ByName(name) => {
                Ok(Box::new(MicDevice::open_by_name(name, &self.config)?))
            }
            DeviceSelection::Custom(factory) => factory(),
        }
    }

    /// Records one window of audio and classifies it.
    ///
    /// Blocks (asynchronously) for the capture duration. The device is
    /// stopped and released before this returns, on success and error
    /// alike.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::NoSamplesCaptured`] when the device delivered
    ///   nothing at all.
    /// - [`AnalyzerError::LowSignal`] when the captured audio fails the
    ///   silence gate; the classifier is never invoked.
    /// - [`AnalyzerError::Device`] on a device read fault.
    /// - [`AnalyzerError::Classifier`] when the collaborator fails.
    pub async fn capture_and_classify(&self) -> Result<SceneResult, AnalyzerError> {
        let device = self.open_device()?;
        let classifier = Arc::clone(&self.classifier);
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            pipeline::capture_and_classify(device, &config, &classifier)
        })
        .await
        .map_err(|e| AnalyzerError::backend(format!("capture task failed: {e}")))?
    }

    /// Starts a streaming session.
    ///
    /// A no-op if a session is already live - the running session is
    /// untouched and no second device is opened. Otherwise opens the
    /// device, spawns the worker, and returns once the session is launched;
    /// the `Listening` status arrives through the callbacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture device cannot be opened.
    pub fn start_streaming(&mut self, callbacks: StreamCallbacks) -> Result<(), AnalyzerError> {
        if let Some(session) = &self.session {
            if !session.is_finished() {
                tracing::debug!("streaming already active; start ignored");
                return Ok(());
            }
        }

        let device = self.open_device()?;
        let state = Arc::new(SessionState::new());
        let worker_state = Arc::clone(&state);
        let classifier = Arc::clone(&self.classifier);
        let config = self.config.clone();

        let handle = tokio::task::spawn_blocking(move || {
            pipeline::run_stream_loop(device, classifier, config, worker_state, callbacks);
        });
        self.session = Some(StreamingSession::new(state, handle));
        tracing::info!("streaming session started");
        Ok(())
    }

    /// Stops the streaming session, if any.
    ///
    /// Blocks until the worker has fully terminated: when this returns, the
    /// device has been stopped and released and the `Stopped` status has
    /// been delivered. A no-op when no session is live.
    pub async fn stop_streaming(&mut self) {
        // The session stays in place so its final stats remain readable;
        // a finished session counts as Idle for the next start.
        if let Some(session) = self.session.as_mut() {
            session.stop().await;
            tracing::info!("streaming session stopped");
        }
    }

    /// Returns `true` while a streaming session's worker is live.
    pub fn is_streaming(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |session| !session.is_finished())
    }

    /// Returns statistics for the current (or most recent) session.
    pub fn streaming_stats(&self) -> Option<SessionStats> {
        self.session.as_ref().map(StreamingSession::stats)
    }

    /// Stops any streaming session and releases classifier resources.
    pub async fn release(mut self) {
        self.stop_streaming().await;
        self.classifier.lock().unload();
    }
}
