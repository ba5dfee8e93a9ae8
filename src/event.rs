//! Streaming callbacks and status events.
//!
//! The streaming worker never assumes it runs where the caller wants
//! deliveries to land. Callbacks are opaque `Send + Sync` handles invoked
//! from the worker thread; callers that need deliveries on a particular
//! execution context use [`StreamCallbacks::channel`], which forwards every
//! delivery into a thread-safe queue they drain wherever they like.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{AnalyzerError, SceneResult};

/// Lifecycle status of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// The session opened the device and is capturing audio.
    Listening,
    /// The session has stopped and the device has been released.
    Stopped,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listening => write!(f, "listening"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Callback receiving ranked classification results.
pub type ResultCallback = Arc<dyn Fn(SceneResult) + Send + Sync>;

/// Callback receiving session status transitions.
pub type StatusCallback = Arc<dyn Fn(StreamStatus) + Send + Sync>;

/// Callback receiving errors, transient and fatal alike.
pub type ErrorCallback = Arc<dyn Fn(AnalyzerError) + Send + Sync>;

/// The three caller-supplied delivery handles for a streaming session.
///
/// All three are invoked from the session's worker thread.
#[derive(Clone)]
pub struct StreamCallbacks {
    /// Invoked with each ranked [`SceneResult`].
    pub on_result: ResultCallback,
    /// Invoked on `Listening` when capture begins and `Stopped` after the
    /// device has been released.
    pub on_status: StatusCallback,
    /// Invoked with every error condition; only classifier failures end the
    /// session.
    pub on_error: ErrorCallback,
}

impl StreamCallbacks {
    /// Creates a callback set from three closures.
    ///
    /// # Example
    ///
    /// ```
    /// use scene_audio::StreamCallbacks;
    ///
    /// let callbacks = StreamCallbacks::new(
    ///     |result| println!("{result}"),
    ///     |status| println!("status: {status}"),
    ///     |err| eprintln!("error: {err}"),
    /// );
    /// # let _ = callbacks;
    /// ```
    pub fn new<R, S, E>(on_result: R, on_status: S, on_error: E) -> Self
    where
        R: Fn(SceneResult) + Send + Sync + 'static,
        S: Fn(StreamStatus) + Send + Sync + 'static,
        E: Fn(AnalyzerError) + Send + Sync + 'static,
    {
        Self {
            on_result: Arc::new(on_result),
            on_status: Arc::new(on_status),
            on_error: Arc::new(on_error),
        }
    }

    /// Creates a callback set that forwards every delivery into a queue.
    ///
    /// The returned receiver yields [`StreamUpdate`] values in delivery
    /// order. This is the dispatch seam for callers bound to a specific
    /// execution context (a UI loop, an async task): the worker only ever
    /// touches the queue, and the caller drains it on its own terms.
    ///
    /// The channel is unbounded so the worker never blocks on a slow
    /// consumer; deliveries to a dropped receiver are discarded.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let result_tx = tx.clone();
        let status_tx = tx.clone();
        let callbacks = Self::new(
            move |result| {
                let _ = result_tx.send(StreamUpdate::Result(result));
            },
            move |status| {
                let _ = status_tx.send(StreamUpdate::Status(status));
            },
            move |err| {
                let _ = tx.send(StreamUpdate::Error(err));
            },
        );
        (callbacks, rx)
    }
}

/// A single delivery forwarded by [`StreamCallbacks::channel`].
#[derive(Debug)]
pub enum StreamUpdate {
    /// A ranked classification result.
    Result(SceneResult),
    /// A session status transition.
    Status(StreamStatus),
    /// An error delivery.
    Error(AnalyzerError),
}
