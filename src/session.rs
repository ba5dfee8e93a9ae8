//! Streaming session lifecycle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

/// Statistics about a streaming session.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Chunks read from the capture device.
    pub chunks_read: u64,
    /// Total PCM samples captured.
    pub samples_captured: u64,
    /// Classification invocations completed.
    pub inferences: u64,
}

/// State shared between the analyzer and the streaming worker.
///
/// The `running` flag is the cooperative cancellation mechanism: the worker
/// checks it before each read iteration, so clearing it never interrupts an
/// in-flight device read or classifier call - it prevents the next one.
pub(crate) struct SessionState {
    pub running: AtomicBool,
    pub chunks_read: AtomicU64,
    pub samples_captured: AtomicU64,
    pub inferences: AtomicU64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            chunks_read: AtomicU64::new(0),
            samples_captured: AtomicU64::new(0),
            inferences: AtomicU64::new(0),
        }
    }
}

/// Handle to one running streaming worker.
///
/// Owned by the analyzer; at most one exists per analyzer instance. The
/// worker owns the capture device exclusively, so `stop()` must join before
/// a new session may open another device.
pub(crate) struct StreamingSession {
    state: Arc<SessionState>,
    handle: Option<JoinHandle<()>>,
}

impl StreamingSession {
    pub fn new(state: Arc<SessionState>, handle: JoinHandle<()>) -> Self {
        Self {
            state,
            handle: Some(handle),
        }
    }

    /// Returns `true` once the worker has run to completion (explicit stop
    /// or internal loop-ending failure - either way cleanup has finished).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            chunks_read: self.state.chunks_read.load(Ordering::SeqCst),
            samples_captured: self.state.samples_captured.load(Ordering::SeqCst),
            inferences: self.state.inferences.load(Ordering::SeqCst),
        }
    }

    /// Requests cancellation and waits for the worker to terminate.
    ///
    /// This is a synchronization point, not a fire-and-forget signal: when
    /// it returns, the device has been stopped and released and the terminal
    /// status callback has fired.
    pub async fn stop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.await.is_err() {
                tracing::error!("streaming worker panicked during shutdown");
            }
        }
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        // Dropped without an explicit stop: the flag still ends the worker's
        // loop; cleanup runs on the worker before its handle completes.
        self.state.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_new() {
        let state = SessionState::new();
        assert!(state.running.load(Ordering::SeqCst));
        assert_eq!(state.chunks_read.load(Ordering::SeqCst), 0);
        assert_eq!(state.inferences.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_session_stats_default() {
        let stats = SessionStats::default();
        assert_eq!(stats.chunks_read, 0);
        assert_eq!(stats.samples_captured, 0);
        assert_eq!(stats.inferences, 0);
    }

    #[tokio::test]
    async fn test_stop_joins_worker() {
        let state = Arc::new(SessionState::new());
        let shared = state.clone();
        let handle = tokio::task::spawn_blocking(move || {
            while shared.running.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            shared.chunks_read.store(7, Ordering::SeqCst);
        });

        let mut session = StreamingSession::new(state, handle);
        session.stop().await;

        // The worker's final write happened-before stop() returned.
        assert!(session.is_finished());
        assert_eq!(session.stats().chunks_read, 7);
    }

    #[tokio::test]
    async fn test_stop_twice_is_harmless() {
        let state = Arc::new(SessionState::new());
        let handle = tokio::task::spawn_blocking(|| {});
        let mut session = StreamingSession::new(state, handle);
        session.stop().await;
        session.stop().await;
        assert!(session.is_finished());
    }
}
