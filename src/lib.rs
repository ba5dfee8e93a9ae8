//! # scene-audio
//!
//! Acoustic scene analysis over live microphone capture.
//!
//! `scene-audio` continuously samples mono 16-bit PCM, maintains a sliding
//! classification window, gates near-silent audio, and hands windows to a
//! pluggable classifier, reporting ranked scene labels back to the caller.
//! Two capture modes share one analyzer: a one-shot fixed-duration
//! capture-then-classify call, and a streaming mode that re-classifies the
//! most recent window on a fixed cadence until stopped.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scene_audio::{SceneAnalyzer, StreamCallbacks};
//!
//! let mut analyzer = SceneAnalyzer::builder()
//!     .classifier(my_classifier)   // anything implementing SceneClassifier
//!     .build()?;
//!
//! // One-shot: record 10 seconds, classify once.
//! let result = analyzer.capture_and_classify().await?;
//! println!("{result}");
//!
//! // Streaming: re-classify every 2 seconds until stopped.
//! let (callbacks, mut updates) = StreamCallbacks::channel();
//! analyzer.start_streaming(callbacks)?;
//! while let Some(update) = updates.recv().await {
//!     println!("{update:?}");
//! }
//! analyzer.stop_streaming().await; // joins the worker; device released
//! ```
//!
//! ## Architecture
//!
//! The streaming path keeps a strict single-worker discipline:
//!
//! - **cpal thread**: the audio callback converts native format to mono PCM
//!   and pushes into a lock-free SPSC ring - it never blocks.
//! - **Session worker**: one blocking task drains the ring in fixed chunks,
//!   feeds the sliding window, and runs the silence gate and classifier
//!   serially. It is the window's only reader and writer, so the window
//!   needs no locks.
//! - **Callbacks**: deliveries are opaque `Send + Sync` handles; callers
//!   needing a specific execution context route them through
//!   [`StreamCallbacks::channel`].
//!
//! Cancellation is cooperative (a running flag checked per iteration) and
//! `stop_streaming` joins the worker, so it doubles as the guarantee that
//! the microphone has been released.

// Audio code requires intentional numeric casts between sample formats
#![warn(missing_docs)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod analyzer;
pub mod classify;
mod config;
mod error;
mod event;
pub mod format;
mod pipeline;
mod scene;
mod session;
pub mod source;

pub use analyzer::{SceneAnalyzer, SceneAnalyzerBuilder};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use event::{
    ErrorCallback, ResultCallback, StatusCallback, StreamCallbacks, StreamStatus, StreamUpdate,
};
pub use scene::{Prediction, SceneResult};
pub use session::SessionStats;
