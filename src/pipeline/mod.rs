//! The capture-to-classification pipeline.
//!
//! `window` turns a stream of PCM chunks into fixed-length classification
//! windows; `gate` rejects near-silent windows; `engine` drives the cadence
//! of the streaming loop; `oneshot` is the single fixed-duration
//! capture-then-classify path.

mod engine;
mod gate;
mod oneshot;
mod window;

pub(crate) use engine::run_stream_loop;
pub(crate) use oneshot::capture_and_classify;
