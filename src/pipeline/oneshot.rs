//! One-shot fixed-duration capture and classification.

use parking_lot::Mutex;

use crate::classify::SceneClassifier;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::format::i16_to_f32;
use crate::pipeline::gate::{is_silent, mean_abs_level};
use crate::scene::SceneResult;
use crate::source::CaptureDevice;

/// Captures exactly one window of audio and classifies it.
///
/// Reads until the window is full or the device signals end of stream, then
/// zero-pads the tail. The gate runs over only the samples actually read.
/// Device read errors are fatal here, and the device is stopped and released
/// on every exit path.
pub(crate) fn capture_and_classify(
    device: Box<dyn CaptureDevice>,
    config: &AnalyzerConfig,
    classifier: &Mutex<Box<dyn SceneClassifier>>,
) -> Result<SceneResult, AnalyzerError> {
    let mut device = StopOnDrop::new(device);
    device.get().start()?;

    let window_len = config.window_samples();
    let mut pcm = vec![0i16; window_len];
    let mut total = 0usize;
    while total < window_len {
        let read = device.get().read(&mut pcm[total..])?;
        if read == 0 {
            break;
        }
        total += read;
    }

    if total == 0 {
        return Err(AnalyzerError::NoSamplesCaptured);
    }

    // Normalize the captured prefix; the tail stays zero-padded.
    let mut window = vec![0.0f32; window_len];
    for (slot, &sample) in window.iter_mut().zip(&pcm[..total]) {
        *slot = i16_to_f32(sample);
    }

    let level = mean_abs_level(&window, total);
    if is_silent(level, total, config.silence_threshold) {
        return Err(AnalyzerError::LowSignal {
            level,
            threshold: config.silence_threshold,
        });
    }

    tracing::debug!(captured = total, level, "window captured; classifying");
    classifier.lock().classify(&window)
}

/// Guarantees the device is stopped (and released, on drop) on every exit
/// path out of the capture, early `?` returns included.
struct StopOnDrop {
    device: Box<dyn CaptureDevice>,
}

impl StopOnDrop {
    fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self { device }
    }

    fn get(&mut self) -> &mut dyn CaptureDevice {
        &mut *self.device
    }
}

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.device.stop();
    }
}
