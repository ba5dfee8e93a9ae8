//! Capture and classification configuration.

use std::time::Duration;

/// Configuration for a [`SceneAnalyzer`](crate::SceneAnalyzer).
///
/// The defaults are the supported operating point: 32 kHz mono capture, a
/// 10-second classification window, 2048-sample streaming chunks, a 2000 ms
/// inference cadence, and a mean-absolute silence threshold of 1e-4. These
/// values are not negotiated with the device at runtime - the microphone
/// source converts whatever the hardware natively delivers into the
/// configured format.
///
/// # Example
///
/// ```
/// use scene_audio::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.window_samples(), 320_000);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Capture sample rate in Hz.
    pub sample_rate: u32,

    /// Duration of the sliding classification window.
    ///
    /// Together with `sample_rate` this fixes the classifier's input length;
    /// one-shot captures shorter than this are zero-padded at the tail.
    pub window: Duration,

    /// Number of PCM samples per streaming read.
    ///
    /// Independent of the window length. The device-side buffer is sized
    /// against this so capture keeps up while inference runs.
    pub chunk_samples: usize,

    /// Minimum wall-clock spacing between classification attempts in
    /// streaming mode. A gate-rejected window still consumes its slot.
    pub inference_interval: Duration,

    /// Mean absolute amplitude below which a window is rejected as silence.
    ///
    /// The boundary is exclusive: a window sitting exactly at the threshold
    /// is classified.
    pub silence_threshold: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 32_000,
            window: Duration::from_secs(10),
            chunk_samples: 2048,
            inference_interval: Duration::from_millis(2000),
            silence_threshold: 1e-4,
        }
    }
}

impl AnalyzerConfig {
    /// Returns the classification window length in samples.
    #[must_use]
    pub fn window_samples(&self) -> usize {
        (f64::from(self.sample_rate) * self.window.as_secs_f64()) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.sample_rate, 32_000);
        assert_eq!(config.window, Duration::from_secs(10));
        assert_eq!(config.chunk_samples, 2048);
        assert_eq!(config.inference_interval, Duration::from_millis(2000));
        assert_eq!(config.silence_threshold, 1e-4);
    }

    #[test]
    fn test_window_samples() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.window_samples(), 320_000);
    }

    #[test]
    fn test_window_samples_subsecond() {
        let config = AnalyzerConfig {
            sample_rate: 8000,
            window: Duration::from_millis(500),
            ..Default::default()
        };
        assert_eq!(config.window_samples(), 4000);
    }
}
