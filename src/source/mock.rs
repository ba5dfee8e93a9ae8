//! Scripted capture device for testing without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::AnalyzerError;
use crate::format::f32_to_i16;
use crate::source::CaptureDevice;

/// Observable lifecycle flags shared between a [`MockDevice`] and a test.
///
/// Tests hold a clone of these across the device's move into the analyzer
/// and assert ordering properties - for example that `stopped` was set
/// before a terminal status callback fired.
#[derive(Default)]
pub struct DeviceFlags {
    started: AtomicBool,
    stopped: AtomicBool,
}

impl DeviceFlags {
    /// Returns `true` once `start` has been called.
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Returns `true` once `stop` has been called.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
enum ScriptStep {
    Pcm(Vec<i16>),
    ReadError(i32),
}

/// A deterministic capture device driven by a pre-built script.
///
/// Each `read` consumes one script step: a PCM chunk is copied into the
/// caller's buffer (oversized chunks are delivered across several reads), a
/// scripted error surfaces as [`AnalyzerError::Device`]. Past the end of the
/// script, `read` returns `Ok(0)` - or, in looping mode, replays the script
/// so a streaming session sees continuous audio.
///
/// # Example
///
/// ```
/// use scene_audio::source::{CaptureDevice, MockDevice};
///
/// let mut device = MockDevice::new(32_000);
/// device.push_sine(440.0, 0.5, 2048);
/// device.start().unwrap();
///
/// let mut buf = vec![0i16; 2048];
/// assert_eq!(device.read(&mut buf).unwrap(), 2048);
/// assert_eq!(device.read(&mut buf).unwrap(), 0); // end of stream
/// ```
pub struct MockDevice {
    sample_rate: u32,
    script: VecDeque<ScriptStep>,
    replay: Vec<ScriptStep>,
    looping: bool,
    pace: Option<Duration>,
    fail_start: bool,
    flags: Arc<DeviceFlags>,
}

impl MockDevice {
    /// Creates an empty device at the given sample rate.
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            script: VecDeque::new(),
            replay: Vec::new(),
            looping: false,
            pace: None,
            fail_start: false,
            flags: Arc::new(DeviceFlags::default()),
        }
    }

    /// Returns the shared lifecycle flags.
    #[must_use]
    pub fn flags(&self) -> Arc<DeviceFlags> {
        Arc::clone(&self.flags)
    }

    /// Queues raw PCM samples as one read.
    pub fn push_pcm(&mut self, samples: Vec<i16>) {
        self.script.push_back(ScriptStep::Pcm(samples));
    }

    /// Queues a sine wave at `frequency` Hz with peak `amplitude` in
    /// `[0, 1]`, `samples` samples long.
    pub fn push_sine(&mut self, frequency: f64, amplitude: f64, samples: usize) {
        let rate = f64::from(self.sample_rate);
        let chunk = (0..samples)
            .map(|i| {
                let t = i as f64 / rate;
                let value = (2.0 * std::f64::consts::PI * frequency * t).sin() * amplitude;
                f32_to_i16(value as f32)
            })
            .collect();
        self.script.push_back(ScriptStep::Pcm(chunk));
    }

    /// Queues `samples` samples of silence as one read.
    pub fn push_silence(&mut self, samples: usize) {
        self.script.push_back(ScriptStep::Pcm(vec![0i16; samples]));
    }

    /// Queues a device fault with the given code.
    pub fn push_read_error(&mut self, code: i32) {
        self.script.push_back(ScriptStep::ReadError(code));
    }

    /// Replays the script from the top whenever it runs out, simulating a
    /// device that never stops delivering audio.
    pub fn loop_script(&mut self) {
        self.looping = true;
    }

    /// Sleeps this long at the top of every `read`, pacing the consumer
    /// like a real-time device would.
    pub fn pace(&mut self, pace: Duration) {
        self.pace = Some(pace);
    }

    /// Makes `start` fail, for exercising startup error paths.
    pub fn fail_start(&mut self) {
        self.fail_start = true;
    }
}

impl CaptureDevice for MockDevice {
    fn start(&mut self) -> Result<(), AnalyzerError> {
        if self.fail_start {
            return Err(AnalyzerError::backend("mock device refused to start"));
        }
        if self.looping {
            self.replay = self.script.iter().cloned().collect();
        }
        self.flags.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buf: &mut [i16]) -> Result<usize, AnalyzerError> {
        if let Some(pace) = self.pace {
            std::thread::sleep(pace);
        }
        if self.script.is_empty() && self.looping && !self.replay.is_empty() {
            self.script.extend(self.replay.iter().cloned());
        }
        match self.script.pop_front() {
            None => Ok(0),
            Some(ScriptStep::ReadError(code)) => Err(AnalyzerError::Device { code }),
            Some(ScriptStep::Pcm(mut samples)) => {
                let count = samples.len().min(buf.len());
                buf[..count].copy_from_slice(&samples[..count]);
                if samples.len() > count {
                    samples.drain(..count);
                    self.script.push_front(ScriptStep::Pcm(samples));
                }
                Ok(count)
            }
        }
    }

    fn stop(&mut self) {
        self.flags.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_follow_script_order() {
        let mut device = MockDevice::new(16_000);
        device.push_pcm(vec![1, 2, 3]);
        device.push_read_error(-7);
        device.push_pcm(vec![4]);
        device.start().unwrap();

        let mut buf = vec![0i16; 8];
        assert_eq!(device.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert!(matches!(
            device.read(&mut buf),
            Err(AnalyzerError::Device { code: -7 })
        ));
        assert_eq!(device.read(&mut buf).unwrap(), 1);
        assert_eq!(device.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_oversized_chunk_spans_reads() {
        let mut device = MockDevice::new(16_000);
        device.push_pcm((0..10).collect());
        device.start().unwrap();

        let mut buf = vec![0i16; 4];
        assert_eq!(device.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, vec![0, 1, 2, 3]);
        assert_eq!(device.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, vec![4, 5, 6, 7]);
        assert_eq!(device.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[8, 9]);
        assert_eq!(device.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_sine_has_expected_shape() {
        let mut device = MockDevice::new(32_000);
        device.push_sine(440.0, 0.5, 2048);
        device.start().unwrap();

        let mut buf = vec![0i16; 2048];
        assert_eq!(device.read(&mut buf).unwrap(), 2048);
        assert!(buf.iter().any(|&s| s > 0));
        assert!(buf.iter().any(|&s| s < 0));
        // Peak stays near half scale.
        let peak = buf.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= 16_384);
        assert!(peak > 15_000);
    }

    #[test]
    fn test_looping_replays_script() {
        let mut device = MockDevice::new(16_000);
        device.push_pcm(vec![5, 6]);
        device.loop_script();
        device.start().unwrap();

        let mut buf = vec![0i16; 2];
        for _ in 0..5 {
            assert_eq!(device.read(&mut buf).unwrap(), 2);
            assert_eq!(buf, vec![5, 6]);
        }
    }

    #[test]
    fn test_flags_track_lifecycle() {
        let mut device = MockDevice::new(16_000);
        let flags = device.flags();
        assert!(!flags.started());
        device.start().unwrap();
        assert!(flags.started());
        assert!(!flags.stopped());
        device.stop();
        assert!(flags.stopped());
    }

    #[test]
    fn test_fail_start() {
        let mut device = MockDevice::new(16_000);
        device.fail_start();
        assert!(device.start().is_err());
        assert!(!device.flags().started());
    }
}
