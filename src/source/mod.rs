//! Capture device abstraction and implementations.
//!
//! The analyzer only ever talks to [`CaptureDevice`]; the cpal-backed
//! [`MicDevice`] is the production implementation and [`MockDevice`] is the
//! scripted test double.

mod mic;
mod mock;

pub use mic::MicDevice;
pub use mock::{DeviceFlags, MockDevice};

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::AnalyzerError;

/// A mono 16-bit PCM capture source.
///
/// The contract mirrors a blocking recorder API: `start` begins capture,
/// `read` blocks until it can fill the buffer (bounded by device buffering,
/// never unbounded), and `stop` halts capture. `Ok(0)` from `read` means end
/// of stream. Releasing the underlying resource happens on drop, and
/// implementations must make `stop` idempotent - lifecycle guards may call
/// it on paths where it already ran.
pub trait CaptureDevice: Send {
    /// Begins capturing.
    fn start(&mut self) -> Result<(), AnalyzerError>;

    /// Blocking read of up to `buf.len()` samples into `buf`.
    ///
    /// Returns the number of samples written; `Ok(0)` signals end of
    /// stream. A device fault surfaces as [`AnalyzerError::Device`].
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, AnalyzerError>;

    /// Stops capturing. Idempotent.
    fn stop(&mut self);
}

/// Lists all available input devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_input_devices() -> Result<Vec<String>, AnalyzerError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AnalyzerError::backend(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Gets the name of the default input device, if any.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_doesnt_panic() {
        // May be empty in CI, but must not panic.
        let _ = list_input_devices();
    }

    #[test]
    fn test_default_device_doesnt_panic() {
        let _ = default_input_device_name();
    }
}
