//! Error types for scene-audio.
//!
//! One taxonomy covers both capture modes, but severity depends on the mode:
//! a device read failure or a gate rejection aborts a one-shot capture, while
//! the streaming loop reports it through the error callback and keeps
//! running. Classifier failures end whichever invocation raised them.

/// Errors surfaced by capture and classification.
///
/// Every variant renders a human-readable cause. Cleanup of the capture
/// device is guaranteed on all error paths, so callers never need to release
/// anything after receiving one of these.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The capture device reported a read failure.
    ///
    /// Fatal in one-shot capture. In streaming mode it is delivered through
    /// the error callback and the loop continues (transient device hiccups
    /// are not fatal there).
    #[error("audio device read failed with code {code}")]
    Device {
        /// The device-reported error code.
        code: i32,
    },

    /// The device produced no samples at all before signalling end of stream.
    #[error("no samples captured from the input device")]
    NoSamplesCaptured,

    /// The captured audio was too quiet to classify meaningfully.
    ///
    /// Classifying near-silence wastes inference cost and produces
    /// misleading labels, so the window is rejected before the classifier
    /// runs. Streaming sessions report this and keep listening.
    #[error("signal level {level:.6} below silence threshold {threshold:.6}")]
    LowSignal {
        /// Mean absolute amplitude of the rejected window.
        level: f32,
        /// The configured silence threshold.
        threshold: f32,
    },

    /// The classifier collaborator failed.
    ///
    /// Ends the current invocation; in streaming mode the loop tears down
    /// after reporting it.
    #[error("classifier failure: {reason}")]
    Classifier {
        /// Description of what went wrong.
        reason: String,
    },

    /// The requested input device was not found.
    #[error("input device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// No default input device is configured on this system.
    #[error("no default input device configured")]
    NoDefaultDevice,

    /// The device's sample format is not supported.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// No classifier was configured before building the analyzer.
    #[error("no classifier configured - provide one with SceneAnalyzerBuilder::classifier()")]
    NoClassifierConfigured,

    /// An error from the underlying audio backend.
    #[error("audio backend error: {0}")]
    Backend(String),
}

impl AnalyzerError {
    /// Creates a classifier error with the given reason.
    pub fn classifier(reason: impl Into<String>) -> Self {
        Self::Classifier {
            reason: reason.into(),
        }
    }

    /// Creates a backend error with the given message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_display() {
        let err = AnalyzerError::Device { code: -3 };
        assert_eq!(err.to_string(), "audio device read failed with code -3");
    }

    #[test]
    fn test_low_signal_display_carries_both_levels() {
        let err = AnalyzerError::LowSignal {
            level: 0.00005,
            threshold: 0.0001,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("0.000050"));
        assert!(rendered.contains("0.000100"));
    }

    #[test]
    fn test_classifier_helper() {
        let err = AnalyzerError::classifier("model file missing");
        assert_eq!(err.to_string(), "classifier failure: model file missing");
    }

    #[test]
    fn test_backend_helper() {
        let err = AnalyzerError::backend("stream build failed");
        assert_eq!(err.to_string(), "audio backend error: stream build failed");
    }
}
