//! cpal-backed microphone capture.
//!
//! cpal delivers audio by callback on its own high-priority thread; this
//! module bridges that push model to the blocking-pull [`CaptureDevice`]
//! contract through a lock-free SPSC ring. The callback converts whatever
//! the device natively produces (i16 or f32, any channel count, any rate)
//! into mono 16-bit PCM at the configured rate and pushes it; `read` drains
//! the consumer side with a bounded park-and-retry.
//!
//! cpal streams cannot move between threads, so the stream lives on a
//! dedicated thread that parks until `stop` signals it to drop the stream.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::format::{downmix_to_mono, f32_to_i16, resample};
use crate::source::CaptureDevice;

/// How long `read` parks between drain attempts while waiting for samples.
const READ_POLL: Duration = Duration::from_millis(2);

/// A microphone implementing [`CaptureDevice`] over cpal.
pub struct MicDevice {
    device: cpal::Device,
    sample_rate: u32,
    chunk_samples: usize,
    consumer: Option<HeapCons<i16>>,
    worker: Option<StreamWorker>,
}

/// Control handle for the thread that owns the cpal stream.
struct StreamWorker {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl MicDevice {
    /// Opens the system default input device.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NoDefaultDevice`] if none is configured.
    pub fn open_default(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AnalyzerError::NoDefaultDevice)?;
        Ok(Self::from_device(device, config))
    }

    /// Opens a specific input device by name.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::DeviceNotFound`] if no device matches.
    pub fn open_by_name(name: &str, config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| AnalyzerError::backend(e.to_string()))?;
        for device in devices {
            if device.name().map(|n| n == name).unwrap_or(false) {
                return Ok(Self::from_device(device, config));
            }
        }
        Err(AnalyzerError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    fn from_device(device: cpal::Device, config: &AnalyzerConfig) -> Self {
        Self {
            device,
            sample_rate: config.sample_rate,
            chunk_samples: config.chunk_samples,
            consumer: None,
            worker: None,
        }
    }

    /// Returns the device name, or a placeholder when it cannot be queried.
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    /// Ring capacity: a full second of audio, but never less than two
    /// chunks, so capture keeps flowing while a classification runs.
    fn ring_capacity(&self) -> usize {
        (self.sample_rate as usize).max(2 * self.chunk_samples)
    }
}

impl CaptureDevice for MicDevice {
    fn start(&mut self) -> Result<(), AnalyzerError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let ring = HeapRb::<i16>::new(self.ring_capacity());
        let (producer, consumer) = ring.split();
        self.consumer = Some(consumer);

        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let device = self.device.clone();
        let target_rate = self.sample_rate;

        let handle = thread::spawn(move || {
            let stream = match build_input_stream(&device, target_rate, producer) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            if let Err(err) = stream.play() {
                let _ = ready_tx.send(Err(AnalyzerError::backend(err.to_string())));
                return;
            }
            let _ = ready_tx.send(Ok(()));
            // Park here owning the stream; capture runs in cpal's callback.
            let _ = stop_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!(device = %self.name(), "microphone capture started");
                self.worker = Some(StreamWorker { stop_tx, handle });
                Ok(())
            }
            Ok(Err(err)) => {
                let _ = handle.join();
                self.consumer = None;
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                self.consumer = None;
                Err(AnalyzerError::backend("capture thread exited during start"))
            }
        }
    }

    fn read(&mut self, buf: &mut [i16]) -> Result<usize, AnalyzerError> {
        let consumer = self
            .consumer
            .as_mut()
            .ok_or_else(|| AnalyzerError::backend("device not started"))?;

        let mut filled = 0;
        while filled < buf.len() {
            filled += consumer.pop_slice(&mut buf[filled..]);
            if filled == buf.len() {
                break;
            }
            match &self.worker {
                // Stream alive: wait for the callback to deliver more.
                Some(worker) if !worker.handle.is_finished() => thread::sleep(READ_POLL),
                // Stream gone: whatever we drained is the end of it.
                _ => break,
            }
        }
        Ok(filled)
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
            tracing::info!(device = %self.name(), "microphone capture stopped");
        }
        self.consumer = None;
    }
}

impl Drop for MicDevice {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builds the cpal input stream, converting callback data to mono PCM at
/// `target_rate` and pushing it into the ring.
///
/// A full ring drops the newest samples; the reader is expected to keep up
/// within the ring's one-second budget.
fn build_input_stream(
    device: &cpal::Device,
    target_rate: u32,
    mut producer: HeapProd<i16>,
) -> Result<cpal::Stream, AnalyzerError> {
    let supported = device
        .default_input_config()
        .map_err(|e| AnalyzerError::backend(e.to_string()))?;
    let sample_format = supported.sample_format();
    let stream_config: StreamConfig = supported.into();
    let native_rate = stream_config.sample_rate.0;
    let channels = usize::from(stream_config.channels.max(1));

    tracing::debug!(
        ?sample_format,
        native_rate,
        channels,
        target_rate,
        "building input stream"
    );

    let err_fn = |err| tracing::error!("audio stream error: {err}");

    let stream = match sample_format {
        SampleFormat::I16 => device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = downmix_to_mono(data, channels);
                    let converted = resample(&mono, native_rate, target_rate);
                    let _ = producer.push_slice(&converted);
                },
                err_fn,
                None,
            )
            .map_err(|e| AnalyzerError::backend(e.to_string()))?,
        SampleFormat::F32 => device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let pcm: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                    let mono = downmix_to_mono(&pcm, channels);
                    let converted = resample(&mono, native_rate, target_rate);
                    let _ = producer.push_slice(&converted);
                },
                err_fn,
                None,
            )
            .map_err(|e| AnalyzerError::backend(e.to_string()))?,
        format => {
            return Err(AnalyzerError::UnsupportedFormat {
                format: format!("{format:?}"),
            });
        }
    };

    Ok(stream)
}
