//! Fixed-capacity circular window over the most recent audio.

use crate::format::i16_to_f32;

/// Circular store holding the most recent `capacity` normalized samples.
///
/// The write cursor always points at the next slot to overwrite, which is
/// also the oldest sample once the buffer has wrapped. A snapshot therefore
/// reads `capacity` samples starting at the cursor, producing strict
/// chronological order regardless of where the cursor sits.
///
/// Writer and snapshot reader run sequenced on one worker, so the buffer
/// needs no interior locking.
pub(crate) struct WindowBuffer {
    samples: Vec<f32>,
    write_pos: usize,
    wrapped: bool,
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            samples: vec![0.0; capacity],
            write_pos: 0,
            wrapped: false,
        }
    }

    /// Appends a PCM chunk, normalizing each sample and overwriting the
    /// oldest data once full.
    pub fn push_pcm(&mut self, pcm: &[i16]) {
        for &sample in pcm {
            self.samples[self.write_pos] = i16_to_f32(sample);
            self.write_pos = (self.write_pos + 1) % self.samples.len();
            if self.write_pos == 0 {
                self.wrapped = true;
            }
        }
    }

    /// Returns `true` once at least `capacity` samples have been written.
    ///
    /// Snapshots are only meaningful after this; before the first wrap the
    /// tail of the buffer is still zero-fill, not audio.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Materializes the window in chronological order, oldest sample first.
    pub fn snapshot(&self) -> Vec<f32> {
        let mut window = Vec::with_capacity(self.samples.len());
        window.extend_from_slice(&self.samples[self.write_pos..]);
        window.extend_from_slice(&self.samples[..self.write_pos]);
        window
    }
}
