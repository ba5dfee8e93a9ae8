//! Sample format, channel, and rate conversion.
//!
//! The microphone source uses these to turn whatever the hardware natively
//! delivers (interleaved multi-channel, i16 or f32, arbitrary rate) into the
//! configured mono 16-bit stream. Resampling is linear interpolation, which
//! is adequate for classification input.

/// Converts an f32 sample in `[-1.0, 1.0]` to i16, clamping out-of-range
/// values.
///
/// Scales by 32767 (not 32768) so the mapping is symmetric: -1.0 becomes
/// -32767 rather than -32768.
#[inline]
#[must_use]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Converts an i16 PCM sample to a normalized f32.
///
/// Divides by `i16::MAX` so a full-scale positive sample maps to exactly
/// 1.0; `i16::MIN` lands just below -1.0.
#[inline]
#[must_use]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / f32::from(i16::MAX)
}

/// Downmixes interleaved multi-channel PCM to mono by averaging each frame.
///
/// A trailing partial frame is dropped. `channels <= 1` returns the input
/// unchanged.
#[must_use]
pub fn downmix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().copied().map(i32::from).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Resamples mono PCM from one rate to another by linear interpolation.
#[must_use]
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let step = f64::from(from_rate) / f64::from(to_rate);
    let output_len = (samples.len() as f64 / step).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let position = i as f64 * step;
        let index = position as usize;
        match samples.get(index + 1) {
            Some(&next) => {
                let frac = position - index as f64;
                let current = f64::from(samples[index]);
                output.push((current + (f64::from(next) - current) * frac) as i16);
            }
            // Past the last interpolation pair: hold the final sample.
            None => output.push(samples[samples.len() - 1]),
        }
    }

    output
}
