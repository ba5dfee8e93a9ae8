//! Amplitude gate suppressing classification of near-silent audio.

/// Mean absolute amplitude over the first `captured` samples.
///
/// Only genuinely captured samples count - zero-padding in a short one-shot
/// window would otherwise drag the mean down and reject real audio. Returns
/// 0.0 when nothing was captured.
pub(crate) fn mean_abs_level(samples: &[f32], captured: usize) -> f32 {
    let captured = captured.min(samples.len());
    if captured == 0 {
        return 0.0;
    }
    let sum: f32 = samples[..captured].iter().map(|s| s.abs()).sum();
    sum / captured as f32
}

/// Returns `true` when the window should be rejected as silence.
///
/// The boundary is exclusive-below: a level sitting exactly at the threshold
/// passes. A zero-capture window always rejects.
pub(crate) fn is_silent(level: f32, captured: usize, threshold: f32) -> bool {
    captured == 0 || level < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 1e-4;

    #[test]
    fn test_all_zero_window_rejected() {
        let window = vec![0.0f32; 1000];
        let level = mean_abs_level(&window, window.len());
        assert!(is_silent(level, window.len(), THRESHOLD));
    }

    #[test]
    fn test_exactly_at_threshold_passes() {
        let window = vec![THRESHOLD; 1000];
        let level = mean_abs_level(&window, window.len());
        assert_eq!(level, THRESHOLD);
        assert!(!is_silent(level, window.len(), THRESHOLD));
    }

    #[test]
    fn test_single_full_scale_sample_averaged_below_threshold_rejected() {
        // One full-scale sample among 20k zeros: mean 5e-5, under the gate.
        let mut window = vec![0.0f32; 20_000];
        window[0] = 1.0;
        let level = mean_abs_level(&window, window.len());
        assert!(level < THRESHOLD);
        assert!(is_silent(level, window.len(), THRESHOLD));
    }

    #[test]
    fn test_zero_captured_rejected_regardless_of_content() {
        let window = vec![1.0f32; 100];
        assert!(is_silent(mean_abs_level(&window, 0), 0, THRESHOLD));
    }

    #[test]
    fn test_padding_excluded_from_mean() {
        // 100 loud samples then padding: the mean over the captured prefix
        // must ignore the zeros.
        let mut window = vec![0.0f32; 1000];
        for slot in window.iter_mut().take(100) {
            *slot = 0.5;
        }
        assert_eq!(mean_abs_level(&window, 100), 0.5);
        assert!(mean_abs_level(&window, 1000) < 0.5);
    }

    #[test]
    fn test_negative_amplitudes_count() {
        let window = vec![-0.25f32; 64];
        assert_eq!(mean_abs_level(&window, 64), 0.25);
    }
}
