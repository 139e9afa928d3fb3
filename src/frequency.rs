// src/frequency.rs
// Dominant tone detection from a whole-recording periodogram

use crate::config::FrequencyBand;
use rustfft::{FftPlanner, num_complex::Complex};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEstimate {
    pub frequency_hz: f32,
    /// Power spectral density at `frequency_hz`, in units²/Hz.
    pub power: f32,
}

/// One-sided power spectral density of `samples`, one value per bin `k`
/// at frequency `k * sample_rate / N`.
pub fn periodogram(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let n = samples.len();
    if n == 0 || sample_rate == 0 {
        return Vec::new();
    }

    let mean = samples.iter().sum::<f32>() / n as f32;
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .map(|&s| Complex::new(s - mean, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let scale = 1.0 / (sample_rate as f32 * n as f32);
    let nyquist = n.is_multiple_of(2).then_some(n / 2);
    buffer
        .iter()
        .take(n / 2 + 1)
        .enumerate()
        .map(|(k, v)| {
            let p = v.norm_sqr() * scale;
            if k == 0 || Some(k) == nyquist {
                p
            } else {
                2.0 * p
            }
        })
        .collect()
}

/// Finds the strongest periodogram bin inside `band`.
///
/// Returns `None` for empty input or when no bin falls inside the band.
/// A silent recording still yields an in-band bin, with zero power.
pub fn detect_frequency(
    samples: &[f32],
    sample_rate: u32,
    band: FrequencyBand,
) -> Option<ToneEstimate> {
    let psd = periodogram(samples, sample_rate);
    if psd.is_empty() {
        return None;
    }

    let n = samples.len() as f32;
    let df = sample_rate as f32 / n;
    let lo = (band.min_hz / df).ceil().max(0.0) as usize;
    let hi = ((band.max_hz / df).floor() as usize).min(psd.len() - 1);
    if lo > hi {
        log::debug!(
            "No periodogram bins inside {:.1}..{:.1} Hz (resolution {:.2} Hz)",
            band.min_hz,
            band.max_hz,
            df
        );
        return None;
    }

    let (idx, power) = psd[lo..=hi]
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |(max_i, max_p), (i, &p)| {
            if p > max_p {
                (i, p)
            } else {
                (max_i, max_p)
            }
        });
    let k = lo + idx;
    // Rounding at the band edges can land a hair outside.
    let frequency_hz = (k as f32 * df).clamp(band.min_hz, band.max_hz);
    Some(ToneEstimate {
        frequency_hz,
        power,
    })
}
