// src/spectrogram.rs
// Single-frequency short-time energy, one value per hop

use anyhow::{Result, bail};
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;

/// Periodic (non-symmetric) Hann window of length `len`.
pub fn hann_periodic(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / len as f32).cos()))
        .collect()
}

/// One bin of a short-time Fourier transform, evaluated only at the tone
/// frequency.
///
/// The window and the complex exponential are folded into a single kernel so
/// every frame is a plain dot product against the samples.
pub struct Spectrogram {
    kernel: Vec<Complex<f32>>,
    hop: usize,
    sample_rate: u32,
}

impl Spectrogram {
    pub fn new(
        frequency_hz: f32,
        sample_rate: u32,
        window_len: usize,
        hop: usize,
    ) -> Result<Self> {
        if sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        if window_len == 0 || hop == 0 {
            bail!("Window length ({window_len}) and hop ({hop}) must be positive");
        }
        let omega = -2.0 * PI * frequency_hz / sample_rate as f32;
        let kernel = hann_periodic(window_len)
            .into_iter()
            .enumerate()
            .map(|(n, w)| Complex::from_polar(w, omega * n as f32))
            .collect();
        Ok(Self {
            kernel,
            hop,
            sample_rate,
        })
    }

    pub fn window_len(&self) -> usize {
        self.kernel.len()
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of frames for `sample_count` samples: `(N - W + 1) / hop`.
    pub fn frame_count(&self, sample_count: usize) -> usize {
        if sample_count < self.kernel.len() {
            return 0;
        }
        (sample_count - self.kernel.len() + 1) / self.hop
    }

    /// Squared magnitude of the windowed transform of the `W` samples starting
    /// at `start`, normalized by the sample rate.
    pub fn energy_at(&self, samples: &[f32], start: usize) -> f32 {
        let segment = &samples[start..start + self.kernel.len()];
        let sum: Complex<f32> = segment
            .iter()
            .zip(&self.kernel)
            .map(|(&s, &k)| k * s)
            .sum();
        (sum / self.sample_rate as f32).norm_sqr()
    }

    /// Computes every frame in parallel. Frame `i` covers samples
    /// `i * hop .. i * hop + W`.
    pub fn compute(&self, samples: &[f32]) -> Vec<f32> {
        let frames = self.frame_count(samples.len());
        let mut energies = vec![0.0f32; frames];
        energies
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = self.energy_at(samples, i * self.hop));
        log::debug!(
            "Computed {} spectrogram frames (W = {}, hop = {})",
            frames,
            self.kernel.len(),
            self.hop
        );
        energies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn hann_is_periodic() {
        let w = hann_periodic(8);
        assert_eq!(w[0], 0.0);
        assert!((w[4] - 1.0).abs() < 1e-6);
        // Periodic variant does not return to zero at the last sample.
        assert!(w[7] > 0.1);
    }

    #[test]
    fn frame_count_matches_formula() {
        let spec = Spectrogram::new(800.0, 48000, 2048, 64).unwrap();
        assert_eq!(spec.window_len(), 2048);
        assert_eq!(spec.hop(), 64);
        assert_eq!(spec.frame_count(0), 0);
        assert_eq!(spec.frame_count(2047), 0);
        assert_eq!(spec.frame_count(2048), 0);
        assert_eq!(spec.frame_count(2048 + 63), 1);
        assert_eq!(spec.frame_count(48000), (48000 - 2048 + 1) / 64);
        let frames = spec.compute(&[0.0; 48000]);
        assert_eq!(frames.len(), (48000 - 2048 + 1) / 64);
    }

    #[test]
    fn tone_energy_dominates_off_frequency() {
        let samples = tone(800.0, 12000, 4096);
        let on = Spectrogram::new(800.0, 12000, 512, 16).unwrap();
        let off = Spectrogram::new(1100.0, 12000, 512, 16).unwrap();
        let e_on = on.energy_at(&samples, 0);
        let e_off = off.energy_at(&samples, 0);
        assert!(e_on > 100.0 * e_off, "on {e_on}, off {e_off}");
    }

    #[test]
    fn parallel_frames_match_sequential() {
        let samples = tone(750.0, 8000, 3000);
        let spec = Spectrogram::new(750.0, 8000, 256, 32).unwrap();
        let parallel = spec.compute(&samples);
        let sequential: Vec<f32> = (0..spec.frame_count(samples.len()))
            .map(|i| spec.energy_at(&samples, i * 32))
            .collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn silence_has_zero_energy() {
        let spec = Spectrogram::new(900.0, 12000, 256, 16).unwrap();
        assert!(spec.compute(&[0.0; 1024]).iter().all(|&e| e == 0.0));
    }

    #[test]
    fn rejects_zero_hop() {
        assert!(Spectrogram::new(800.0, 48000, 2048, 0).is_err());
        assert!(Spectrogram::new(800.0, 0, 2048, 64).is_err());
    }
}
