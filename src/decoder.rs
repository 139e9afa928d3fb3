// src/decoder.rs
// End-to-end pipeline: tone detection, spectrogram, threshold, timing, table lookup

use crate::binarize;
use crate::config::DecoderConfig;
use crate::frequency::detect_frequency;
use crate::morse;
use crate::spectrogram::Spectrogram;
use crate::timing;
use anyhow::{Result, bail};
use std::path::Path;

/// Everything the pipeline learned about one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub tokens: String,
    pub frequency_hz: f32,
    /// Whether `frequency_hz` came from the detector rather than the config.
    pub frequency_detected: bool,
    pub dot_seconds: f32,
    /// Present when the dot length was fitted to the recording.
    pub wpm: Option<f32>,
}

/// Intermediate series, kept for tracing.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Samples between consecutive entries of `energies`.
    pub hop: usize,
    pub energies: Vec<f32>,
    pub threshold: f32,
    pub presence: Vec<bool>,
}

pub struct MorseDecoder {
    config: DecoderConfig,
    sample_rate: u32,
    audio_buffer: Vec<f32>,
}

impl MorseDecoder {
    pub fn new(sample_rate: u32, config: DecoderConfig) -> Result<Self> {
        if sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        config.validate()?;
        Ok(Self {
            config,
            sample_rate,
            audio_buffer: Vec::new(),
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Appends a chunk of mono samples to the recording.
    pub fn process(&mut self, chunk: &[f32]) {
        self.audio_buffer.extend_from_slice(chunk);
    }

    /// Decodes everything buffered so far.
    pub fn finalize(&self) -> Result<Decoded> {
        self.finalize_with_analysis().map(|(decoded, _)| decoded)
    }

    /// Like [`finalize`](Self::finalize), also returning the energy series,
    /// threshold and presence signal.
    pub fn finalize_with_analysis(&self) -> Result<(Decoded, Analysis)> {
        let (frequency_hz, frequency_detected) = self.tone_frequency();

        let spectrogram = Spectrogram::new(
            frequency_hz,
            self.sample_rate,
            self.config.window_len,
            self.config.hop,
        )?;
        let energies = spectrogram.compute(&self.audio_buffer);
        let threshold = binarize::threshold(&energies, self.config.threshold_ratio);
        let presence = binarize::binarize(&energies, threshold);
        log::debug!(
            "Threshold {:.4e} over {} steps of {} samples (window {}), {} present",
            threshold,
            presence.len(),
            spectrogram.hop(),
            spectrogram.window_len(),
            presence.iter().filter(|&&on| on).count()
        );

        let timing = timing::analyze(
            &presence,
            spectrogram.hop(),
            self.sample_rate,
            self.config.unit_mode(),
        );
        if let Some(wpm) = timing.wpm() {
            log::info!(
                "Estimated dot length: {:.1} ms ({:.1} WPM)",
                timing.dot_seconds * 1000.0,
                wpm
            );
        }

        let wpm = timing.wpm();
        let text = morse::decode(&timing.tokens);
        let decoded = Decoded {
            text,
            tokens: timing.tokens,
            frequency_hz,
            frequency_detected,
            dot_seconds: timing.dot_seconds,
            wpm,
        };
        Ok((
            decoded,
            Analysis {
                hop: spectrogram.hop(),
                energies,
                threshold,
                presence,
            },
        ))
    }

    fn tone_frequency(&self) -> (f32, bool) {
        if !self.config.detect_frequency {
            return (self.config.default_frequency_hz, false);
        }
        match detect_frequency(&self.audio_buffer, self.sample_rate, self.config.band) {
            Some(estimate) => {
                log::info!(
                    "Estimated pitch: {:.2} Hz (power {:.3e})",
                    estimate.frequency_hz,
                    estimate.power
                );
                (estimate.frequency_hz, true)
            }
            None => {
                log::warn!(
                    "No frequency bins in {:.0}..{:.0} Hz, using {:.1} Hz",
                    self.config.band.min_hz,
                    self.config.band.max_hz,
                    self.config.default_frequency_hz
                );
                (self.config.default_frequency_hz, false)
            }
        }
    }
}

/// Decodes a whole mono recording in one call.
pub fn decode_samples(
    samples: &[f32],
    sample_rate: u32,
    config: &DecoderConfig,
) -> Result<Decoded> {
    let mut decoder = MorseDecoder::new(sample_rate, config.clone())?;
    decoder.process(samples);
    decoder.finalize()
}

pub fn decode_wav_file<P: AsRef<Path>>(path: P, config: &DecoderConfig) -> Result<Decoded> {
    let (samples, sample_rate) = crate::audio::read_wav_mono(path)?;
    decode_samples(&samples, sample_rate, config)
}
