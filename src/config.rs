// src/config.rs
// Decoder configuration

use anyhow::{Result, bail};

/// Dot length used when WPM detection is off (20 WPM).
pub const DEFAULT_DOT_SECONDS: f32 = 0.06;
pub const DEFAULT_FREQUENCY_HZ: f32 = 800.0;
pub const DEFAULT_WINDOW_LEN: usize = 2048;
pub const DEFAULT_HOP: usize = 64;
pub const DEFAULT_THRESHOLD_RATIO: f32 = 0.5;

/// Frequency range searched by the tone detector, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    pub min_hz: f32,
    pub max_hz: f32,
}

impl FrequencyBand {
    pub fn new(min_hz: f32, max_hz: f32) -> Self {
        Self { min_hz, max_hz }
    }

    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self::new(700.0, 1100.0)
    }
}

/// How the timing analyzer obtains the dot length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitMode {
    /// Fit the dot length to the observed gaps, starting from `seed` seconds.
    Estimate { seed: f32 },
    /// Use a fixed dot length in seconds.
    Fixed(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Run the tone detector; otherwise `default_frequency_hz` is used.
    pub detect_frequency: bool,
    /// Estimate the dot length (and so the WPM) from the recording.
    pub detect_wpm: bool,
    pub default_frequency_hz: f32,
    pub default_dot_seconds: f32,
    pub band: FrequencyBand,
    /// Analysis window length in samples.
    pub window_len: usize,
    /// Step between analysis windows in samples.
    pub hop: usize,
    /// Presence threshold as a fraction of the mean energy.
    pub threshold_ratio: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            detect_frequency: true,
            detect_wpm: false,
            default_frequency_hz: DEFAULT_FREQUENCY_HZ,
            default_dot_seconds: DEFAULT_DOT_SECONDS,
            band: FrequencyBand::default(),
            window_len: DEFAULT_WINDOW_LEN,
            hop: DEFAULT_HOP,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
        }
    }
}

impl DecoderConfig {
    /// Pins the tone frequency and turns detection off.
    pub fn with_frequency(mut self, frequency_hz: f32) -> Self {
        self.detect_frequency = false;
        self.default_frequency_hz = frequency_hz;
        self
    }

    pub fn with_detect_wpm(mut self, detect_wpm: bool) -> Self {
        self.detect_wpm = detect_wpm;
        self
    }

    pub fn with_window(mut self, window_len: usize, hop: usize) -> Self {
        self.window_len = window_len;
        self.hop = hop;
        self
    }

    pub fn unit_mode(&self) -> UnitMode {
        if self.detect_wpm {
            UnitMode::Estimate {
                seed: self.default_dot_seconds,
            }
        } else {
            UnitMode::Fixed(self.default_dot_seconds)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_len == 0 {
            bail!("Analysis window length must be at least one sample");
        }
        if self.hop == 0 {
            bail!("Hop size must be at least one sample");
        }
        if !(self.default_dot_seconds.is_finite() && self.default_dot_seconds > 0.0) {
            bail!(
                "Dot length must be a positive number of seconds, got {}",
                self.default_dot_seconds
            );
        }
        if !(self.threshold_ratio.is_finite() && self.threshold_ratio >= 0.0) {
            bail!(
                "Threshold ratio must be a non-negative number, got {}",
                self.threshold_ratio
            );
        }
        if !(self.default_frequency_hz.is_finite() && self.default_frequency_hz >= 0.0) {
            bail!(
                "Tone frequency must be a non-negative number, got {}",
                self.default_frequency_hz
            );
        }
        if !(self.band.min_hz >= 0.0 && self.band.min_hz <= self.band.max_hz) {
            bail!(
                "Invalid frequency band {:.1}..{:.1} Hz",
                self.band.min_hz,
                self.band.max_hz
            );
        }
        Ok(())
    }
}
