// src/generator.rs
// Ideal-timing Morse tone synthesis, for tests and fixtures

use crate::audio;
use crate::morse::encode_char;
use anyhow::Result;
use std::f64::consts::PI;
use std::path::Path;

// Silence before the first and after the last element, in dots.
const LEAD_IN_DOTS: f32 = 1.0;
const TAIL_DOTS: f32 = 7.0;
// 50% amplitude to avoid clipping.
const AMPLITUDE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseElement {
    Dot,
    Dash,
    ElementGap,
    LetterGap,
    WordGap,
}

impl MorseElement {
    /// Length in dots.
    pub fn units(self) -> f32 {
        match self {
            MorseElement::Dot | MorseElement::ElementGap => 1.0,
            MorseElement::Dash | MorseElement::LetterGap => 3.0,
            MorseElement::WordGap => 7.0,
        }
    }

    pub fn is_tone(self) -> bool {
        matches!(self, MorseElement::Dot | MorseElement::Dash)
    }
}

pub struct MorseGenerator {
    sample_rate: u32,
    frequency: f32,
    dot_duration: f32,
}

impl MorseGenerator {
    pub fn new(sample_rate: u32, frequency: f32, wpm: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            dot_duration: crate::timing::dot_seconds_for_wpm(wpm),
        }
    }

    pub fn dot_duration(&self) -> f32 {
        self.dot_duration
    }

    /// Renders `text` as mono samples, with a short lead-in and a word-gap tail.
    /// Characters missing from the Morse table are skipped.
    pub fn synthesize(&self, text: &str) -> Vec<f32> {
        let mut samples = Vec::new();
        self.push_silence(&mut samples, LEAD_IN_DOTS * self.dot_duration);
        for element in text_to_morse(text) {
            let duration = element.units() * self.dot_duration;
            if element.is_tone() {
                self.push_tone(&mut samples, duration);
            } else {
                self.push_silence(&mut samples, duration);
            }
        }
        self.push_silence(&mut samples, TAIL_DOTS * self.dot_duration);
        samples
    }

    pub fn generate_wav_file<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<()> {
        audio::write_wav_mono(path, &self.synthesize(text), self.sample_rate)
    }

    fn sample_count(&self, duration: f32) -> usize {
        (duration * self.sample_rate as f32).round() as usize
    }

    fn push_tone(&self, samples: &mut Vec<f32>, duration: f32) {
        // Keyed oscillator: phase runs on through silences.
        let start = samples.len();
        let n = self.sample_count(duration);
        let step = 2.0 * PI * self.frequency as f64 / self.sample_rate as f64;
        for i in start..start + n {
            samples.push(AMPLITUDE * (step * i as f64).sin() as f32);
        }
    }

    fn push_silence(&self, samples: &mut Vec<f32>, duration: f32) {
        let n = self.sample_count(duration);
        samples.resize(samples.len() + n, 0.0);
    }
}

pub fn text_to_morse(text: &str) -> Vec<MorseElement> {
    let words: Vec<Vec<&'static str>> = text
        .split_whitespace()
        .map(|word| word.chars().filter_map(encode_char).collect::<Vec<_>>())
        .filter(|codes| !codes.is_empty())
        .collect();

    let mut result = Vec::new();
    for (word_idx, codes) in words.iter().enumerate() {
        if word_idx > 0 {
            result.push(MorseElement::WordGap);
        }
        for (char_idx, code) in codes.iter().enumerate() {
            if char_idx > 0 {
                result.push(MorseElement::LetterGap);
            }
            for (elem_idx, symbol) in code.chars().enumerate() {
                if elem_idx > 0 {
                    result.push(MorseElement::ElementGap);
                }
                result.push(if symbol == '.' {
                    MorseElement::Dot
                } else {
                    MorseElement::Dash
                });
            }
        }
    }
    result
}
