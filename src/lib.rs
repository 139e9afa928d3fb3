// src/lib.rs
// Library interface for morsetone

pub mod audio;
pub mod binarize;
pub mod config;
pub mod decoder;
pub mod frequency;
pub mod generator;
pub mod morse;
pub mod spectrogram;
pub mod timing;
pub mod trace;

pub use config::{DecoderConfig, FrequencyBand, UnitMode};
pub use decoder::{Decoded, MorseDecoder, decode_samples, decode_wav_file};
pub use generator::MorseGenerator;
