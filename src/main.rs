use anyhow::{Context, Result};
use clap::Parser;
use morsetone::config::{
    DEFAULT_DOT_SECONDS, DEFAULT_HOP, DEFAULT_THRESHOLD_RATIO, DEFAULT_WINDOW_LEN,
};
use morsetone::{DecoderConfig, MorseDecoder, audio, trace};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const CHUNK_SIZE: usize = 4096;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the input WAV file
    #[arg(value_name = "WAV_FILE")]
    wav_file: PathBuf,

    /// Tone frequency in Hz; skips frequency detection
    #[arg(short, long, value_name = "HZ")]
    frequency: Option<f32>,

    /// Estimate the sending speed instead of assuming the default dot length
    #[arg(short = 'w', long)]
    detect_wpm: bool,

    /// Dot length in seconds (fixed, or the starting point for --detect-wpm)
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_DOT_SECONDS)]
    dot: f32,

    /// Analysis window length in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW_LEN)]
    window: usize,

    /// Samples between analysis windows
    #[arg(long, default_value_t = DEFAULT_HOP)]
    hop: usize,

    /// Presence threshold as a fraction of the mean energy
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_RATIO)]
    threshold_ratio: f32,

    /// Write an ASCII trace of the energy series to this file
    #[arg(long, value_name = "PATH")]
    trace: Option<PathBuf>,
}

impl Cli {
    fn decoder_config(&self) -> DecoderConfig {
        let mut config = DecoderConfig {
            detect_wpm: self.detect_wpm,
            default_dot_seconds: self.dot,
            window_len: self.window,
            hop: self.hop,
            threshold_ratio: self.threshold_ratio,
            ..DecoderConfig::default()
        };
        if let Some(hz) = self.frequency {
            config = config.with_frequency(hz);
        }
        config
    }
}

fn main() -> Result<()> {
    // Set up logging. Use `RUST_LOG=info` or `RUST_LOG=debug` to see output.
    env_logger::init();
    let cli = Cli::parse();

    log::info!("Opening WAV file: {:?}", cli.wav_file);
    let (samples, sample_rate) = audio::read_wav_mono(&cli.wav_file)?;
    log::info!(
        "Loaded {} samples at {} Hz ({:.2} s)",
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate as f32
    );

    let mut decoder = MorseDecoder::new(sample_rate, cli.decoder_config())?;
    for chunk in samples.chunks(CHUNK_SIZE) {
        decoder.process(chunk);
    }
    let (decoded, analysis) = decoder.finalize_with_analysis()?;

    if let Some(path) = &cli.trace {
        let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
        let mut out = BufWriter::new(file);
        trace::write_trace(
            &mut out,
            &analysis.energies,
            analysis.threshold,
            analysis.hop,
            sample_rate,
        )?;
        out.flush()?;
        log::info!("Wrote signal trace to {:?}", path);
    }

    if decoded.frequency_detected {
        println!("Frequency: {:.1} Hz", decoded.frequency_hz);
    }
    if let Some(wpm) = decoded.wpm {
        println!("Speed: {:.1} WPM", wpm);
    }
    log::debug!("Tokens: {:?}", decoded.tokens);

    println!("\n--- Decoded Text ---");
    println!("{}", decoded.text);

    Ok(())
}
