// src/audio.rs
// WAV input/output and channel mixing

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Reads a WAV file as mono `f32` samples in -1.0..1.0, plus its sample rate.
///
/// Integer PCM of any width and 32-bit float are accepted; multi-channel files
/// are averaged down to one channel.
pub fn read_wav_mono<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to open WAV file {path:?}"))?;
    let spec = reader.spec();
    log::info!("WAV spec: {:?}", spec);

    if spec.sample_rate == 0 {
        bail!("WAV file reports a sample rate of zero");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                bail!(
                    "Unsupported float sample width: {} bits. Only 32-bit float is supported.",
                    spec.bits_per_sample
                );
            }
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
    };

    Ok((mix_to_mono(&interleaved, spec.channels), spec.sample_rate))
}

/// Averages interleaved frames of `channels` samples into one channel.
/// A trailing partial frame is dropped.
pub fn mix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Writes mono samples as 16-bit PCM.
pub fn write_wav_mono<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
