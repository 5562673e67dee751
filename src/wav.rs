//! WAV ingestion and export using hound.
//!
//! Input may be any channel count and any PCM or float format; it is collapsed
//! to mono by averaging channels. Integer PCM is scaled into [-1, 1].
//! Generated signals are written as mono 32-bit float.

use crate::error::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use wavae_burn::GeneratedSignals;
use wavae_core::RawSignal;

/// File name of the long concatenated signal written by [`save_generated`].
pub const LONG_SIGNAL_FILE: &str = "long_synthetic_signal.wav";

/// Read a WAV file into a mono [`RawSignal`] at the file's sample rate.
pub fn load_wav(path: &Path) -> Result<RawSignal> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    tracing::debug!(
        "Read {}: {} Hz, {} channels, {} samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        interleaved.len()
    );

    Ok(RawSignal::from_interleaved(
        &interleaved,
        spec.channels as usize,
        spec.sample_rate as f64,
    )?)
}

/// Write mono samples as a 32-bit float WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Write each generated segment as `vae_signal_{i}.wav` (1-based) and
/// `long_signal` as [`LONG_SIGNAL_FILE`], all into `dir`.
///
/// `long_signal` is normally a separate draw from
/// [`Generator::generate_long`](wavae_burn::Generator::generate_long), not the
/// segments joined together.
pub fn save_generated(
    dir: &Path,
    signals: &GeneratedSignals,
    long_signal: &[f32],
    sample_rate: u32,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(signals.len() + 1);
    for (i, segment) in signals.segments().iter().enumerate() {
        let path = dir.join(format!("vae_signal_{}.wav", i + 1));
        write_wav(&path, segment, sample_rate)?;
        written.push(path);
    }

    let long_path = dir.join(LONG_SIGNAL_FILE);
    write_wav(&long_path, long_signal, sample_rate)?;
    written.push(long_path);

    tracing::info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}
