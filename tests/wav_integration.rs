//! WAV ingestion and export tests (requires "wav" feature)
//!
//! Run with:
//! ```bash
//! cargo test -p wavae --test wav_integration --features "wav"
//! ```

#![cfg(feature = "wav")]

mod helpers;

use approx::assert_relative_eq;
use helpers::tolerances::{FLOAT_EPSILON, INT16_EPSILON};
use helpers::*;
use hound::{SampleFormat, WavSpec, WavWriter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use wavae::prelude::*;
use wavae::{write_wav, DEFAULT_LONG_SEGMENTS};

fn write_stereo_int16(path: &Path, left: &[f32], right: &[f32], sample_rate: u32) {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for (&l, &r) in left.iter().zip(right) {
        writer.write_sample((l * 32767.0) as i16).unwrap();
        writer.write_sample((r * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_stereo_is_averaged_to_mono() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_stereo_int16(&path, &[0.5, 0.25, -0.5], &[0.0, 0.25, 0.5], 8000);

    let signal = load_wav(&path).unwrap();
    assert_eq!(signal.len(), 3);
    assert_eq!(signal.sample_rate(), 8000.0);
    let expected = [0.25f32, 0.25, 0.0];
    for (&actual, &want) in signal.samples().iter().zip(&expected) {
        assert_relative_eq!(actual, want, epsilon = 2.0 * INT16_EPSILON);
    }
}

#[test]
fn test_float_wav_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sine.wav");
    let samples = generate_sine(5.0, 0.2, TEST_SAMPLE_RATE, 1.0);
    write_wav(&path, &samples, TEST_SAMPLE_RATE as u32).unwrap();

    let signal = load_wav(&path).unwrap();
    assert_eq!(signal.len(), samples.len());
    for (a, b) in signal.samples().iter().zip(&samples) {
        assert_relative_eq!(*a, *b, epsilon = FLOAT_EPSILON);
    }
}

#[test]
fn test_train_from_wav_and_save_generated() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_wav(
        &input,
        mid_tier_signal().samples(),
        TEST_SAMPLE_RATE as u32,
    )
    .unwrap();

    let pipeline = quick_pipeline(&dir.path().join("model"));
    let report = pipeline.train_wav(&input).unwrap();
    assert_eq!(report.architecture.segment_length, 512);

    let generator = pipeline.generator().unwrap();
    let signals = generator.generate(3, &mut StdRng::seed_from_u64(9)).unwrap();

    let long_signal = generator
        .generate_long(DEFAULT_LONG_SEGMENTS, &mut StdRng::seed_from_u64(10))
        .unwrap();

    let out = dir.path().join("generated");
    let written =
        save_generated(&out, &signals, &long_signal, TEST_SAMPLE_RATE as u32).unwrap();
    assert_eq!(written.len(), 4);
    for i in 1..=3 {
        let segment = load_wav(&out.join(format!("vae_signal_{i}.wav"))).unwrap();
        assert_eq!(segment.len(), 512);
    }

    // The long file is its own draw of ten segments, not the three above.
    let long = load_wav(&out.join(wavae::wav::LONG_SIGNAL_FILE)).unwrap();
    assert_eq!(long.len(), DEFAULT_LONG_SEGMENTS * 512);
    assert_eq!(long.samples(), long_signal.as_slice());
}
