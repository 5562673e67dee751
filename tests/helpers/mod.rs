//! Test helpers and fixtures for wavae integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (identical weights, copies)
//! - `STAT_EPSILON` (1e-4): Signal statistics
//! - `MODEL_EPSILON` (1e-5): Same model on different paths
//! - `INT16_EPSILON`: 16-bit PCM quantization

pub mod tolerances;

use std::path::Path;
use std::sync::Once;
use wavae::prelude::*;

/// Sample rate used for synthetic test signals.
pub const TEST_SAMPLE_RATE: f64 = 1000.0;

/// Amplitude giving a full-period sine a population std of 0.15.
pub const MID_TIER_AMPLITUDE: f32 = 0.15 * std::f32::consts::SQRT_2;

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Generate a sine wave of `amplitude` at `frequency` Hz lasting `duration_secs`.
pub fn generate_sine(
    frequency: f64,
    amplitude: f32,
    sample_rate: f64,
    duration_secs: f64,
) -> Vec<f32> {
    let num_samples = (sample_rate * duration_secs).round() as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// The 5-second, std 0.15 sine used by the end-to-end scenario.
pub fn mid_tier_signal() -> RawSignal {
    RawSignal::new(
        generate_sine(5.0, MID_TIER_AMPLITUDE, TEST_SAMPLE_RATE, 5.0),
        TEST_SAMPLE_RATE,
    )
    .expect("valid sample rate")
}

/// One-epoch CPU pipeline writing into `dir`, with normalization off so the
/// raw signal statistics drive the design.
pub fn quick_pipeline(dir: &Path) -> VaePipeline {
    VaePipeline::builder()
        .epochs(1)
        .normalize(false)
        .save_dir(dir)
        .build()
        .expect("valid pipeline config")
}

