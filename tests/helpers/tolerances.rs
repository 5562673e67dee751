//! Tolerance constants for waveform and model testing.

/// Floating point rounding errors (exact copies, identical weights).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Statistics computed in f64 over f32 input.
pub const STAT_EPSILON: f64 = 1e-4;

/// Outputs of the same weights on different code paths (in-memory vs reloaded).
pub const MODEL_EPSILON: f32 = 1e-5;

/// 16-bit quantization step size.
/// Use when checking integer PCM ingestion.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;
