//! Error types for the wavae data model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Signal too short: {len} samples (need at least {min})")]
    SignalTooShort { len: usize, min: usize },

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("No segments: signal of {signal_len} samples is shorter than segment length {segment_length}")]
    EmptySegmentBatch {
        signal_len: usize,
        segment_length: usize,
    },

    #[error("Segment stride must be non-zero")]
    InvalidStride,

    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Architecture descriptor error: {0}")]
    Descriptor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
