//! # wavae-core
//!
//! Framework-free data model for the waveform VAE:
//! - [`RawSignal`]: mono amplitude sequence plus sample rate
//! - [`ArchitectureConfig`]: the persisted architecture descriptor, and the
//!   [`ArchitectureGeometry`] shape arithmetic resolved from it
//! - [`Segmenter`] / [`SegmentBatch`]: overlapping fixed-length windows
//!
//! No ML framework or file-format dependencies live here.

mod error;
pub use error::{Error, Result};

pub mod architecture;
pub mod segment;
pub mod signal;

pub use architecture::{
    conv_output_length, conv_transpose_output_length, ArchitectureConfig, ArchitectureGeometry,
    DESCRIPTOR_FILE,
};
pub use segment::{SegmentBatch, Segmenter};
pub use signal::{mean_std, RawSignal};
