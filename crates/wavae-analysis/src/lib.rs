//! # wavae Analysis
//!
//! Signal inspection that sizes the VAE before any model exists.
//!
//! - **Statistics**: length, duration, mean, std, RMS, amplitude entropy, zero crossings
//! - **Architecture design**: threshold rules from statistics to an [`ArchitectureConfig`]
//!
//! All functions operate on [`RawSignal`] / raw `&[f32]` buffers - no framework dependencies.
//!
//! ## Example
//!
//! ```rust
//! use wavae_analysis::{analyze, design_architecture};
//! use wavae_core::RawSignal;
//!
//! let samples: Vec<f32> = (0..5000).map(|i| 0.2 * (i as f32 * 0.03).sin()).collect();
//! let signal = RawSignal::new(samples, 1000.0).unwrap();
//!
//! let stats = analyze(&signal).unwrap();
//! let arch = design_architecture(&stats);
//! assert_eq!(arch.segment_length, 512);
//! ```
//!
//! [`ArchitectureConfig`]: wavae_core::ArchitectureConfig
//! [`RawSignal`]: wavae_core::RawSignal

pub mod designer;
pub mod stats;

pub use designer::{design_architecture, segment_length_for, CapacityTier};
pub use stats::{
    amplitude_entropy, analyze, density_histogram, zero_crossings, SignalStatistics,
};
