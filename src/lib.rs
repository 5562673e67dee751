//! # wavae - Waveform VAE
//!
//! Learns a compressed latent representation of a single waveform and
//! synthesizes new segments by sampling the latent prior.
//!
//! ## Architecture
//!
//! wavae is an umbrella crate that coordinates:
//! - **wavae-core** - Signal, architecture descriptor and segmentation types
//! - **wavae-analysis** - Signal statistics and architecture design rules
//! - **wavae-burn** - The dynamic convolutional VAE, training, checkpoints and generation
//!
//! ## Quick Start
//!
//! ```ignore
//! use wavae::prelude::*;
//!
//! let pipeline = VaePipeline::builder().epochs(50).build()?;
//! let report = pipeline.train(&RawSignal::new(samples, 1000.0)?)?;
//!
//! let generator = pipeline.generator()?;
//! let mut rng = rand::thread_rng();
//! let signals = generator.generate(5, &mut rng)?;
//! let long = generator.generate_long(DEFAULT_LONG_SEGMENTS, &mut rng)?;
//! save_generated("out".as_ref(), &signals, &long, 1000)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default) - WAV ingestion and export via hound
//! - `serialization` - serde derives on [`SignalStatistics`]

mod builder;
mod error;

#[cfg(feature = "wav")]
pub mod wav;

pub use builder::{VaePipeline, VaePipelineBuilder};
pub use error::{Error, Result};

/// Re-export of subsystem crates for direct access
pub use wavae_analysis as analysis;
pub use wavae_burn as burn;
pub use wavae_core as core;

pub use wavae_analysis::{analyze, design_architecture, CapacityTier, SignalStatistics};
pub use wavae_burn::{
    DeviceGenerator, DevicePlacement, EpochReport, GeneratedSignals, Generator, Trainer,
    TrainingConfig, TrainingReport, DEFAULT_LONG_SEGMENTS,
};
pub use wavae_core::{ArchitectureConfig, RawSignal, SegmentBatch, Segmenter};

#[cfg(feature = "wav")]
pub use wav::{load_wav, save_generated, write_wav};

pub mod prelude {
    pub use crate::{
        ArchitectureConfig, DeviceGenerator, DevicePlacement, GeneratedSignals, RawSignal,
        TrainingConfig, TrainingReport, VaePipeline, DEFAULT_LONG_SEGMENTS,
    };

    #[cfg(feature = "wav")]
    pub use crate::{load_wav, save_generated};
}
