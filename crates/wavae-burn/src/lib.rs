//! Burn backend for wavae: the dynamic convolutional VAE, its training loop,
//! checkpoints and the decode-only generator.
//!
//! Runs on NdArray (CPU) or wgpu (GPU). Training uses the autodiff wrapper of
//! either; generation uses the plain backend.
//!
//! ```rust,ignore
//! let pool = DevicePool::detect();
//! let device = pool.resolve(DevicePlacement::Gpu);
//! let config = TrainingConfig::default();
//! train_on(&device, config.clone(), &signal)?;
//! let generator = DeviceGenerator::load(&config.save_dir, &device)?;
//! ```

#![recursion_limit = "256"]

mod backend_pool;
mod dispatch;
mod error;

pub mod checkpoint;
pub mod generator;
pub mod loss;
pub mod model;
pub mod trainer;

pub use backend_pool::{
    CpuBackend, CpuDevice, CpuTrainingBackend, DevicePlacement, DevicePool, GpuBackend,
    GpuTrainingBackend, ResolvedDevice,
};
pub use checkpoint::{load_checkpoint, save_checkpoint, CheckpointPaths};
pub use dispatch::{train_on, DeviceGenerator};
pub use error::{Error, Result};
pub use generator::{GeneratedSignals, Generator, DEFAULT_LONG_SEGMENTS};
pub use loss::{kl_divergence, reconstruction_loss, LossValues, VaeLoss};
pub use model::DynamicVae;
pub use trainer::{EpochReport, PreparedData, TrainedVae, Trainer, TrainingConfig, TrainingReport};

pub use burn::backend::wgpu::WgpuDevice;
