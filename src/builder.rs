//! Builder for configuring and constructing a [`VaePipeline`].

use crate::Result;
use std::path::{Path, PathBuf};
use wavae_burn::{
    train_on, DeviceGenerator, DevicePlacement, DevicePool, ResolvedDevice, TrainingConfig,
    TrainingReport,
};
use wavae_core::RawSignal;

/// Every training field defaults to [`TrainingConfig::default`]. Placement
/// defaults to CPU; a GPU request without an adapter runs on CPU instead.
///
/// # Example
///
/// ```ignore
/// use wavae::prelude::*;
///
/// let pipeline = VaePipeline::builder()
///     .epochs(20)
///     .batch_size(128)
///     .save_dir("runs/ecg")
///     .placement(DevicePlacement::Gpu)
///     .build()?;
///
/// let report = pipeline.train_wav("ecg.wav".as_ref())?;
/// let generator = pipeline.generator()?;
/// let signals = generator.generate(5, &mut rand::thread_rng())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct VaePipelineBuilder {
    config: TrainingConfig,
    placement: DevicePlacement,
}

impl VaePipelineBuilder {
    /// Replace every training field at once, e.g. with a config read from TOML.
    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 50
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs;
        self
    }

    /// Default: 512
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Default: half the designed segment length
    pub fn stride(mut self, stride: usize) -> Self {
        self.config.stride = Some(stride);
        self
    }

    /// Default: 1e-3
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    /// Default: true
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.config.normalize = normalize;
        self
    }

    /// Default: `vae_outputs`
    pub fn save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.save_dir = dir.into();
        self
    }

    /// Default: 42
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Default: CPU
    pub fn placement(mut self, placement: DevicePlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn build(self) -> Result<VaePipeline> {
        self.config.validate()?;

        let pool = match self.placement {
            DevicePlacement::Cpu => DevicePool::cpu_only(),
            DevicePlacement::Gpu => DevicePool::detect(),
        };
        let device = pool.resolve(self.placement);
        tracing::debug!("Pipeline device: {:?}", device.placement());

        Ok(VaePipeline {
            config: self.config,
            device,
        })
    }
}

/// Train-then-generate facade over one resolved device.
pub struct VaePipeline {
    config: TrainingConfig,
    device: ResolvedDevice,
}

impl VaePipeline {
    pub fn builder() -> VaePipelineBuilder {
        VaePipelineBuilder::default()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Placement actually in use, after any GPU fallback.
    pub fn placement(&self) -> DevicePlacement {
        self.device.placement()
    }

    /// Analyze, design, segment, train and persist into `save_dir`.
    pub fn train(&self, signal: &RawSignal) -> Result<TrainingReport> {
        Ok(train_on(&self.device, self.config.clone(), signal)?)
    }

    #[cfg(feature = "wav")]
    pub fn train_wav(&self, path: &Path) -> Result<TrainingReport> {
        self.train(&crate::wav::load_wav(path)?)
    }

    /// Load the generator from this pipeline's `save_dir`.
    pub fn generator(&self) -> Result<DeviceGenerator> {
        self.generator_from(&self.config.save_dir)
    }

    /// Load a generator from any checkpoint directory onto this pipeline's device.
    pub fn generator_from(&self, dir: &Path) -> Result<DeviceGenerator> {
        Ok(DeviceGenerator::load(dir, &self.device)?)
    }
}
