//! Dynamic CPU/GPU dispatch for training and generation.
//!
//! Placement is chosen at run time, while backends are type parameters. The
//! enums here wrap both instantiations so callers only handle a
//! [`ResolvedDevice`].

use crate::backend_pool::{
    CpuBackend, CpuTrainingBackend, DevicePlacement, GpuBackend, GpuTrainingBackend,
    ResolvedDevice,
};
use crate::error::Result;
use crate::generator::{GeneratedSignals, Generator};
use crate::trainer::{Trainer, TrainingConfig, TrainingReport};
use rand::Rng;
use std::path::Path;
use wavae_core::{ArchitectureConfig, RawSignal};

/// Train on whichever device `device` names and return the report.
pub fn train_on(
    device: &ResolvedDevice,
    config: TrainingConfig,
    signal: &RawSignal,
) -> Result<TrainingReport> {
    match device {
        ResolvedDevice::Cpu(device) => {
            let trainer = Trainer::<CpuTrainingBackend>::new(config, *device)?;
            Ok(trainer.fit(signal)?.report)
        }
        ResolvedDevice::Gpu(device) => {
            let trainer = Trainer::<GpuTrainingBackend>::new(config, device.clone())?;
            Ok(trainer.fit(signal)?.report)
        }
    }
}

/// A [`Generator`] living on either CPU or GPU.
pub enum DeviceGenerator {
    Cpu(Generator<CpuBackend>),
    Gpu(Generator<GpuBackend>),
}

impl DeviceGenerator {
    /// Load a checkpoint directory onto `device`.
    pub fn load(dir: &Path, device: &ResolvedDevice) -> Result<Self> {
        Ok(match device {
            ResolvedDevice::Cpu(device) => DeviceGenerator::Cpu(Generator::load(dir, *device)?),
            ResolvedDevice::Gpu(device) => {
                DeviceGenerator::Gpu(Generator::load(dir, device.clone())?)
            }
        })
    }

    pub fn architecture(&self) -> &ArchitectureConfig {
        match self {
            DeviceGenerator::Cpu(g) => g.architecture(),
            DeviceGenerator::Gpu(g) => g.architecture(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<GeneratedSignals> {
        match self {
            DeviceGenerator::Cpu(g) => g.generate(count, rng),
            DeviceGenerator::Gpu(g) => g.generate(count, rng),
        }
    }

    pub fn generate_long<R: Rng + ?Sized>(&self, segments: usize, rng: &mut R) -> Result<Vec<f32>> {
        match self {
            DeviceGenerator::Cpu(g) => g.generate_long(segments, rng),
            DeviceGenerator::Gpu(g) => g.generate_long(segments, rng),
        }
    }

    pub fn decode_latents(&self, latents: &[Vec<f32>]) -> Result<GeneratedSignals> {
        match self {
            DeviceGenerator::Cpu(g) => g.decode_latents(latents),
            DeviceGenerator::Gpu(g) => g.decode_latents(latents),
        }
    }

    pub fn placement(&self) -> DevicePlacement {
        match self {
            DeviceGenerator::Cpu(_) => DevicePlacement::Cpu,
            DeviceGenerator::Gpu(_) => DevicePlacement::Gpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_pool::DevicePool;
    use crate::checkpoint::save_checkpoint;
    use crate::model::DynamicVae;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cpu_generator_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DevicePool::cpu_only();
        let arch = ArchitectureConfig::new(16, vec![16, 32], 256);
        let model = DynamicVae::<CpuBackend>::new(&arch, pool.cpu_device()).unwrap();
        save_checkpoint(dir.path(), &model, &arch).unwrap();

        let generator =
            DeviceGenerator::load(dir.path(), &pool.resolve(DevicePlacement::Gpu)).unwrap();
        assert_eq!(generator.placement(), DevicePlacement::Cpu);
        assert_eq!(generator.architecture(), &arch);

        let signals = generator.generate(2, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals.segment_length(), 256);
    }
}
