//! Decode-only sampling from a persisted model.

use crate::checkpoint::load_checkpoint;
use crate::error::{Error, Result};
use crate::model::{standard_normal, DynamicVae};
use burn::prelude::*;
use rand::Rng;
use std::path::Path;
use wavae_core::ArchitectureConfig;

/// Number of segments joined into a long synthetic signal by default.
pub const DEFAULT_LONG_SEGMENTS: usize = 10;

/// Loaded weights plus the descriptor they were built from. Read-only; no
/// state survives between calls apart from the weights themselves.
pub struct Generator<B: Backend> {
    model: DynamicVae<B>,
    architecture: ArchitectureConfig,
    device: B::Device,
}

impl<B: Backend> Generator<B> {
    /// Load `vae_model.mpk` + `architecture.toml` from `dir`.
    pub fn load(dir: &Path, device: B::Device) -> Result<Self> {
        let (model, architecture) = load_checkpoint::<B>(dir, &device)?;
        tracing::info!(
            "Loaded generator from {}: latent {}, segment {}",
            dir.display(),
            architecture.latent_dim,
            architecture.segment_length
        );
        Ok(Self {
            model,
            architecture,
            device,
        })
    }

    /// Wrap an in-memory model, checking it against `architecture`.
    pub fn from_model(
        model: DynamicVae<B>,
        architecture: ArchitectureConfig,
        device: B::Device,
    ) -> Result<Self> {
        model.check_shapes(&architecture.geometry()?)?;
        Ok(Self {
            model,
            architecture,
            device,
        })
    }

    pub fn architecture(&self) -> &ArchitectureConfig {
        &self.architecture
    }

    pub fn latent_dim(&self) -> usize {
        self.architecture.latent_dim
    }

    pub fn segment_length(&self) -> usize {
        self.architecture.segment_length
    }

    /// Draw `count` latent vectors from the standard-normal prior and decode them.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<GeneratedSignals> {
        if count == 0 {
            return Err(Error::InvalidConfig("sample count must be positive".into()));
        }
        let z = standard_normal::<B, 2, R>([count, self.latent_dim()], &self.device, rng);
        self.decode_tensor(z)
    }

    /// Generate `segments` fresh segments and join them end-to-end.
    pub fn generate_long<R: Rng + ?Sized>(&self, segments: usize, rng: &mut R) -> Result<Vec<f32>> {
        Ok(self.generate(segments, rng)?.concatenated())
    }

    /// Decode caller-supplied latent vectors; each must be `latent_dim` wide.
    pub fn decode_latents(&self, latents: &[Vec<f32>]) -> Result<GeneratedSignals> {
        if latents.is_empty() {
            return Err(Error::InvalidConfig("no latent vectors given".into()));
        }
        let width = self.latent_dim();
        if let Some(bad) = latents.iter().find(|z| z.len() != width) {
            return Err(Error::ShapeMismatch {
                layer: "latent".into(),
                expected: vec![width],
                found: vec![bad.len()],
            });
        }

        let flat: Vec<f32> = latents.iter().flatten().copied().collect();
        let z = Tensor::from_data(TensorData::new(flat, [latents.len(), width]), &self.device);
        self.decode_tensor(z)
    }

    fn decode_tensor(&self, z: Tensor<B, 2>) -> Result<GeneratedSignals> {
        let [count, _] = z.dims();
        let segment_length = self.segment_length();
        let output = self.model.decode_checked(z)?;

        let dims = output.dims();
        if dims != [count, 1, segment_length] {
            return Err(Error::ShapeMismatch {
                layer: "decoder output".into(),
                expected: vec![count, 1, segment_length],
                found: dims.to_vec(),
            });
        }

        let flat = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| Error::TensorData(format!("{e:?}")))?;
        tracing::debug!("Decoded {} segments of {} samples", count, segment_length);

        Ok(GeneratedSignals {
            segments: flat
                .chunks_exact(segment_length)
                .map(<[f32]>::to_vec)
                .collect(),
            segment_length,
        })
    }
}

/// Waveforms decoded in one call, one row per latent vector.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSignals {
    segments: Vec<Vec<f32>>,
    segment_length: usize,
}

impl GeneratedSignals {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn segments(&self) -> &[Vec<f32>] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Vec<f32>> {
        self.segments
    }

    /// All segments joined along the time axis.
    pub fn concatenated(&self) -> Vec<f32> {
        self.segments.concat()
    }

    /// `(samples, length)` per segment, the shape serving layers hand out.
    pub fn payloads(&self) -> impl Iterator<Item = (&[f32], usize)> {
        self.segments.iter().map(|s| (s.as_slice(), s.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::save_checkpoint;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestBackend = NdArray<f32>;

    fn generator(arch: ArchitectureConfig) -> Generator<TestBackend> {
        let device = NdArrayDevice::default();
        let model = DynamicVae::new(&arch, &device).unwrap();
        Generator::from_model(model, arch, device).unwrap()
    }

    #[test]
    fn test_generate_count_and_length() {
        let sampler = generator(ArchitectureConfig::new(32, vec![32, 64], 512));
        let signals = sampler.generate(3, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(signals.len(), 3);
        assert!(signals.segments().iter().all(|s| s.len() == 512));
    }

    #[test]
    fn test_zero_count_rejected() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        assert!(matches!(
            sampler.generate(0, &mut StdRng::seed_from_u64(0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_same_seed_same_output() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        let a = sampler.generate(2, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = sampler.generate(2, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_latents_is_deterministic() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        let z = vec![vec![0.25f32; 16], vec![-1.0f32; 16]];
        assert_eq!(sampler.decode_latents(&z).unwrap(), sampler.decode_latents(&z).unwrap());
    }

    #[test]
    fn test_decode_latents_width_checked() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        let err = sampler.decode_latents(&[vec![0.0; 15]]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_long_signal_concatenates() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        let long = sampler
            .generate_long(DEFAULT_LONG_SEGMENTS, &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(long.len(), DEFAULT_LONG_SEGMENTS * 256);

        let signals = sampler.generate(2, &mut StdRng::seed_from_u64(5)).unwrap();
        let joined = signals.concatenated();
        assert_eq!(&joined[..256], signals.segments()[0].as_slice());
        assert_eq!(&joined[256..], signals.segments()[1].as_slice());
    }

    #[test]
    fn test_payloads() {
        let sampler = generator(ArchitectureConfig::new(16, vec![16, 32], 256));
        let signals = sampler.generate(2, &mut StdRng::seed_from_u64(5)).unwrap();
        let lengths: Vec<usize> = signals.payloads().map(|(_, len)| len).collect();
        assert_eq!(lengths, vec![256, 256]);
    }

    #[test]
    fn test_load_from_disk_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let device = NdArrayDevice::default();
        let arch = ArchitectureConfig::new(16, vec![16, 32], 256);
        let model = DynamicVae::<TestBackend>::new(&arch, &device).unwrap();
        save_checkpoint(dir.path(), &model, &arch).unwrap();

        let in_memory = Generator::from_model(model, arch, device).unwrap();
        let loaded = Generator::<TestBackend>::load(dir.path(), NdArrayDevice::default()).unwrap();

        let z = vec![vec![0.5f32; 16]];
        let a = in_memory.decode_latents(&z).unwrap();
        let b = loaded.decode_latents(&z).unwrap();
        for (x, y) in a.concatenated().iter().zip(b.concatenated()) {
            assert!((x - y).abs() < 1e-6);
        }
    }
}
