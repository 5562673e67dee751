//! Training pipeline: analyze, design, segment, optimize, persist.

use crate::checkpoint::{save_checkpoint, CheckpointPaths};
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::loss::{LossValues, VaeLoss};
use crate::model::DynamicVae;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wavae_analysis::{analyze, design_architecture, SignalStatistics};
use wavae_core::{ArchitectureConfig, RawSignal, SegmentBatch, Segmenter};

/// Training hyperparameters.
///
/// Every field has a default, so a TOML file only needs the overrides:
///
/// ```toml
/// epochs = 20
/// batch_size = 128
/// learning_rate = 0.0005
/// save_dir = "runs/ecg"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Hop between windows; `None` means half the segment length.
    #[serde(default)]
    pub stride: Option<usize>,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Z-score the whole signal before analysis and the window batch after segmentation.
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Seeds weight initialization, batch shuffling and reparameterization noise.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_epochs() -> usize {
    50
}

fn default_batch_size() -> usize {
    512
}

fn default_learning_rate() -> f64 {
    1e-3
}

fn default_normalize() -> bool {
    true
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("vae_outputs")
}

fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            stride: None,
            learning_rate: default_learning_rate(),
            normalize: default_normalize(),
            save_dir: default_save_dir(),
            seed: default_seed(),
        }
    }
}

impl TrainingConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be positive".into()));
        }
        if self.stride == Some(0) {
            return Err(Error::InvalidConfig("stride must be positive".into()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Losses of the last batch seen in an epoch (not an epoch average).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number
    pub epoch: usize,
    pub reconstruction: f32,
    pub kl: f32,
    pub total: f32,
}

/// Everything a training run decided and produced, minus the weights.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub statistics: SignalStatistics,
    pub architecture: ArchitectureConfig,
    pub segment_count: usize,
    pub epochs: Vec<EpochReport>,
    pub artifacts: CheckpointPaths,
}

impl TrainingReport {
    pub fn last_epoch(&self) -> Option<&EpochReport> {
        self.epochs.last()
    }
}

/// Analyzer, designer and segmenter output for one signal.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub statistics: SignalStatistics,
    pub architecture: ArchitectureConfig,
    pub segments: SegmentBatch,
}

/// Trained weights plus the report that produced them.
pub struct TrainedVae<B: AutodiffBackend> {
    pub model: DynamicVae<B>,
    pub report: TrainingReport,
}

impl<B: AutodiffBackend> TrainedVae<B> {
    /// Drop autodiff tracking and hand the weights to a generator.
    pub fn into_generator(self, device: <B::InnerBackend as Backend>::Device) -> Result<Generator<B::InnerBackend>> {
        Generator::from_model(self.model.valid(), self.report.architecture, device)
    }
}

/// Drives optimization on an autodiff backend and device chosen by the caller.
pub struct Trainer<B: AutodiffBackend> {
    config: TrainingConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(config: TrainingConfig, device: B::Device) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, device })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Normalize, analyze, design and segment without touching a model.
    pub fn prepare(&self, signal: &RawSignal) -> Result<PreparedData> {
        let signal = if self.config.normalize {
            signal.normalized()?
        } else {
            signal.clone()
        };

        let statistics = analyze(&signal)?;
        let architecture = design_architecture(&statistics);
        tracing::info!(
            "Signal: {} samples, {:.2}s, std {:.4} -> latent {}, filters {:?}, segment {}",
            statistics.length,
            statistics.duration,
            statistics.std,
            architecture.latent_dim,
            architecture.filters,
            architecture.segment_length
        );

        let segments = Segmenter::new(architecture.segment_length)
            .with_stride(self.config.stride)
            .with_normalize(self.config.normalize)
            .segment(&signal)?;
        tracing::debug!("Segmented into {} windows", segments.len());

        Ok(PreparedData {
            statistics,
            architecture,
            segments,
        })
    }

    /// Run the whole pipeline and write the checkpoint to `save_dir`.
    ///
    /// Any non-finite batch loss aborts the run before the optimizer step,
    /// and nothing is persisted.
    pub fn fit(&self, signal: &RawSignal) -> Result<TrainedVae<B>> {
        let prepared = self.prepare(signal)?;
        let model = self.init_model(&prepared.architecture)?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let (model, epochs) = self.optimize(model, &prepared.segments, &mut rng)?;
        let artifacts = save_checkpoint(&self.config.save_dir, &model, &prepared.architecture)?;
        tracing::info!(
            "Training complete, saved to {}",
            self.config.save_dir.display()
        );

        Ok(TrainedVae {
            model,
            report: TrainingReport {
                statistics: prepared.statistics,
                architecture: prepared.architecture,
                segment_count: prepared.segments.len(),
                epochs,
                artifacts,
            },
        })
    }

    /// Fresh weights drawn from the backend RNG seeded with `config.seed`.
    pub fn init_model(&self, architecture: &ArchitectureConfig) -> Result<DynamicVae<B>> {
        DynamicVae::<B>::seeded(architecture, &self.device, self.config.seed)
    }

    /// Adam over shuffled mini-batches, one step per batch.
    pub fn optimize(
        &self,
        mut model: DynamicVae<B>,
        segments: &SegmentBatch,
        rng: &mut StdRng,
    ) -> Result<(DynamicVae<B>, Vec<EpochReport>)> {
        if segments.is_empty() {
            return Err(wavae_core::Error::EmptySegmentBatch {
                signal_len: 0,
                segment_length: segments.segment_length(),
            }
            .into());
        }

        let mut optimizer = AdamConfig::new().init::<B, DynamicVae<B>>();
        let mut order: Vec<usize> = (0..segments.len()).collect();
        let mut reports = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            order.shuffle(rng);
            let mut last: Option<LossValues> = None;

            for (batch_idx, indices) in order.chunks(self.config.batch_size).enumerate() {
                let x = batch_tensor::<B>(segments, indices, &self.device);
                let (x_hat, mu, logvar) = model.forward(x.clone(), rng);
                let loss = VaeLoss::new(x_hat, x, mu, logvar);

                let values = loss.values();
                if !values.is_finite() {
                    tracing::error!(
                        "Non-finite loss at epoch {}, batch {}: {:?}",
                        epoch,
                        batch_idx,
                        values
                    );
                    return Err(Error::NonFiniteLoss {
                        epoch,
                        batch: batch_idx,
                        reconstruction: values.reconstruction,
                        kl: values.kl,
                    });
                }

                let grads = GradientsParams::from_grads(loss.total.backward(), &model);
                model = optimizer.step(self.config.learning_rate, model, grads);
                last = Some(values);
            }

            if let Some(values) = last {
                tracing::info!(
                    "[{}/{}] Recon Loss: {:.4}, KLD: {:.4}, Total: {:.4}",
                    epoch,
                    self.config.epochs,
                    values.reconstruction,
                    values.kl,
                    values.total
                );
                reports.push(EpochReport {
                    epoch,
                    reconstruction: values.reconstruction,
                    kl: values.kl,
                    total: values.total,
                });
            }
        }

        Ok((model, reports))
    }
}

/// `[indices.len(), 1, segment_length]` tensor of the selected windows.
fn batch_tensor<B: Backend>(segments: &SegmentBatch, indices: &[usize], device: &B::Device) -> Tensor<B, 3> {
    let data = TensorData::new(
        segments.gather(indices),
        [indices.len(), 1, segments.segment_length()],
    );
    Tensor::from_data(data, device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    fn sine(amplitude: f32, freq: f32, rate: f32, seconds: f32) -> RawSignal {
        let n = (rate * seconds) as usize;
        let samples = (0..n)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / rate).sin())
            .collect();
        RawSignal::new(samples, rate as f64).unwrap()
    }

    fn trainer(config: TrainingConfig) -> Trainer<TestBackend> {
        Trainer::new(config, NdArrayDevice::default()).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 50);
        assert_eq!(config.batch_size, 512);
        assert_eq!(config.stride, None);
        assert!(config.normalize);
        assert_eq!(config.save_dir, PathBuf::from("vae_outputs"));
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config = TrainingConfig::from_toml_str("epochs = 3\nstride = 64\n").unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.stride, Some(64));
        assert_eq!(config.batch_size, 512);
    }

    #[test]
    fn test_config_validation() {
        assert!(TrainingConfig::from_toml_str("epochs = 0").is_err());
        assert!(TrainingConfig::from_toml_str("batch_size = 0").is_err());
        assert!(TrainingConfig::from_toml_str("stride = 0").is_err());
        assert!(TrainingConfig::from_toml_str("learning_rate = -1.0").is_err());
        assert!(matches!(
            TrainingConfig::from_toml_str("epochs = \"many\""),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_prepare_without_normalization() {
        let config = TrainingConfig {
            normalize: false,
            ..Default::default()
        };
        let prepared = trainer(config).prepare(&sine(0.01, 3.0, 200.0, 2.0)).unwrap();
        assert_eq!(
            prepared.architecture,
            ArchitectureConfig::new(16, vec![16, 32], 256)
        );
        // 400 samples, window 256, stride 128
        assert_eq!(prepared.segments.len(), 2);
    }

    #[test]
    fn test_prepare_with_normalization_selects_wide_tier() {
        let prepared = trainer(TrainingConfig::default())
            .prepare(&sine(0.01, 3.0, 200.0, 3.0))
            .unwrap();
        assert_eq!(prepared.architecture.latent_dim, 64);
        assert_eq!(prepared.architecture.segment_length, 512);
    }

    #[test]
    fn test_too_short_for_one_segment() {
        let config = TrainingConfig {
            normalize: false,
            ..Default::default()
        };
        let result = trainer(config).prepare(&sine(0.1, 3.0, 100.0, 2.0));
        assert!(matches!(
            result,
            Err(Error::Core(wavae_core::Error::EmptySegmentBatch { .. }))
        ));
    }

    #[test]
    fn test_fit_writes_checkpoint_and_reports_each_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig {
            epochs: 2,
            batch_size: 4,
            normalize: false,
            save_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let trained = trainer(config).fit(&sine(0.1, 5.0, 400.0, 1.5)).unwrap();
        let report = &trained.report;
        assert_eq!(report.epochs.len(), 2);
        assert_eq!(report.epochs[1].epoch, 2);
        assert!(report.epochs.iter().all(|e| e.total.is_finite()));
        for e in &report.epochs {
            assert!((e.total - (e.reconstruction + e.kl)).abs() < 1e-4);
        }
        assert!(report.artifacts.weights.exists());
        assert!(report.artifacts.descriptor.exists());
    }

    #[test]
    fn test_same_seed_same_initial_weights() {
        let arch = ArchitectureConfig::new(16, vec![16, 32], 256);
        let z = || Tensor::<TestBackend, 2>::ones([1, 16], &NdArrayDevice::default());
        let decoded = |seed: u64| {
            let config = TrainingConfig {
                seed,
                ..Default::default()
            };
            let model = trainer(config).init_model(&arch).unwrap();
            model.decode(z()).into_data().to_vec::<f32>().unwrap()
        };

        assert_eq!(decoded(42), decoded(42));
        assert_ne!(decoded(42), decoded(43));
    }

    #[test]
    fn test_same_seed_same_losses() {
        let signal = sine(0.1, 5.0, 400.0, 1.5);
        let run = || {
            let dir = tempfile::tempdir().unwrap();
            let config = TrainingConfig {
                epochs: 2,
                batch_size: 4,
                normalize: false,
                save_dir: dir.path().to_path_buf(),
                ..Default::default()
            };
            trainer(config).fit(&signal).unwrap().report.epochs
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_nan_signal_aborts_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig {
            epochs: 1,
            normalize: false,
            save_dir: dir.path().join("out"),
            ..Default::default()
        };
        let trainer = trainer(config);

        let mut samples = vec![0.1f32; 512];
        samples[10] = f32::NAN;
        let segments = Segmenter::new(256).windows(&samples).unwrap();
        let arch = ArchitectureConfig::new(16, vec![16, 32], 256);
        let model = DynamicVae::<TestBackend>::new(&arch, &NdArrayDevice::default()).unwrap();

        let result = trainer.optimize(model, &segments, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(Error::NonFiniteLoss { epoch: 1, .. })));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_into_generator() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig {
            epochs: 1,
            normalize: false,
            save_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let trained = trainer(config).fit(&sine(0.1, 5.0, 400.0, 1.5)).unwrap();
        let generator = trained.into_generator(NdArrayDevice::default()).unwrap();
        let signals = generator
            .generate(2, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals.segment_length(), 256);
    }
}
