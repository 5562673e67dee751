//! Checkpoint directory layout: weights plus architecture descriptor.
//!
//! ```text
//! <dir>/vae_model.mpk       named MessagePack record, full precision
//! <dir>/architecture.toml   latent_dim, filters, segment_length
//! ```
//!
//! Both files are always written together and both are required to load.
//! The descriptor decides the layer shapes; weights that disagree with it
//! are rejected before they reach the model.

use crate::error::{Error, Result};
use crate::model::{DynamicVae, DynamicVaeRecord};
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use std::path::{Path, PathBuf};
use wavae_core::{ArchitectureConfig, DESCRIPTOR_FILE};

/// Weight file stem; the recorder appends its own extension.
pub const WEIGHTS_STEM: &str = "vae_model";
pub const WEIGHTS_EXTENSION: &str = "mpk";

pub type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Files making up one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPaths {
    pub weights: PathBuf,
    pub descriptor: PathBuf,
}

impl CheckpointPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            weights: dir.join(WEIGHTS_STEM).with_extension(WEIGHTS_EXTENSION),
            descriptor: dir.join(DESCRIPTOR_FILE),
        }
    }
}

/// Write weights and descriptor into `dir`.
pub fn save_checkpoint<B: Backend>(
    dir: &Path,
    model: &DynamicVae<B>,
    architecture: &ArchitectureConfig,
) -> Result<CheckpointPaths> {
    let geometry = architecture.geometry()?;
    model.check_shapes(&geometry)?;

    std::fs::create_dir_all(dir)?;
    architecture.save(dir)?;
    model
        .clone()
        .save_file(dir.join(WEIGHTS_STEM), &CheckpointRecorder::new())
        .map_err(|e| Error::Checkpoint(format!("{e:?}")))?;

    let paths = CheckpointPaths::in_dir(dir);
    tracing::info!(
        "Saved checkpoint: {} + {}",
        paths.weights.display(),
        paths.descriptor.display()
    );
    Ok(paths)
}

/// Rebuild a model from `dir`, failing on any missing file or shape mismatch.
pub fn load_checkpoint<B: Backend>(
    dir: &Path,
    device: &B::Device,
) -> Result<(DynamicVae<B>, ArchitectureConfig)> {
    let paths = CheckpointPaths::in_dir(dir);
    for path in [&paths.descriptor, &paths.weights] {
        if !path.exists() {
            return Err(Error::MissingArtifact(path.clone()));
        }
    }

    let architecture = ArchitectureConfig::load(dir)?;
    let geometry = architecture.geometry()?;

    let record: DynamicVaeRecord<B> = CheckpointRecorder::new()
        .load(dir.join(WEIGHTS_STEM), device)
        .map_err(|e| Error::Checkpoint(format!("{e:?}")))?;

    let model = DynamicVae::from_geometry(&geometry, device).load_checked(record, &geometry)?;
    tracing::debug!("Loaded checkpoint from {}", dir.display());
    Ok((model, architecture))
}
