//! Architecture descriptor and the shape arithmetic derived from it.
//!
//! The descriptor is the single source of truth for rebuilding a model: it is
//! persisted next to the weights as `architecture.toml` and must be reloaded
//! identically before any weights are applied.
//!
//! # Example TOML:
//! ```toml
//! latent_dim = 32
//! filters = [32, 64]
//! segment_length = 512
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kernel width of every encoder/decoder convolution.
pub const KERNEL_SIZE: usize = 5;
/// Stride of every encoder/decoder convolution.
pub const STRIDE: usize = 2;
/// Zero padding on both sides of every convolution.
pub const PADDING: usize = 2;
/// Extra output padding on transposed convolutions so each stage exactly doubles.
pub const OUTPUT_PADDING: usize = 1;

/// File name of the persisted descriptor inside a checkpoint directory.
pub const DESCRIPTOR_FILE: &str = "architecture.toml";

/// Structural hyperparameters of a dynamic VAE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    /// Width of the latent code.
    pub latent_dim: usize,
    /// Encoder channel widths, one strided convolution per entry.
    pub filters: Vec<usize>,
    /// Samples per training window and per generated segment.
    pub segment_length: usize,
}

impl ArchitectureConfig {
    pub fn new(latent_dim: usize, filters: Vec<usize>, segment_length: usize) -> Self {
        Self {
            latent_dim,
            filters,
            segment_length,
        }
    }

    /// Resolve and validate the shape arithmetic for this configuration.
    pub fn geometry(&self) -> Result<ArchitectureGeometry> {
        ArchitectureGeometry::resolve(self)
    }

    /// Serialize to the TOML descriptor format.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Descriptor(e.to_string()))
    }

    /// Parse a TOML descriptor and validate it.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::Descriptor(e.to_string()))?;
        config.geometry()?;
        Ok(config)
    }

    /// Write `architecture.toml` into `dir`, creating the directory if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        self.geometry()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DESCRIPTOR_FILE);
        std::fs::write(&path, self.to_toml_string()?)?;
        Ok(path)
    }

    /// Read `architecture.toml` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(dir.join(DESCRIPTOR_FILE))?;
        Self::from_toml_str(&contents)
    }
}

/// Sequence length after one strided encoder convolution.
///
/// `(len + 2 * PADDING - KERNEL_SIZE) / STRIDE + 1`, or `None` when the
/// padded input is narrower than the kernel.
pub fn conv_output_length(len: usize) -> Option<usize> {
    (len + 2 * PADDING)
        .checked_sub(KERNEL_SIZE)
        .map(|n| n / STRIDE + 1)
}

/// Sequence length after one transposed decoder convolution.
pub fn conv_transpose_output_length(len: usize) -> usize {
    len.saturating_sub(1) * STRIDE + KERNEL_SIZE + OUTPUT_PADDING - 2 * PADDING
}

/// Shape arithmetic resolved once from an [`ArchitectureConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureGeometry {
    latent_dim: usize,
    filters: Vec<usize>,
    segment_length: usize,
    stage_lengths: Vec<usize>,
    final_length: usize,
    flattened_size: usize,
}

impl ArchitectureGeometry {
    fn resolve(config: &ArchitectureConfig) -> Result<Self> {
        if config.filters.is_empty() {
            return Err(Error::InvalidArchitecture("filters must not be empty".into()));
        }
        if let Some(pos) = config.filters.iter().position(|&f| f == 0) {
            return Err(Error::InvalidArchitecture(format!(
                "filter {pos} has zero channels"
            )));
        }
        if config.latent_dim == 0 {
            return Err(Error::InvalidArchitecture("latent_dim must be positive".into()));
        }
        if config.segment_length == 0 {
            return Err(Error::InvalidArchitecture(
                "segment_length must be positive".into(),
            ));
        }

        let mut stage_lengths = Vec::with_capacity(config.filters.len());
        let mut len = config.segment_length;
        for stage in 0..config.filters.len() {
            len = conv_output_length(len)
                .filter(|&l| l > 0)
                .ok_or_else(|| {
                    Error::InvalidArchitecture(format!(
                        "segment_length {} collapses to zero at encoder stage {stage}",
                        config.segment_length
                    ))
                })?;
            stage_lengths.push(len);
        }

        let final_length = len;
        let last_filters = config.filters[config.filters.len() - 1];
        let decoded =
            (0..config.filters.len()).fold(final_length, |l, _| conv_transpose_output_length(l));
        if decoded != config.segment_length {
            return Err(Error::InvalidArchitecture(format!(
                "decoder would produce {decoded} samples but segment_length is {}; \
                 segment_length must be divisible by {}",
                config.segment_length,
                STRIDE.pow(config.filters.len() as u32)
            )));
        }

        Ok(Self {
            latent_dim: config.latent_dim,
            filters: config.filters.clone(),
            segment_length: config.segment_length,
            stage_lengths,
            final_length,
            flattened_size: last_filters * final_length,
        })
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    pub fn filters(&self) -> &[usize] {
        &self.filters
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Sequence length after each encoder stage.
    pub fn stage_lengths(&self) -> &[usize] {
        &self.stage_lengths
    }

    /// Sequence length after the last encoder stage.
    pub fn final_length(&self) -> usize {
        self.final_length
    }

    pub fn last_filters(&self) -> usize {
        self.filters[self.filters.len() - 1]
    }

    /// `last_filters * final_length`; input width of both latent heads.
    pub fn flattened_size(&self) -> usize {
        self.flattened_size
    }

    /// Decoder filter widths (encoder widths reversed).
    pub fn decoder_filters(&self) -> Vec<usize> {
        self.filters.iter().rev().copied().collect()
    }
}
