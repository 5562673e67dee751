//! Error types for model construction, training and generation.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] wavae_core::Error),

    #[error("Backend init failed: {0}")]
    BackendInit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch in {layer}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        layer: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Missing checkpoint artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Non-finite loss at epoch {epoch}, batch {batch} (recon {reconstruction}, kl {kl})")]
    NonFiniteLoss {
        epoch: usize,
        batch: usize,
        reconstruction: f32,
        kl: f32,
    },

    #[error("Tensor data error: {0}")]
    TensorData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
