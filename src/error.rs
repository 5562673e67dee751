//! Centralized error type for the wavae umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] wavae_core::Error),

    #[error("Model: {0}")]
    Model(#[from] wavae_burn::Error),

    #[cfg(feature = "wav")]
    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
