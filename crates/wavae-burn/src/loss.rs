//! VAE objective: reconstruction MSE plus closed-form KL, unweighted.

use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::*;
use burn::tensor::ElementConversion;

/// Mean squared error over every element of the batch.
pub fn reconstruction_loss<B: Backend>(x_hat: Tensor<B, 3>, x: Tensor<B, 3>) -> Tensor<B, 1> {
    MseLoss::new().forward(x_hat, x, Reduction::Mean)
}

/// `-0.5 * mean(1 + logvar - mu^2 - exp(logvar))`, averaged over batch and latent dims.
pub fn kl_divergence<B: Backend>(mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Tensor<B, 1> {
    logvar
        .clone()
        .add_scalar(1.0)
        .sub(mu.powf_scalar(2.0))
        .sub(logvar.exp())
        .mean()
        .mul_scalar(-0.5)
}

/// Loss tensors for one batch. `total` is what gets differentiated.
pub struct VaeLoss<B: Backend> {
    pub total: Tensor<B, 1>,
    pub reconstruction: Tensor<B, 1>,
    pub kl: Tensor<B, 1>,
}

impl<B: Backend> VaeLoss<B> {
    pub fn new(x_hat: Tensor<B, 3>, x: Tensor<B, 3>, mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Self {
        let reconstruction = reconstruction_loss(x_hat, x);
        let kl = kl_divergence(mu, logvar);
        Self {
            total: reconstruction.clone() + kl.clone(),
            reconstruction,
            kl,
        }
    }

    /// Pull the three scalars back to the host.
    pub fn values(&self) -> LossValues {
        LossValues {
            reconstruction: scalar(self.reconstruction.clone()),
            kl: scalar(self.kl.clone()),
            total: scalar(self.total.clone()),
        }
    }
}

/// Host-side copy of a batch's losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossValues {
    pub reconstruction: f32,
    pub kl: f32,
    pub total: f32,
}

impl LossValues {
    pub fn is_finite(&self) -> bool {
        self.reconstruction.is_finite() && self.kl.is_finite() && self.total.is_finite()
    }
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f32 {
    t.into_scalar().elem::<f32>()
}
