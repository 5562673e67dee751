//! Dynamic 1-D convolutional VAE.
//!
//! Depth and channel widths come from an [`ArchitectureConfig`]; every stage
//! uses kernel 5, stride 2, padding 2, so each encoder convolution halves the
//! sequence and each transposed decoder convolution doubles it back.
//!
//! ```text
//! [B, 1, S] -> conv x k -> [B, F_k, S / 2^k] -> flatten -> fc_mu / fc_logvar -> [B, latent]
//! [B, latent] -> decoder_input -> [B, F_k, S / 2^k] -> convT x (k-1) -> final_layer -> [B, 1, S]
//! ```

use crate::error::{Error, Result};
use burn::nn::conv::{Conv1d, Conv1dConfig, ConvTranspose1d, ConvTranspose1dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig1d};
use burn::prelude::*;
use burn::tensor::activation::leaky_relu;
use parking_lot::{const_mutex, Mutex};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use wavae_core::architecture::{KERNEL_SIZE, OUTPUT_PADDING, PADDING, STRIDE};
use wavae_core::{ArchitectureConfig, ArchitectureGeometry};

/// Negative slope of the leaky rectifier after every hidden convolution.
pub const LEAKY_SLOPE: f64 = 0.01;

// Backend RNGs are process-wide. Seeding and drawing initial weights must not
// interleave with another model being built.
static WEIGHT_INIT: Mutex<()> = const_mutex(());

#[derive(Module, Debug)]
pub struct DynamicVae<B: Backend> {
    encoder: Vec<Conv1d<B>>,
    fc_mu: Linear<B>,
    fc_logvar: Linear<B>,
    decoder_input: Linear<B>,
    decoder: Vec<ConvTranspose1d<B>>,
    // No activation after this one; output amplitude is unbounded.
    final_layer: ConvTranspose1d<B>,
    latent_dim: usize,
    last_filters: usize,
    final_length: usize,
    segment_length: usize,
}

impl<B: Backend> DynamicVae<B> {
    /// Validate `config` and build freshly initialized layers on `device`.
    pub fn new(config: &ArchitectureConfig, device: &B::Device) -> Result<Self> {
        let geometry = config.geometry()?;
        Ok(Self::from_geometry(&geometry, device))
    }

    /// Like [`new`](Self::new), with the backend RNG seeded first so the
    /// initial weights depend only on `seed`.
    pub fn seeded(config: &ArchitectureConfig, device: &B::Device, seed: u64) -> Result<Self> {
        let geometry = config.geometry()?;
        let _guard = WEIGHT_INIT.lock();
        B::seed(device, seed);
        Ok(Self::build(&geometry, device))
    }

    /// Build from already-resolved shape arithmetic.
    pub fn from_geometry(geometry: &ArchitectureGeometry, device: &B::Device) -> Self {
        let _guard = WEIGHT_INIT.lock();
        Self::build(geometry, device)
    }

    fn build(geometry: &ArchitectureGeometry, device: &B::Device) -> Self {
        let mut in_channels = 1;
        let encoder = geometry
            .filters()
            .iter()
            .map(|&out_channels| {
                let conv = Conv1dConfig::new(in_channels, out_channels, KERNEL_SIZE)
                    .with_stride(STRIDE)
                    .with_padding(PaddingConfig1d::Explicit(PADDING))
                    .init(device);
                in_channels = out_channels;
                conv
            })
            .collect();

        let flattened = geometry.flattened_size();
        let latent = geometry.latent_dim();

        let reversed = geometry.decoder_filters();
        let decoder = reversed
            .windows(2)
            .map(|pair| transposed_stage([pair[0], pair[1]], device))
            .collect();
        let final_layer = transposed_stage([geometry.filters()[0], 1], device);

        tracing::debug!(
            "Built VAE: filters {:?}, stage lengths {:?}, flattened {}, latent {}",
            geometry.filters(),
            geometry.stage_lengths(),
            flattened,
            latent
        );

        Self {
            encoder,
            fc_mu: LinearConfig::new(flattened, latent).init(device),
            fc_logvar: LinearConfig::new(flattened, latent).init(device),
            decoder_input: LinearConfig::new(latent, flattened).init(device),
            decoder,
            final_layer,
            latent_dim: latent,
            last_filters: geometry.last_filters(),
            final_length: geometry.final_length(),
            segment_length: geometry.segment_length(),
        }
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// `[batch, 1, segment_length]` -> (`mu`, `logvar`), each `[batch, latent_dim]`.
    pub fn encode(&self, x: Tensor<B, 3>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let mut x = x;
        for conv in &self.encoder {
            x = leaky_relu(conv.forward(x), LEAKY_SLOPE);
        }
        let x: Tensor<B, 2> = x.flatten(1, 2);
        (self.fc_mu.forward(x.clone()), self.fc_logvar.forward(x))
    }

    /// `z = mu + exp(0.5 * logvar) * eps`, with `eps` drawn from `rng`.
    pub fn reparameterize<R: Rng + ?Sized>(
        &self,
        mu: Tensor<B, 2>,
        logvar: Tensor<B, 2>,
        rng: &mut R,
    ) -> Tensor<B, 2> {
        let std = logvar.mul_scalar(0.5).exp();
        let eps = standard_normal::<B, 2, R>(std.dims(), &std.device(), rng);
        mu + eps * std
    }

    /// `[batch, latent_dim]` -> `[batch, 1, segment_length]`.
    ///
    /// # Panics
    ///
    /// If the second dimension of `z` is not `latent_dim`. Use
    /// [`decode_checked`](Self::decode_checked) for latents from outside the model.
    pub fn decode(&self, z: Tensor<B, 2>) -> Tensor<B, 3> {
        let [batch, _] = z.dims();
        let mut x = self
            .decoder_input
            .forward(z)
            .reshape([batch, self.last_filters, self.final_length]);
        for layer in &self.decoder {
            x = leaky_relu(layer.forward(x), LEAKY_SLOPE);
        }
        self.final_layer.forward(x)
    }

    /// [`decode`](Self::decode) after checking the latent width.
    pub fn decode_checked(&self, z: Tensor<B, 2>) -> Result<Tensor<B, 3>> {
        let [batch, width] = z.dims();
        expect_dims(
            "latent".into(),
            vec![batch, self.latent_dim],
            vec![batch, width],
        )?;
        Ok(self.decode(z))
    }

    /// Full round trip: returns (`x_hat`, `mu`, `logvar`).
    pub fn forward<R: Rng + ?Sized>(
        &self,
        x: Tensor<B, 3>,
        rng: &mut R,
    ) -> (Tensor<B, 3>, Tensor<B, 2>, Tensor<B, 2>) {
        let (mu, logvar) = self.encode(x);
        let z = self.reparameterize(mu.clone(), logvar.clone(), rng);
        (self.decode(z), mu, logvar)
    }

    /// Check every layer of this model against `geometry`.
    pub fn check_shapes(&self, geometry: &ArchitectureGeometry) -> Result<()> {
        check_record(&self.clone().into_record(), geometry)
    }

    /// Load `record` after checking its shapes against `geometry`.
    pub fn load_checked(
        self,
        record: DynamicVaeRecord<B>,
        geometry: &ArchitectureGeometry,
    ) -> Result<Self> {
        check_record(&record, geometry)?;
        Ok(self.load_record(record))
    }
}

fn transposed_stage<B: Backend>(channels: [usize; 2], device: &B::Device) -> ConvTranspose1d<B> {
    ConvTranspose1dConfig::new(channels, KERNEL_SIZE)
        .with_stride(STRIDE)
        .with_padding(PADDING)
        .with_padding_out(OUTPUT_PADDING)
        .init(device)
}

/// Tensor of i.i.d. standard-normal samples drawn from `rng`.
pub fn standard_normal<B: Backend, const D: usize, R: Rng + ?Sized>(
    shape: [usize; D],
    device: &B::Device,
    rng: &mut R,
) -> Tensor<B, D> {
    let n: usize = shape.iter().product();
    let values: Vec<f32> = (0..n).map(|_| StandardNormal.sample(rng)).collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

fn expect_dims(layer: String, expected: Vec<usize>, found: Vec<usize>) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            layer,
            expected,
            found,
        })
    }
}

/// Compare every weight tensor in `record` with the shapes `geometry` implies.
///
/// Layer counts are checked first so a deeper or shallower record never
/// reaches `load_record`.
pub fn check_record<B: Backend>(
    record: &DynamicVaeRecord<B>,
    geometry: &ArchitectureGeometry,
) -> Result<()> {
    let filters = geometry.filters();
    let reversed = geometry.decoder_filters();
    let flattened = geometry.flattened_size();
    let latent = geometry.latent_dim();

    expect_dims(
        "encoder".into(),
        vec![filters.len()],
        vec![record.encoder.len()],
    )?;
    expect_dims(
        "decoder".into(),
        vec![filters.len() - 1],
        vec![record.decoder.len()],
    )?;

    let mut in_channels = 1;
    for (i, (conv, &out_channels)) in record.encoder.iter().zip(filters).enumerate() {
        expect_dims(
            format!("encoder.{i}"),
            vec![out_channels, in_channels, KERNEL_SIZE],
            conv.weight.val().dims().to_vec(),
        )?;
        in_channels = out_channels;
    }

    // Linear weights are stored [d_input, d_output].
    expect_dims(
        "fc_mu".into(),
        vec![flattened, latent],
        record.fc_mu.weight.val().dims().to_vec(),
    )?;
    expect_dims(
        "fc_logvar".into(),
        vec![flattened, latent],
        record.fc_logvar.weight.val().dims().to_vec(),
    )?;
    expect_dims(
        "decoder_input".into(),
        vec![latent, flattened],
        record.decoder_input.weight.val().dims().to_vec(),
    )?;

    // Transposed convolution weights are stored [in, out, kernel].
    for (i, (layer, pair)) in record.decoder.iter().zip(reversed.windows(2)).enumerate() {
        expect_dims(
            format!("decoder.{i}"),
            vec![pair[0], pair[1], KERNEL_SIZE],
            layer.weight.val().dims().to_vec(),
        )?;
    }
    expect_dims(
        "final_layer".into(),
        vec![filters[0], 1, KERNEL_SIZE],
        record.final_layer.weight.val().dims().to_vec(),
    )
}
