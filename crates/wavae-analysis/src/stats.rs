//! Signal Statistics
//!
//! Descriptive statistics of a raw waveform, computed once per training run.
//!
//! ## Features
//!
//! - **Moments**: population mean, standard deviation and RMS
//! - **Amplitude entropy**: Shannon entropy of a 50-bin density histogram
//!   (reported as `spectral_entropy` for descriptor compatibility)
//! - **Zero crossings**: count of strict sign changes between neighbours

use wavae_core::{Error, RawSignal, Result};

/// Number of histogram bins used for the entropy estimate.
pub const ENTROPY_BINS: usize = 50;

/// Added to every density bin so empty bins don't hit `log2(0)`.
pub const ENTROPY_EPSILON: f64 = 1e-8;

/// Minimum signal length: zero crossings need at least one neighbour pair.
pub const MIN_SIGNAL_LEN: usize = 2;

/// Immutable summary of a [`RawSignal`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SignalStatistics {
    /// Number of samples
    pub length: usize,
    /// Length divided by sample rate, in seconds
    pub duration: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub rms: f64,
    /// Entropy of the amplitude-density histogram. Despite the name this is
    /// not a frequency-domain quantity.
    pub spectral_entropy: f64,
    pub zero_crossings: usize,
}

/// Compute [`SignalStatistics`] for a signal.
///
/// Fails on fewer than [`MIN_SIGNAL_LEN`] samples or on non-finite samples.
pub fn analyze(signal: &RawSignal) -> Result<SignalStatistics> {
    let samples = signal.samples();
    if samples.len() < MIN_SIGNAL_LEN {
        return Err(Error::SignalTooShort {
            len: samples.len(),
            min: MIN_SIGNAL_LEN,
        });
    }
    if let Some(pos) = samples.iter().position(|x| !x.is_finite()) {
        return Err(Error::DegenerateSignal(format!(
            "non-finite sample at index {pos}"
        )));
    }

    let n = samples.len() as f64;
    let (mean, std) = wavae_core::mean_std(samples)
        .ok_or(Error::SignalTooShort {
            len: 0,
            min: MIN_SIGNAL_LEN,
        })?;
    let rms = (samples.iter().map(|&x| (x as f64).powi(2)).sum::<f64>() / n).sqrt();

    Ok(SignalStatistics {
        length: samples.len(),
        duration: signal.duration(),
        mean,
        std,
        rms,
        spectral_entropy: amplitude_entropy(samples, ENTROPY_BINS),
        zero_crossings: zero_crossings(samples),
    })
}

/// Count adjacent pairs whose product is strictly negative.
pub fn zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|pair| pair[0] * pair[1] < 0.0)
        .count()
}

/// `-Σ h·log2(h)` over a density histogram with [`ENTROPY_EPSILON`] added to each bin.
pub fn amplitude_entropy(samples: &[f32], bins: usize) -> f64 {
    density_histogram(samples, bins)
        .into_iter()
        .map(|h| h + ENTROPY_EPSILON)
        .map(|h| -h * h.log2())
        .sum()
}

/// Equal-width histogram over `[min, max]`, normalized so that it integrates
/// to one (`count / (n * bin_width)`).
///
/// Follows the usual convention that the last bin is closed on the right,
/// and widens a zero range to `[v - 0.5, v + 0.5]`.
pub fn density_histogram(samples: &[f32], bins: usize) -> Vec<f64> {
    if samples.is_empty() || bins == 0 {
        return vec![0.0; bins];
    }

    let (mut first, mut last) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x as f64), hi.max(x as f64))
        });
    if first == last {
        first -= 0.5;
        last += 0.5;
    }

    let step = (last - first) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { last } else { first + i as f64 * step })
        .collect();
    let norm = bins as f64 / (last - first);

    let mut counts = vec![0usize; bins];
    for &x in samples {
        let x = x as f64;
        let mut idx = (((x - first) * norm) as usize).min(bins - 1);
        if x < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < bins && x >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let total = samples.len() as f64;
    counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, edge)| c as f64 / (total * (edge[1] - edge[0])))
        .collect()
}
