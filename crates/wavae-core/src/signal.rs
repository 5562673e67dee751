//! Mono amplitude sequences handed to the core by ingestion collaborators.

use crate::error::{Error, Result};

/// A mono waveform plus the rate it was sampled at.
///
/// Multi-channel sources are collapsed to one channel by averaging before they
/// get here (see [`RawSignal::from_interleaved`]).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    samples: Vec<f32>,
    sample_rate: f64,
}

impl RawSignal {
    /// Wrap mono samples. Fails on a non-positive or non-finite rate.
    pub fn new(samples: Vec<f32>, sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a mono signal from interleaved frames by averaging each frame.
    ///
    /// A trailing partial frame is ignored.
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: f64) -> Result<Self> {
        if channels == 0 {
            return Err(Error::DegenerateSignal("zero channels".into()));
        }
        if channels == 1 {
            return Self::new(interleaved.to_vec(), sample_rate);
        }

        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Whole-signal z-score normalization: `(x - mean) / std`.
    ///
    /// This is independent of the batch-level re-normalization the segmenter
    /// can apply afterwards.
    pub fn normalized(&self) -> Result<Self> {
        let (mean, std) = mean_std(&self.samples)
            .ok_or_else(|| Error::DegenerateSignal("cannot normalize an empty signal".into()))?;
        if std <= 0.0 || !std.is_finite() {
            return Err(Error::DegenerateSignal(format!(
                "cannot normalize a signal with standard deviation {std}"
            )));
        }

        let samples = self
            .samples
            .iter()
            .map(|&x| ((x as f64 - mean) / std) as f32)
            .collect();
        Ok(Self {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

/// Population mean and standard deviation, accumulated in f64.
pub fn mean_std(values: &[f32]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Some((mean, var.sqrt()))
}
