//! Fixed-length overlapping windows cut from a signal.

use crate::error::{Error, Result};
use crate::signal::{mean_std, RawSignal};

/// Slides a window of `segment_length` over a signal.
///
/// Windows start at 0 and advance by `stride` (default `segment_length / 2`).
/// The trailing partial window is dropped, never padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    segment_length: usize,
    stride: usize,
    normalize: bool,
}

impl Segmenter {
    pub fn new(segment_length: usize) -> Self {
        Self {
            segment_length,
            stride: (segment_length / 2).max(1),
            normalize: false,
        }
    }

    /// Override the hop between window starts. `None` keeps the default.
    pub fn with_stride(mut self, stride: Option<usize>) -> Self {
        if let Some(stride) = stride {
            self.stride = stride;
        }
        self
    }

    /// Re-normalize the whole batch after windowing.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of windows a signal of `len` samples yields.
    pub fn window_count(&self, len: usize) -> usize {
        if self.stride == 0 || self.segment_length == 0 || len < self.segment_length {
            return 0;
        }
        (len - self.segment_length) / self.stride + 1
    }

    /// Cut `samples` into windows. Returns an empty batch when the signal is
    /// shorter than one window.
    pub fn windows(&self, samples: &[f32]) -> Result<SegmentBatch> {
        if self.stride == 0 {
            return Err(Error::InvalidStride);
        }
        if self.segment_length == 0 {
            return Err(Error::InvalidArchitecture(
                "segment_length must be positive".into(),
            ));
        }

        let count = self.window_count(samples.len());
        let mut data = Vec::with_capacity(count * self.segment_length);
        for start in (0..count).map(|i| i * self.stride) {
            data.extend_from_slice(&samples[start..start + self.segment_length]);
        }

        let mut batch = SegmentBatch {
            data,
            segment_length: self.segment_length,
        };
        if self.normalize && !batch.is_empty() {
            batch.normalize()?;
        }
        Ok(batch)
    }

    /// Segment a signal for training. Zero windows is an error here.
    pub fn segment(&self, signal: &RawSignal) -> Result<SegmentBatch> {
        let batch = self.windows(signal.samples())?;
        if batch.is_empty() {
            return Err(Error::EmptySegmentBatch {
                signal_len: signal.len(),
                segment_length: self.segment_length,
            });
        }
        Ok(batch)
    }
}

/// Row-major `[count, segment_length]` window matrix (channel dimension 1).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBatch {
    data: Vec<f32>,
    segment_length: usize,
}

impl SegmentBatch {
    pub fn len(&self) -> usize {
        if self.segment_length == 0 {
            0
        } else {
            self.data.len() / self.segment_length
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.segment_length)?;
        self.data.get(start..start + self.segment_length)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.segment_length.max(1))
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    /// Gather rows by index into one flat buffer, in the given order.
    pub fn gather(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * self.segment_length);
        for &i in indices {
            if let Some(row) = self.get(i) {
                out.extend_from_slice(row);
            }
        }
        out
    }

    /// Subtract the batch mean and divide by the batch standard deviation.
    pub fn normalize(&mut self) -> Result<()> {
        let (mean, std) = mean_std(&self.data)
            .ok_or_else(|| Error::DegenerateSignal("cannot normalize an empty batch".into()))?;
        if std <= 0.0 || !std.is_finite() {
            return Err(Error::DegenerateSignal(format!(
                "cannot normalize a batch with standard deviation {std}"
            )));
        }
        for x in &mut self.data {
            *x = ((*x as f64 - mean) / std) as f32;
        }
        Ok(())
    }
}
