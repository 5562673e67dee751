//! Threshold rules mapping signal statistics to a VAE architecture.
//!
//! Amplitude spread picks the capacity tier, clip duration picks the window:
//!
//! | `std`            | `latent_dim` | `filters`   |
//! |------------------|--------------|-------------|
//! | `< 0.05`         | 16           | `[16, 32]`  |
//! | `< 0.20`         | 32           | `[32, 64]`  |
//! | otherwise        | 64           | `[64, 128]` |
//!
//! `segment_length` is 512 when `duration > 2.0` seconds, else 256.
//!
//! Entropy, RMS, mean and zero crossings are computed by the analyzer but are
//! not consulted here.

use crate::stats::SignalStatistics;
use wavae_core::ArchitectureConfig;

/// Upper bound (exclusive) of `std` for the narrow tier.
pub const NARROW_STD_LIMIT: f64 = 0.05;
/// Upper bound (exclusive) of `std` for the medium tier.
pub const MEDIUM_STD_LIMIT: f64 = 0.20;
/// Clips strictly longer than this many seconds get the long window.
pub const LONG_CLIP_SECONDS: f64 = 2.0;

pub const SHORT_SEGMENT: usize = 256;
pub const LONG_SEGMENT: usize = 512;

/// Capacity tier chosen from amplitude spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityTier {
    Narrow,
    Medium,
    Wide,
}

impl CapacityTier {
    pub fn from_std(std: f64) -> Self {
        if std < NARROW_STD_LIMIT {
            CapacityTier::Narrow
        } else if std < MEDIUM_STD_LIMIT {
            CapacityTier::Medium
        } else {
            CapacityTier::Wide
        }
    }

    pub fn latent_dim(self) -> usize {
        match self {
            CapacityTier::Narrow => 16,
            CapacityTier::Medium => 32,
            CapacityTier::Wide => 64,
        }
    }

    pub fn filters(self) -> Vec<usize> {
        match self {
            CapacityTier::Narrow => vec![16, 32],
            CapacityTier::Medium => vec![32, 64],
            CapacityTier::Wide => vec![64, 128],
        }
    }
}

/// Window length for a clip of `duration` seconds.
pub fn segment_length_for(duration: f64) -> usize {
    if duration > LONG_CLIP_SECONDS {
        LONG_SEGMENT
    } else {
        SHORT_SEGMENT
    }
}

/// Derive the architecture for a signal from its statistics.
pub fn design_architecture(stats: &SignalStatistics) -> ArchitectureConfig {
    let tier = CapacityTier::from_std(stats.std);
    ArchitectureConfig::new(
        tier.latent_dim(),
        tier.filters(),
        segment_length_for(stats.duration),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats(std: f64, duration: f64) -> SignalStatistics {
        SignalStatistics {
            length: 1000,
            duration,
            mean: 0.0,
            std,
            rms: std,
            spectral_entropy: 0.0,
            zero_crossings: 0,
        }
    }

    #[test]
    fn test_tier_boundaries_are_strict() {
        assert_eq!(CapacityTier::from_std(0.049), CapacityTier::Narrow);
        assert_eq!(CapacityTier::from_std(0.05), CapacityTier::Medium);
        assert_eq!(CapacityTier::from_std(0.199), CapacityTier::Medium);
        assert_eq!(CapacityTier::from_std(0.20), CapacityTier::Wide);
    }

    #[test]
    fn test_duration_boundary() {
        assert_eq!(segment_length_for(2.0), 256);
        assert_eq!(segment_length_for(2.0001), 512);
        assert_eq!(segment_length_for(0.5), 256);
    }

    #[test]
    fn test_mid_tier_long_clip() {
        let config = design_architecture(&stats(0.15, 5.0));
        assert_eq!(config, ArchitectureConfig::new(32, vec![32, 64], 512));
    }

    #[test]
    fn test_unused_statistics_do_not_matter() {
        let mut a = stats(0.3, 1.0);
        let b = a;
        a.spectral_entropy = 12.0;
        a.zero_crossings = 999;
        a.rms = 5.0;
        assert_eq!(design_architecture(&a), design_architecture(&b));
    }

    proptest! {
        #[test]
        fn prop_narrow_tier(std in 0.0f64..0.05, duration in 0.0f64..20.0) {
            let config = design_architecture(&stats(std, duration));
            prop_assert_eq!(config.latent_dim, 16);
            prop_assert_eq!(config.filters, vec![16, 32]);
        }

        #[test]
        fn prop_segment_length(std in 0.0f64..3.0, duration in 0.0f64..20.0) {
            let config = design_architecture(&stats(std, duration));
            let expected = if duration > 2.0 { 512 } else { 256 };
            prop_assert_eq!(config.segment_length, expected);
        }

        #[test]
        fn prop_designed_configs_have_valid_geometry(std in 0.0f64..3.0, duration in 0.0f64..20.0) {
            let config = design_architecture(&stats(std, duration));
            let geometry = config.geometry().unwrap();
            prop_assert!(geometry.final_length() > 0);
        }
    }
}
