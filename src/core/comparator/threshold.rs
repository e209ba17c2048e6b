//! Threshold validation for perceptual matching.

use crate::core::hasher::Fingerprint;
use crate::error::CompareError;

/// A perceptual threshold known to lie in 0-64
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdStrategy {
    threshold: u32,
}

impl ThresholdStrategy {
    /// Default threshold for event imagery
    pub const DEFAULT_THRESHOLD: u32 = 5;

    /// Validate a threshold.
    ///
    /// A threshold bounds a distance over 64 bits. Zero flags nothing, 64
    /// flags everything short of exact inversion.
    pub fn new(threshold: u32) -> Result<Self, CompareError> {
        if threshold > Fingerprint::BITS {
            return Err(CompareError::InvalidThreshold { value: threshold });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}
