//! # Comparator Module
//!
//! Decides whether two image signatures represent the same content.
//!
//! ## Strategies
//! - **Perceptual** - dHash fingerprints, duplicate when the Hamming
//!   distance is strictly below the threshold
//! - **Exact** - byte digests, duplicate only when identical
//!
//! ## Distance Classification
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Different     |

mod threshold;

pub use threshold::ThresholdStrategy;

use crate::core::hasher::{Fingerprint, HashAlgorithmKind, Signature};
use crate::error::CompareError;
use serde::{Deserialize, Serialize};

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, probably different pictures
    Different,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::Different,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::Different => write!(f, "Different"),
        }
    }
}

/// How duplicates are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Byte-identical files only
    Exact,
    /// Visual near-duplicates: dHash distance below `threshold`
    Perceptual { threshold: u32 },
}

impl MatchStrategy {
    /// Perceptual strategy with a validated threshold (0-64)
    pub fn perceptual(threshold: u32) -> Result<Self, CompareError> {
        let threshold = ThresholdStrategy::new(threshold)?.threshold();
        Ok(MatchStrategy::Perceptual { threshold })
    }

    /// The hash algorithm that produces signatures for this strategy
    pub fn hash_kind(&self) -> HashAlgorithmKind {
        match self {
            MatchStrategy::Exact => HashAlgorithmKind::Exact,
            MatchStrategy::Perceptual { .. } => HashAlgorithmKind::Difference,
        }
    }

    /// Check the threshold is in range.
    ///
    /// A strategy built by hand or deserialized skips [`MatchStrategy::perceptual`],
    /// so [`crate::core::dedup::Deduplicator::new`] validates once up front.
    pub fn validate(&self) -> Result<(), CompareError> {
        match self {
            MatchStrategy::Exact => Ok(()),
            MatchStrategy::Perceptual { threshold } => {
                ThresholdStrategy::new(*threshold).map(|_| ())
            }
        }
    }

    /// Compare two signatures.
    ///
    /// Returns the distance when `candidate` duplicates `accepted`, `None`
    /// otherwise. Signatures of different kinds never match. The threshold is
    /// taken as already validated.
    pub fn duplicate_distance(&self, candidate: &Signature, accepted: &Signature) -> Option<u32> {
        match (self, candidate, accepted) {
            (MatchStrategy::Exact, Signature::Exact(a), Signature::Exact(b)) => {
                (a == b).then_some(0)
            }
            (
                MatchStrategy::Perceptual { threshold },
                Signature::Perceptual(a),
                Signature::Perceptual(b),
            ) => {
                let distance = hamming_distance(a, b);
                is_duplicate(distance, *threshold).then_some(distance)
            }
            _ => None,
        }
    }
}

impl Default for MatchStrategy {
    fn default() -> Self {
        MatchStrategy::Perceptual {
            threshold: ThresholdStrategy::DEFAULT_THRESHOLD,
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStrategy::Exact => write!(f, "exact bytes"),
            MatchStrategy::Perceptual { threshold } => {
                write!(f, "dHash distance < {}", threshold)
            }
        }
    }
}

/// Count of differing bit positions (0-64)
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> u32 {
    a.distance(b)
}

/// The duplicate decision rule: `distance < threshold`
pub fn is_duplicate(distance: u32, threshold: u32) -> bool {
    distance < threshold
}
