//! # Hasher Module
//!
//! Computes the per-image signatures the deduplicator compares.
//!
//! ## Supported Algorithms
//! - **dHash (Difference Hash)** - 64-bit visual fingerprint, robust to
//!   recompression and resizing
//! - **Exact** - xxh3 digest of the raw bytes, byte-identical copies only
//!
//! ## How dHash Works
//! 1. Convert to grayscale
//! 2. Resize to 9x8 with a fixed bilinear filter
//! 3. Compare each pixel with its right neighbour (64 comparisons)
//! 4. Compare fingerprints using Hamming distance
//!
//! ## Example
//! ```rust,ignore
//! use event_image_dedup::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Difference)
//!     .build();
//!
//! let signature = hasher.hash_file(&path)?;
//! ```

mod algorithms;
pub mod fast_decode;
pub mod fast_resize;
mod traits;

pub use algorithms::{DifferenceHasher, ExactHasher};
pub use traits::{ByteDigest, Fingerprint, HashAlgorithm, HashAlgorithmKind, Signature};

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration (dHash)
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Difference,
        }
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Box<dyn HashAlgorithm> {
        match self.algorithm {
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new()),
            HashAlgorithmKind::Exact => Box::new(ExactHasher::new()),
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
