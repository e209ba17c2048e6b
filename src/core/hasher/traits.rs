//! Fingerprint value types and the hashing trait.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A 64-bit difference-hash fingerprint.
///
/// Bits are laid out row-major over the 8x8 comparison grid, the first
/// comparison (row 0, column 0) in the most significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint
    pub const BITS: u32 = 64;

    /// Wrap raw fingerprint bits
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw fingerprint bits
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: the number of bit positions that differ (0-64)
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Render as a 64 character string of `0` and `1`
    pub fn to_bit_string(&self) -> String {
        format!("{:064b}", self.0)
    }

    /// Parse the output of [`Fingerprint::to_bit_string`]
    pub fn from_bit_string(bits: &str) -> Option<Self> {
        if bits.len() != Self::BITS as usize || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return None;
        }
        u64::from_str_radix(bits, 2).ok().map(Self)
    }

    /// Render as 16 hex digits
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Digest of a file's raw bytes, used for exact-duplicate detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteDigest(u64);

impl ByteDigest {
    /// Wrap a digest value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw digest value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ByteDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// What a hasher produced for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    /// Visual fingerprint (dHash)
    Perceptual(Fingerprint),
    /// Raw byte digest
    Exact(ByteDigest),
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signature::Perceptual(fingerprint) => write!(f, "dhash:{}", fingerprint),
            Signature::Exact(digest) => write!(f, "xxh3:{}", digest),
        }
    }
}

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Difference Hash (dHash) over a 9x8 grayscale thumbnail
    Difference,
    /// xxh3 digest of the raw file bytes
    Exact,
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Exact => write!(f, "xxh3"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a signature directly from a file path
    fn hash_file(&self, path: &Path) -> Result<Signature, HashError>;

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;
}
