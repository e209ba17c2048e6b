//! Exact-duplicate digest over raw file bytes.
//!
//! Two files match only when their bytes are identical; a re-encoded copy of
//! the same picture does not.

use super::super::traits::{ByteDigest, HashAlgorithm, HashAlgorithmKind, Signature};
use crate::error::HashError;
use std::fs;
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// xxh3 digest of the whole file
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactHasher;

impl ExactHasher {
    /// Create a new byte hasher
    pub fn new() -> Self {
        Self
    }

    /// Digest an in-memory buffer
    pub fn digest(&self, bytes: &[u8]) -> ByteDigest {
        ByteDigest::new(xxh3_64(bytes))
    }
}

impl HashAlgorithm for ExactHasher {
    fn hash_file(&self, path: &Path) -> Result<Signature, HashError> {
        let bytes = fs::read(path).map_err(|e| HashError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An empty file is never a usable asset, under either strategy
        if bytes.is_empty() {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(Signature::Exact(self.digest(&bytes)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Exact
    }
}
