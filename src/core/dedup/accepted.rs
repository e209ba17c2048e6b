//! The running set of signatures considered kept during a pass.

use crate::core::comparator::MatchStrategy;
use crate::core::hasher::Signature;
use std::path::{Path, PathBuf};

/// Signatures of every image accepted so far, in acceptance order.
///
/// Owned by a single pass; acceptance of image `k` depends on the outcome
/// for images `0..k`, so it is never shared across threads. Only images that
/// are actually kept may join it.
#[derive(Debug, Clone, Default)]
pub struct AcceptedSet {
    paths: Vec<PathBuf>,
    signatures: Vec<Signature>,
}

impl AcceptedSet {
    /// Create an empty accepted set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kept image
    pub fn insert(&mut self, path: PathBuf, signature: Signature) {
        self.paths.push(path);
        self.signatures.push(signature);
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Accepted signatures in acceptance order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The earliest accepted image the candidate duplicates, with its distance
    pub fn find_duplicate(
        &self,
        candidate: &Signature,
        strategy: &MatchStrategy,
    ) -> Option<(&Path, u32)> {
        first_duplicate(candidate, &self.signatures, strategy)
            .map(|(index, distance)| (self.paths[index].as_path(), distance))
    }
}

/// Whether `candidate` duplicates any accepted signature.
///
/// A missing candidate signature (the image could not be decoded) counts as
/// a duplicate: an unreadable asset is never worth keeping blindly.
pub fn is_duplicate_of_any(
    candidate: Option<&Signature>,
    accepted: &[Signature],
    strategy: &MatchStrategy,
) -> bool {
    candidate.map_or(true, |candidate| {
        first_duplicate(candidate, accepted, strategy).is_some()
    })
}

/// Position and distance of the first accepted signature `candidate` matches
fn first_duplicate(
    candidate: &Signature,
    accepted: &[Signature],
    strategy: &MatchStrategy,
) -> Option<(usize, u32)> {
    accepted.iter().enumerate().find_map(|(index, signature)| {
        strategy
            .duplicate_distance(candidate, signature)
            .map(|distance| (index, distance))
    })
}
