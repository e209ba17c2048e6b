//! # Dedup Module
//!
//! Partitions an ordered image set into kept and removed images.
//!
//! ## Algorithm
//! Every image is fingerprinted once (in parallel), then visited in
//! discovery order against a growing [`AcceptedSet`]:
//! - duplicates of an accepted image are removed, so the earliest image of
//!   any cluster survives
//! - everything else is accepted and joins the set
//!
//! A batch pass starts from an empty accepted set. Ingestion starts from the
//! images already on disk (the baseline) and admits candidates against it.
//!
//! Deleting removed files is left to the caller; this module only decides.

mod accepted;

pub use accepted::{is_duplicate_of_any, AcceptedSet};

use crate::core::comparator::{MatchStrategy, MatchType};
use crate::core::hasher::{HashAlgorithm, HasherConfig, Signature};
use crate::core::scanner::ImageFile;
use crate::error::{CompareError, HashError};
use crate::events::{
    null_sender, DedupEvent, Event, EventSender, FingerprintEvent, FingerprintProgress,
    PipelinePhase,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What happens to an image whose signature cannot be computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailurePolicy {
    /// Treat it as a duplicate and remove it
    #[default]
    Discard,
    /// Keep it in place for manual review; it never joins the accepted set
    Keep,
}

/// Why an image was removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovalReason {
    /// Matches an image accepted earlier
    Duplicate {
        of: PathBuf,
        distance: u32,
        match_type: MatchType,
    },
    /// Could not be decoded or read
    Undecodable { reason: String },
}

/// An image the pass decided to remove
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedImage {
    pub image: ImageFile,
    pub reason: RemovalReason,
}

impl RemovedImage {
    /// Whether the image was removed for failing to decode
    pub fn is_undecodable(&self) -> bool {
        matches!(self.reason, RemovalReason::Undecodable { .. })
    }
}

/// Result of a deduplication pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupOutcome {
    /// Retained images, in discovery order
    pub kept: Vec<ImageFile>,
    /// Removed images, in discovery order
    pub removed: Vec<RemovedImage>,
}

impl DedupOutcome {
    /// Removed images that were exact or near duplicates
    pub fn duplicates(&self) -> impl Iterator<Item = &RemovedImage> {
        self.removed.iter().filter(|r| !r.is_undecodable())
    }

    /// Removed images that could not be decoded
    pub fn undecodable(&self) -> impl Iterator<Item = &RemovedImage> {
        self.removed.iter().filter(|r| r.is_undecodable())
    }
}

/// Decision for a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(RemovalReason),
}

/// Runs accept/reject passes with one strategy and decode-failure policy
pub struct Deduplicator {
    strategy: MatchStrategy,
    decode_failure: DecodeFailurePolicy,
    hasher: Box<dyn HashAlgorithm>,
}

impl Deduplicator {
    /// Create a deduplicator for a strategy
    pub fn new(strategy: MatchStrategy) -> Result<Self, CompareError> {
        strategy.validate()?;
        Ok(Self {
            strategy,
            decode_failure: DecodeFailurePolicy::default(),
            hasher: HasherConfig::new().algorithm(strategy.hash_kind()).build(),
        })
    }

    /// Set what happens to undecodable images
    pub fn decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    /// The strategy in use
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Compute signatures for every image, preserving input order.
    ///
    /// Each signature depends only on its own file, so this runs in parallel.
    pub fn signatures(
        &self,
        images: &[ImageFile],
        events: &EventSender,
    ) -> Vec<Result<Signature, HashError>> {
        let total = images.len();
        events.send(Event::Fingerprint(FingerprintEvent::Started {
            total_images: total,
        }));

        let completed = AtomicUsize::new(0);
        let signatures: Vec<_> = images
            .par_iter()
            .map(|image| {
                let result = self.hasher.hash_file(&image.path);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if let Err(e) = &result {
                    events.send(Event::Fingerprint(FingerprintEvent::Error {
                        path: image.path.clone(),
                        message: e.to_string(),
                    }));
                }
                events.send(Event::Fingerprint(FingerprintEvent::Progress(
                    FingerprintProgress {
                        completed: done,
                        total,
                        current_path: image.path.clone(),
                    },
                )));

                result
            })
            .collect();

        let failures = signatures.iter().filter(|s| s.is_err()).count();
        events.send(Event::Fingerprint(FingerprintEvent::Completed {
            fingerprinted: total - failures,
            failures,
        }));

        signatures
    }

    /// Decide one candidate against the accepted set.
    ///
    /// The set is left untouched: an accepted candidate joins it only once
    /// the caller has actually kept the image (see [`Deduplicator::partition`]).
    pub fn decide(
        &self,
        accepted: &AcceptedSet,
        image: &ImageFile,
        signature: &Result<Signature, HashError>,
        events: &EventSender,
    ) -> Decision {
        let signature = match signature {
            Ok(signature) => signature,
            Err(e) => return self.undecodable(image, e, events),
        };

        if let Some((original, distance)) = accepted.find_duplicate(signature, &self.strategy) {
            let of = original.to_path_buf();
            tracing::debug!(
                image = %image.path.display(),
                of = %of.display(),
                distance,
                "rejected duplicate"
            );
            events.send(Event::Dedup(DedupEvent::Rejected {
                path: image.path.clone(),
                duplicate_of: of.clone(),
                distance,
            }));
            return Decision::Reject(RemovalReason::Duplicate {
                of,
                distance,
                match_type: MatchType::from_distance(distance),
            });
        }

        tracing::debug!(image = %image.path.display(), %signature, "accepted");
        events.send(Event::Dedup(DedupEvent::Accepted {
            path: image.path.clone(),
        }));
        Decision::Accept
    }

    fn undecodable(&self, image: &ImageFile, error: &HashError, events: &EventSender) -> Decision {
        tracing::warn!(image = %image.path.display(), %error, "cannot fingerprint image");
        events.send(Event::Dedup(DedupEvent::Undecodable {
            path: image.path.clone(),
            message: error.to_string(),
        }));
        match self.decode_failure {
            DecodeFailurePolicy::Discard => Decision::Reject(RemovalReason::Undecodable {
                reason: error.to_string(),
            }),
            DecodeFailurePolicy::Keep => Decision::Accept,
        }
    }

    /// Seed an accepted set from images already known to be good.
    ///
    /// Baseline images that fail to decode are skipped, never removed.
    pub fn baseline(&self, images: &[ImageFile], events: &EventSender) -> AcceptedSet {
        let mut accepted = AcceptedSet::new();
        if images.is_empty() {
            return accepted;
        }

        for (image, signature) in images.iter().zip(self.signatures(images, events)) {
            match signature {
                Ok(signature) => accepted.insert(image.path.clone(), signature),
                Err(e) => {
                    tracing::warn!(
                        image = %image.path.display(),
                        error = %e,
                        "baseline image skipped"
                    );
                }
            }
        }
        accepted
    }

    /// Deduplicate one batch; the earliest image of each cluster is kept
    pub fn deduplicate(&self, images: &[ImageFile]) -> DedupOutcome {
        self.deduplicate_with_events(images, &null_sender())
    }

    /// Deduplicate one batch, reporting progress via events
    pub fn deduplicate_with_events(
        &self,
        images: &[ImageFile],
        events: &EventSender,
    ) -> DedupOutcome {
        self.deduplicate_against(&[], images, events)
    }

    /// Deduplicate candidates against a baseline and against each other.
    ///
    /// Baseline images are never part of the outcome.
    pub fn deduplicate_against(
        &self,
        baseline: &[ImageFile],
        candidates: &[ImageFile],
        events: &EventSender,
    ) -> DedupOutcome {
        events.phase(PipelinePhase::Fingerprinting);
        let accepted = self.baseline(baseline, events);
        let signatures = self.signatures(candidates, events);

        events.phase(PipelinePhase::Deduplicating);
        self.partition(accepted, candidates, signatures, events)
    }

    /// Accept or reject `images` in order using precomputed signatures
    /// (one per image, as returned by [`Deduplicator::signatures`])
    pub fn partition(
        &self,
        mut accepted: AcceptedSet,
        images: &[ImageFile],
        signatures: Vec<Result<Signature, HashError>>,
        events: &EventSender,
    ) -> DedupOutcome {
        let mut outcome = DedupOutcome::default();

        for (image, signature) in images.iter().zip(signatures) {
            match self.decide(&accepted, image, &signature, events) {
                Decision::Accept => {
                    if let Ok(signature) = signature {
                        accepted.insert(image.path.clone(), signature);
                    }
                    outcome.kept.push(image.clone());
                }
                Decision::Reject(reason) => outcome.removed.push(RemovedImage {
                    image: image.clone(),
                    reason,
                }),
            }
        }

        tracing::info!(
            kept = outcome.kept.len(),
            removed = outcome.removed.len(),
            strategy = %self.strategy,
            "deduplication pass complete"
        );
        events.send(Event::Dedup(DedupEvent::Completed {
            kept: outcome.kept.len(),
            removed: outcome.removed.len(),
        }));

        outcome
    }
}
