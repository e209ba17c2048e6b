//! Admitting newly downloaded candidates into an existing event directory.

use crate::core::comparator::MatchStrategy;
use crate::core::dedup::{DecodeFailurePolicy, Decision, Deduplicator, RemovedImage};
use crate::core::renumber::{target_name, RenameStep};
use crate::core::scanner::{next_index, DirectoryScanner, ImageFile, ImageScanner};
use crate::error::{DedupError, RenameError};
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of one ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Target directory
    pub dir: PathBuf,
    /// Images already present before ingestion
    pub baseline: usize,
    /// Candidates moved in, with their new names
    pub admitted: Vec<RenameStep>,
    /// Candidates rejected as duplicates or undecodable
    pub rejected: Vec<RemovedImage>,
    /// Candidates not considered because the limit was reached
    pub skipped: Vec<PathBuf>,
    /// Non-fatal errors
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Admits candidate images into a directory, rejecting any that duplicate
/// an image already there or an earlier candidate
pub struct Ingestor {
    dedup: Deduplicator,
    limit: Option<usize>,
    discard_rejected: bool,
}

impl Ingestor {
    pub fn new(strategy: MatchStrategy) -> Result<Self, DedupError> {
        Ok(Self {
            dedup: Deduplicator::new(strategy)?,
            limit: None,
            discard_rejected: false,
        })
    }

    /// Stop admitting once the directory holds `limit` images
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Delete rejected candidate files instead of leaving them in place
    pub fn discard_rejected(mut self, discard: bool) -> Self {
        self.discard_rejected = discard;
        self
    }

    /// Set what happens to undecodable candidates
    pub fn decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.dedup = self.dedup.decode_failure(policy);
        self
    }

    pub fn ingest(&self, dir: &Path, candidates: &[PathBuf]) -> Result<IngestReport, DedupError> {
        self.ingest_with_events(dir, candidates, &null_sender())
    }

    pub fn ingest_with_events(
        &self,
        dir: &Path,
        candidates: &[PathBuf],
        events: &EventSender,
    ) -> Result<IngestReport, DedupError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        events.phase(PipelinePhase::Scanning);
        let existing = DirectoryScanner::new().scan_with_events(dir, events)?;
        let mut next = next_index(dir)?;

        events.phase(PipelinePhase::Fingerprinting);
        let mut accepted = self.dedup.baseline(&existing, events);
        let candidates: Vec<ImageFile> =
            candidates.iter().map(|p| ImageFile::from_path(p)).collect();
        let signatures = self.dedup.signatures(&candidates, events);

        events.phase(PipelinePhase::Admitting);
        let mut count = existing.len();
        let mut admitted = Vec::new();
        let mut rejected = Vec::new();
        let mut skipped = Vec::new();

        for (candidate, signature) in candidates.iter().zip(signatures) {
            if self.limit.is_some_and(|limit| count >= limit) {
                skipped.push(candidate.path.clone());
                continue;
            }

            match self.dedup.decide(&accepted, candidate, &signature, events) {
                Decision::Accept => match admit(candidate, dir, &mut next, &mut errors) {
                    Ok(step) => {
                        tracing::info!(
                            from = %step.from.display(),
                            to = %step.to.display(),
                            "admitted"
                        );
                        // Only images that made it into the directory can shadow later ones
                        if let Ok(signature) = signature {
                            accepted.insert(step.to.clone(), signature);
                        }
                        admitted.push(step);
                        next = next.saturating_add(1);
                        count += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %candidate.path.display(),
                            error = %e,
                            "could not admit"
                        );
                        errors.push(e.to_string());
                    }
                },
                Decision::Reject(reason) => {
                    if self.discard_rejected {
                        if let Err(e) = fs::remove_file(&candidate.path) {
                            let path = candidate.path.display();
                            tracing::warn!(%path, error = %e, "failed to delete");
                            errors.push(format!("failed to delete {}: {}", path, e));
                        }
                    }
                    rejected.push(RemovedImage {
                        image: candidate.clone(),
                        reason,
                    });
                }
            }
        }

        if !skipped.is_empty() {
            tracing::info!(skipped = skipped.len(), "image limit reached");
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images: count,
                kept: admitted.len(),
                removed: rejected.len(),
                renamed: admitted.len(),
                duration_ms,
            },
        }));

        Ok(IngestReport {
            dir: dir.to_path_buf(),
            baseline: existing.len(),
            admitted,
            rejected,
            skipped,
            errors,
            duration_ms,
        })
    }
}

/// Move a candidate into `dir` as `image-<next>.<ext>`.
///
/// Slots already taken (by a stray file or directory the scanner ignored)
/// are skipped, advancing `next`. A cross-device move whose source cannot
/// be removed still counts as admitted; the leftover is reported in `errors`.
fn admit(
    candidate: &ImageFile,
    dir: &Path,
    next: &mut u32,
    errors: &mut Vec<String>,
) -> Result<RenameStep, RenameError> {
    if candidate.extension.is_empty() {
        return Err(RenameError::InvalidName {
            path: candidate.path.clone(),
        });
    }

    let admit_error = |source: io::Error| RenameError::AdmitFailed {
        from: candidate.path.clone(),
        dir: dir.to_path_buf(),
        source,
    };

    let to = loop {
        let to = dir.join(target_name(*next, &candidate.extension));
        if !to.exists() {
            break to;
        }
        tracing::debug!(occupied = %to.display(), "slot taken, trying the next index");
        *next = next.checked_add(1).ok_or_else(|| {
            admit_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ))
        })?;
    };

    // Candidates often live on another filesystem (a download cache)
    if fs::rename(&candidate.path, &to).is_err() {
        fs::copy(&candidate.path, &to).map_err(admit_error)?;
        if let Err(e) = fs::remove_file(&candidate.path) {
            let path = candidate.path.display();
            tracing::warn!(%path, error = %e, "copied in but could not remove the original");
            errors.push(format!("could not remove {} after admitting it: {}", path, e));
        }
    }

    Ok(RenameStep {
        from: candidate.path.clone(),
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::RemovalReason;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn gradient(path: &Path, descending: bool) {
        GrayImage::from_fn(64, 64, |x, _| {
            let v = (x * 4) as u8;
            Luma([if descending { 255 - v } else { v }])
        })
        .save(path)
        .unwrap();
    }

    fn bands(path: &Path) {
        GrayImage::from_fn(64, 64, |_, y| Luma([if y < 32 { 230 } else { 20 }]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn duplicates_of_baseline_are_rejected() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        gradient(&target.path().join("image-0.png"), false);

        let copy = downloads.path().join("copy.png");
        let fresh = downloads.path().join("fresh.png");
        gradient(&copy, false);
        gradient(&fresh, true);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[copy.clone(), fresh.clone()])
            .unwrap();

        assert_eq!(report.baseline, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].image.path, copy);
        assert_eq!(report.admitted.len(), 1);
        assert_eq!(report.admitted[0].to, target.path().join("image-1.png"));
        assert!(copy.exists());
        assert!(!fresh.exists());
    }

    #[test]
    fn candidates_are_checked_against_each_other() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let first = downloads.path().join("a.png");
        let second = downloads.path().join("b.png");
        gradient(&first, true);
        gradient(&second, true);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[first, second.clone()])
            .unwrap();

        assert_eq!(report.admitted.len(), 1);
        assert_eq!(report.rejected[0].image.path, second);
    }

    #[test]
    fn limit_stops_admission() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        gradient(&target.path().join("image-1.png"), false);

        let a = downloads.path().join("a.png");
        let b = downloads.path().join("b.png");
        gradient(&a, true);
        bands(&b);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .limit(Some(2))
            .ingest(target.path(), &[a, b.clone()])
            .unwrap();

        assert_eq!(report.admitted.len(), 1);
        assert_eq!(report.admitted[0].to, target.path().join("image-2.png"));
        assert_eq!(report.skipped, vec![b.clone()]);
        assert!(b.exists());
    }

    #[test]
    fn discard_rejected_deletes_the_candidate() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        gradient(&target.path().join("image-0.png"), false);
        let copy = downloads.path().join("copy.png");
        gradient(&copy, false);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .discard_rejected(true)
            .ingest(target.path(), &[copy.clone()])
            .unwrap();

        assert_eq!(report.rejected.len(), 1);
        assert!(!copy.exists());
    }

    #[test]
    fn undecodable_candidate_is_rejected_not_fatal() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        let empty = downloads.path().join("empty.png");
        fs::write(&empty, b"").unwrap();

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[empty])
            .unwrap();

        assert!(report.admitted.is_empty());
        assert!(report.rejected[0].is_undecodable());
    }

    #[test]
    fn undecodable_baseline_image_is_skipped() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        fs::write(target.path().join("image-0.png"), b"garbage").unwrap();
        let candidate = downloads.path().join("a.png");
        gradient(&candidate, false);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[candidate])
            .unwrap();

        assert_eq!(report.admitted.len(), 1);
        assert!(target.path().join("image-0.png").exists());
        assert!(target.path().join("image-1.png").exists());
    }

    #[test]
    fn occupied_slot_is_skipped_not_fatal() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        // an empty directory numbers from 1, and that slot is not an image
        fs::create_dir(target.path().join("image-1.png")).unwrap();

        let a = downloads.path().join("a.png");
        let b = downloads.path().join("b.png");
        let a_copy = downloads.path().join("a_copy.png");
        gradient(&a, true);
        bands(&b);
        gradient(&a_copy, true);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[a, b, a_copy.clone()])
            .unwrap();

        assert!(report.errors.is_empty(), "{:?}", report.errors);
        let names: Vec<_> = report.admitted.iter().map(|s| s.to.clone()).collect();
        assert_eq!(
            names,
            vec![target.path().join("image-2.png"), target.path().join("image-3.png")]
        );
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].image.path, a_copy);
        match &report.rejected[0].reason {
            RemovalReason::Duplicate { of, distance, .. } => {
                assert_eq!(of, &target.path().join("image-2.png"));
                assert_eq!(*distance, 0);
            }
            other => panic!("expected a duplicate, got {:?}", other),
        }
    }

    #[test]
    fn failed_admission_does_not_shadow_later_candidates() {
        let target = TempDir::new().unwrap();
        let downloads = TempDir::new().unwrap();
        // PNG content under a name the directory convention cannot express
        let nameless = downloads.path().join("download");
        gradient(&downloads.path().join("download.png"), true);
        fs::rename(downloads.path().join("download.png"), &nameless).unwrap();
        let copy = downloads.path().join("copy.png");
        gradient(&copy, true);

        let report = Ingestor::new(MatchStrategy::default())
            .unwrap()
            .ingest(target.path(), &[nameless.clone(), copy.clone()])
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.rejected.is_empty());
        assert_eq!(report.admitted.len(), 1);
        assert_eq!(report.admitted[0].from, copy);
        assert_eq!(report.admitted[0].to, target.path().join("image-1.png"));
        assert!(nameless.exists());
    }
}
