//! Directory deduplication: scan, decide, delete, renumber.

use crate::core::comparator::MatchStrategy;
use crate::core::dedup::{DecodeFailurePolicy, Deduplicator, RemovedImage};
use crate::core::renumber::{RenamePlan, RenameStep, Renumberer};
use crate::core::scanner::{DirectoryScanner, ImageFile, ImageScanner};
use crate::error::DedupError;
use crate::events::{
    null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuration for a deduplication run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// How images are compared
    pub strategy: MatchStrategy,
    /// What happens to undecodable images
    pub decode_failure: DecodeFailurePolicy,
    /// First index of the renumbered sequence
    pub start_index: u32,
    /// Keep `image-0` in place as the logo: it is never removed or renamed,
    /// later images are checked against it and numbered from 1
    pub logo_first: bool,
    /// Decide and plan, but leave the directory untouched
    pub dry_run: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            decode_failure: DecodeFailurePolicy::Discard,
            start_index: 0,
            logo_first: false,
            dry_run: false,
        }
    }
}

impl DedupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comparison strategy
    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the decode-failure policy
    pub fn decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    /// Set the first index of the renumbered sequence
    pub fn start_index(mut self, start: u32) -> Self {
        self.start_index = start;
        self
    }

    /// Pin `image-0` as the logo and number the rest from 1
    pub fn logo_first(mut self, logo_first: bool) -> Self {
        self.logo_first = logo_first;
        if logo_first {
            self.start_index = self.start_index.max(1);
        }
        self
    }

    /// Only report what would happen
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of deduplicating one directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupReport {
    /// Directory that was processed
    pub dir: PathBuf,
    /// Images found before deduplication
    pub total_images: usize,
    /// Survivors, with the names they had before renumbering (a pinned
    /// logo is not listed)
    pub kept: Vec<ImageFile>,
    /// Removed images and why
    pub removed: Vec<RemovedImage>,
    /// Renames performed (or planned, on a dry run)
    pub renames: Vec<RenameStep>,
    /// Non-fatal errors
    pub errors: Vec<String>,
    /// Whether the directory was left untouched
    pub dry_run: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl DedupReport {
    /// Number of removed images that could not be decoded
    pub fn undecodable_count(&self) -> usize {
        self.removed.iter().filter(|r| r.is_undecodable()).count()
    }

    /// Number of removed duplicates
    pub fn duplicate_count(&self) -> usize {
        self.removed.len() - self.undecodable_count()
    }
}

/// Deduplicates and renumbers event image directories
pub struct DirectoryDeduper {
    config: DedupConfig,
    dedup: Deduplicator,
}

impl DirectoryDeduper {
    /// Create a deduper; fails on an invalid threshold
    pub fn new(config: DedupConfig) -> Result<Self, DedupError> {
        let dedup = Deduplicator::new(config.strategy)?.decode_failure(config.decode_failure);
        Ok(Self { config, dedup })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Run on `dir` without events
    pub fn run(&self, dir: &Path) -> Result<DedupReport, DedupError> {
        self.run_with_events(dir, &null_sender())
    }

    /// Run on `dir` with event reporting
    pub fn run_with_events(
        &self,
        dir: &Path,
        events: &EventSender,
    ) -> Result<DedupReport, DedupError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.phase(PipelinePhase::Scanning);
        let images = match DirectoryScanner::new().scan_with_events(dir, events) {
            Ok(images) => images,
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };
        let total_images = images.len();

        let (logo, images) = match images.split_first() {
            Some((first, rest)) if self.config.logo_first && first.index == Some(0) => {
                (std::slice::from_ref(first), rest)
            }
            _ => (&[][..], images.as_slice()),
        };

        // Phases 2 and 3: Fingerprinting, Deduplicating
        let outcome = self.dedup.deduplicate_against(logo, images, events);

        let renames = if self.config.dry_run {
            RenamePlan::new(dir, &outcome.kept, self.config.start_index)?
                .steps()
                .to_vec()
        } else {
            // Phase 4: Deleting
            events.phase(PipelinePhase::Deleting);
            let failed_deletions = delete_removed(&outcome.removed, &mut errors);

            // Phase 5: Renumbering
            if failed_deletions > 0 {
                let message = format!(
                    "renumbering skipped: {} removed image(s) could not be deleted",
                    failed_deletions
                );
                tracing::warn!(dir = %dir.display(), "{}", message);
                errors.push(message);
                Vec::new()
            } else {
                events.phase(PipelinePhase::Renumbering);
                match Renumberer::renumber_with_events(
                    dir,
                    &outcome.kept,
                    self.config.start_index,
                    events,
                ) {
                    Ok(renames) => renames,
                    Err(e) => {
                        events.send(Event::Pipeline(PipelineEvent::Error {
                            message: e.to_string(),
                        }));
                        return Err(e.into());
                    }
                }
            }
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            dir = %dir.display(),
            total = total_images,
            kept = outcome.kept.len(),
            removed = outcome.removed.len(),
            renamed = renames.len(),
            dry_run = self.config.dry_run,
            "directory deduplicated"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                kept: outcome.kept.len(),
                removed: outcome.removed.len(),
                renamed: renames.len(),
                duration_ms,
            },
        }));

        Ok(DedupReport {
            dir: dir.to_path_buf(),
            total_images,
            kept: outcome.kept,
            removed: outcome.removed,
            renames,
            errors,
            dry_run: self.config.dry_run,
            duration_ms,
        })
    }
}

/// Delete removed files, returning how many could not be deleted
fn delete_removed(removed: &[RemovedImage], errors: &mut Vec<String>) -> usize {
    let mut failed = 0;
    for entry in removed {
        if let Err(e) = fs::remove_file(&entry.image.path) {
            tracing::warn!(path = %entry.image.path.display(), error = %e, "failed to delete");
            errors.push(format!("failed to delete {}: {}", entry.image.path.display(), e));
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use image::{GrayImage, Luma};
    use tempfile::TempDir;

    fn gradient(dir: &TempDir, name: &str, descending: bool) -> PathBuf {
        let path = dir.path().join(name);
        GrayImage::from_fn(64, 64, |x, _| {
            let v = (x * 4) as u8;
            Luma([if descending { 255 - v } else { v }])
        })
        .save(&path)
        .unwrap();
        path
    }

    fn listing(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn config_builder_sets_fields() {
        let config = DedupConfig::new()
            .strategy(MatchStrategy::Exact)
            .decode_failure(DecodeFailurePolicy::Keep)
            .start_index(1)
            .dry_run(true);

        assert_eq!(config.strategy, MatchStrategy::Exact);
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Keep);
        assert_eq!(config.start_index, 1);
        assert!(config.dry_run);
    }

    #[test]
    fn invalid_threshold_is_rejected_up_front() {
        // a hand-built strategy bypasses MatchStrategy::perceptual
        let config = DedupConfig::new().strategy(MatchStrategy::Perceptual { threshold: 65 });
        assert!(matches!(
            DirectoryDeduper::new(config),
            Err(DedupError::Compare(_))
        ));
    }

    #[test]
    fn empty_directory_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let report = DirectoryDeduper::new(DedupConfig::default())
            .unwrap()
            .run(dir.path())
            .unwrap();

        assert_eq!(report.total_images, 0);
        assert!(report.kept.is_empty());
        assert!(report.renames.is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let result = DirectoryDeduper::new(DedupConfig::default())
            .unwrap()
            .run(Path::new("/nonexistent/event-1/images"));
        assert!(matches!(result, Err(DedupError::Scan(_))));
    }

    #[test]
    fn duplicates_are_deleted_and_survivors_renumbered() {
        let dir = TempDir::new().unwrap();
        gradient(&dir, "image-0.png", false);
        gradient(&dir, "image-2.png", false);
        gradient(&dir, "image-5.png", true);

        let report = DirectoryDeduper::new(DedupConfig::default())
            .unwrap()
            .run(dir.path())
            .unwrap();

        assert_eq!(report.total_images, 3);
        assert_eq!(report.kept.len(), 2);
        assert_eq!(report.duplicate_count(), 1);
        assert_eq!(report.removed[0].image.file_name(), "image-2.png");
        assert_eq!(listing(&dir), vec!["image-0.png", "image-1.png"]);
    }

    #[test]
    fn pinned_logo_stays_and_removes_its_copies() {
        let dir = TempDir::new().unwrap();
        gradient(&dir, "image-0.png", false);
        gradient(&dir, "image-3.png", false);
        gradient(&dir, "image-4.png", true);

        let report = DirectoryDeduper::new(DedupConfig::new().logo_first(true))
            .unwrap()
            .run(dir.path())
            .unwrap();

        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].image.file_name(), "image-3.png");
        assert_eq!(listing(&dir), vec!["image-0.png", "image-1.png"]);
    }

    #[test]
    fn logo_first_without_logo_numbers_from_one() {
        let dir = TempDir::new().unwrap();
        gradient(&dir, "image-2.png", false);

        DirectoryDeduper::new(DedupConfig::new().logo_first(true))
            .unwrap()
            .run(dir.path())
            .unwrap();

        assert_eq!(listing(&dir), vec!["image-1.png"]);
    }

    #[test]
    fn dry_run_plans_without_touching_files() {
        let dir = TempDir::new().unwrap();
        gradient(&dir, "image-0.png", false);
        gradient(&dir, "image-2.png", false);
        gradient(&dir, "image-5.png", true);

        let report = DirectoryDeduper::new(DedupConfig::new().dry_run(true))
            .unwrap()
            .run(dir.path())
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.renames.len(), 1);
        assert!(report.renames[0].to.ends_with("image-1.png"));
        assert_eq!(listing(&dir), vec!["image-0.png", "image-2.png", "image-5.png"]);
    }

    #[test]
    fn emits_phases_in_order() {
        let dir = TempDir::new().unwrap();
        gradient(&dir, "image-0.png", false);

        let (sender, receiver) = events::channel();
        DirectoryDeduper::new(DedupConfig::default())
            .unwrap()
            .run_with_events(dir.path(), &sender)
            .unwrap();
        drop(sender);

        let phases: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();

        assert_eq!(
            phases,
            vec![
                PipelinePhase::Scanning,
                PipelinePhase::Fingerprinting,
                PipelinePhase::Deduplicating,
                PipelinePhase::Deleting,
                PipelinePhase::Renumbering,
            ]
        );
    }
}
