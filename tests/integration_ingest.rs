//! Integration tests for admitting new candidates into an event directory.

mod common;

use assert_fs::prelude::*;
use event_image_dedup::core::comparator::MatchStrategy;
use event_image_dedup::core::pipeline::Ingestor;
use event_image_dedup::core::scanner::next_index;
use predicates::prelude::*;

#[test]
fn candidates_are_numbered_after_the_highest_index() {
    let target = assert_fs::TempDir::new().unwrap();
    let downloads = assert_fs::TempDir::new().unwrap();
    common::save(&common::rising_ramp(), target.child("image-0.png"));
    common::save(&common::split(), target.child("image-6.png"));
    common::save(&common::falling_ramp(), downloads.child("new.jpg"));

    assert_eq!(next_index(target.path()).unwrap(), 7);

    let report = Ingestor::new(MatchStrategy::default())
        .unwrap()
        .ingest(target.path(), &[downloads.child("new.jpg").to_path_buf()])
        .unwrap();

    assert_eq!(report.baseline, 2);
    assert_eq!(report.admitted.len(), 1);
    target.child("image-7.jpg").assert(predicate::path::exists());
    downloads.child("new.jpg").assert(predicate::path::missing());
}

#[test]
fn empty_directory_starts_after_the_logo_slot() {
    let target = assert_fs::TempDir::new().unwrap();
    let downloads = assert_fs::TempDir::new().unwrap();
    common::save(&common::rising_ramp(), downloads.child("a.png"));

    Ingestor::new(MatchStrategy::default())
        .unwrap()
        .ingest(target.path(), &[downloads.child("a.png").to_path_buf()])
        .unwrap();

    target.child("image-1.png").assert(predicate::path::exists());
}

#[test]
fn baseline_and_earlier_candidates_both_block_duplicates() {
    let target = assert_fs::TempDir::new().unwrap();
    let downloads = assert_fs::TempDir::new().unwrap();
    common::save(&common::rising_ramp(), target.child("image-0.png"));

    common::save(&common::rising_ramp(), downloads.child("logo-copy.png"));
    common::save(&common::split(), downloads.child("first.png"));
    common::save(&common::split(), downloads.child("second.png"));
    common::save(&common::falling_ramp(), downloads.child("third.png"));

    let candidates: Vec<_> = ["logo-copy.png", "first.png", "second.png", "third.png"]
        .iter()
        .map(|name| downloads.child(name).to_path_buf())
        .collect();

    let report = Ingestor::new(MatchStrategy::default())
        .unwrap()
        .limit(Some(9))
        .ingest(target.path(), &candidates)
        .unwrap();

    let rejected: Vec<_> = report.rejected.iter().map(|r| r.image.file_name()).collect();
    assert_eq!(rejected, vec!["logo-copy.png", "second.png"]);
    assert_eq!(report.admitted.len(), 2);
    target.child("image-1.png").assert(predicate::path::exists());
    target.child("image-2.png").assert(predicate::path::exists());
    downloads.child("second.png").assert(predicate::path::exists());
}

#[test]
fn limit_counts_existing_images() {
    let target = assert_fs::TempDir::new().unwrap();
    let downloads = assert_fs::TempDir::new().unwrap();
    common::save(&common::rising_ramp(), target.child("image-0.png"));
    common::save(&common::falling_ramp(), target.child("image-1.png"));
    common::save(&common::split(), downloads.child("a.png"));

    let report = Ingestor::new(MatchStrategy::default())
        .unwrap()
        .limit(Some(2))
        .ingest(target.path(), &[downloads.child("a.png").to_path_buf()])
        .unwrap();

    assert!(report.admitted.is_empty());
    assert_eq!(report.skipped.len(), 1);
    downloads.child("a.png").assert(predicate::path::exists());
}
