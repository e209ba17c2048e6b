//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while processing an image directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Fingerprint computation events
    Fingerprint(FingerprintEvent),
    /// Accept/reject decisions
    Dedup(DedupEvent),
    /// Dense renaming of survivors
    Renumber(RenumberEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while listing an image directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { path: PathBuf },
    /// A numbered image was found
    ImageFound { path: PathBuf },
    /// Listing completed
    Completed { total_images: usize },
}

/// Events while fingerprinting images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FingerprintEvent {
    /// Fingerprinting has started
    Started { total_images: usize },
    /// Progress update
    Progress(FingerprintProgress),
    /// An image could not be decoded; processing continues
    Error { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed { fingerprinted: usize, failures: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProgress {
    /// Number of images processed so far
    pub completed: usize,
    /// Total number of images to process
    pub total: usize,
    /// Image just processed
    pub current_path: PathBuf,
}

/// Accept/reject decisions made by the deduplication pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// The image joined the accepted set
    Accepted { path: PathBuf },
    /// The image duplicates an earlier accepted image
    Rejected {
        path: PathBuf,
        duplicate_of: PathBuf,
        distance: u32,
    },
    /// The image could not be fingerprinted
    Undecodable { path: PathBuf, message: String },
    /// The pass completed
    Completed { kept: usize, removed: usize },
}

/// Events while renaming survivors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenumberEvent {
    /// A file reached its final name
    Renamed { from: PathBuf, to: PathBuf },
    /// Renaming finished
    Completed { renamed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of a directory run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Fingerprinting,
    Deduplicating,
    Deleting,
    Renumbering,
    Admitting,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Fingerprinting => write!(f, "Fingerprinting"),
            PipelinePhase::Deduplicating => write!(f, "Deduplicating"),
            PipelinePhase::Deleting => write!(f, "Deleting duplicates"),
            PipelinePhase::Renumbering => write!(f, "Renumbering"),
            PipelinePhase::Admitting => write!(f, "Admitting candidates"),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Images considered
    pub total_images: usize,
    /// Images retained
    pub kept: usize,
    /// Images removed (duplicates and undecodable)
    pub removed: usize,
    /// Files renamed into the dense sequence
    pub renamed: usize,
    /// Wall-clock duration
    pub duration_ms: u64,
}
