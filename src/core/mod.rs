//! # Core Module
//!
//! The front-end-agnostic deduplication engine.
//!
//! ## Modules
//! - `scanner` - Discovers `image-<N>.<ext>` files in a directory
//! - `hasher` - Computes dHash fingerprints and byte digests
//! - `comparator` - Hamming distance and match strategies
//! - `dedup` - Accept/reject passes over an ordered image set
//! - `renumber` - Dense two-pass renaming of survivors
//! - `catalog` - The `details.json` event catalog and directory layout
//! - `pipeline` - Orchestrates the workflows

pub mod catalog;
pub mod comparator;
pub mod dedup;
pub mod hasher;
pub mod pipeline;
pub mod renumber;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{MatchStrategy, MatchType};
pub use dedup::{DecodeFailurePolicy, DedupOutcome, Deduplicator, RemovalReason};
pub use hasher::{Fingerprint, HashAlgorithmKind, Signature};
pub use scanner::ImageFile;
