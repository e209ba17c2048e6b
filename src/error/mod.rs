//! # Error Module
//!
//! Error types for the event image deduplicator.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, event ids, what went wrong
//! - **Per-image failures are local** - a bad image is reported, not fatal

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Renumbering error: {0}")]
    Rename(#[from] RenameError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing an image directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// The file the failure belongs to
    pub fn path(&self) -> &PathBuf {
        match self {
            HashError::DecodeError { path, .. }
            | HashError::EmptyImage { path }
            | HashError::IoError { path, .. } => path,
        }
    }

    /// Attach the file path to an error raised on in-memory pixels
    pub fn with_path(self, file: &std::path::Path) -> Self {
        let path = file.to_path_buf();
        match self {
            HashError::DecodeError { reason, .. } => HashError::DecodeError { path, reason },
            HashError::EmptyImage { .. } => HashError::EmptyImage { path },
            HashError::IoError { source, .. } => HashError::IoError { path, source },
        }
    }
}

/// Errors in comparison configuration
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Invalid threshold: {value} (must be 0-64)")]
    InvalidThreshold { value: u32 },
}

/// Errors that occur while renaming survivors into a dense sequence
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Failed to rename {from} to {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot move {from} into {dir}: {source}")]
    AdmitFailed {
        from: PathBuf,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File has no usable name: {path}")]
    InvalidName { path: PathBuf },
}

/// Errors that occur reading or writing the event catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to access catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog at {path} is not valid JSON: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to serialize catalog: {0}")]
    Serialize(String),

    #[error("Event {id} not found in catalog")]
    EventNotFound { id: u64 },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
