//! # Scanner Module
//!
//! Discovers the numbered images of one event directory.
//!
//! ## Naming Convention
//! Event images are stored as `image-<N>.<ext>` where `<ext>` is one of
//! `png`, `jpg`, `jpeg` or `webp` (any case). Index 0 is conventionally the
//! brand logo; promotional images follow.
//!
//! Images are returned in ascending numeric order of `<N>`, so `image-10`
//! sorts after `image-9`.
//!
//! ## Example
//! ```rust,ignore
//! use event_image_dedup::core::scanner::{DirectoryScanner, ImageScanner};
//!
//! let images = DirectoryScanner::new().scan(Path::new("public/events/acme/event-7/images"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{next_index, DirectoryScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the image
    pub path: PathBuf,
    /// The `<N>` in `image-<N>.<ext>`, if the name follows the convention
    pub index: Option<u32>,
    /// Extension as written on disk (case preserved)
    pub extension: String,
    /// File size in bytes
    pub size: u64,
}

impl ImageFile {
    /// Describe an arbitrary file, e.g. a freshly downloaded candidate.
    ///
    /// The index is filled in when the name follows `image-<N>.<ext>`.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let index = ImageFilter::new().parse(name).map(|(index, _)| index);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Self {
            path: path.to_path_buf(),
            index,
            extension,
            size,
        }
    }

    /// File name for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Detected image format
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_extension(&self.extension)
    }
}

/// Image formats accepted in event directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }
}

/// Source of ordered image sets.
///
/// Implement this trait to feed the deduplicator from somewhere other than
/// a directory listing (e.g. in tests).
pub trait ImageScanner: Send + Sync {
    /// List the numbered images of a directory in ascending index order
    fn scan(&self, dir: &Path) -> Result<Vec<ImageFile>, ScanError>;

    /// Same as `scan`, reporting found images via events
    fn scan_with_events(
        &self,
        dir: &Path,
        events: &EventSender,
    ) -> Result<Vec<ImageFile>, ScanError>;
}
