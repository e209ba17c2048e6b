//! Event image directory layout.

use super::EventRecord;
use std::path::{Path, PathBuf};

/// Maps catalog events to their image directories under an events root
///
/// Layout: `<root>/<brand-slug>/event-<id>/images`
#[derive(Debug, Clone)]
pub struct EventStore {
    root: PathBuf,
}

/// Lowercased brand with each run of whitespace replaced by `-`
pub fn brand_slug(brand: &str) -> String {
    let mut slug = String::with_capacity(brand.len());
    let mut in_whitespace = false;
    for c in brand.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

impl EventStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding an event's numbered images
    pub fn resolve_images_dir(&self, event: &EventRecord) -> PathBuf {
        self.root
            .join(brand_slug(&event.brand))
            .join(format!("event-{}", event.id))
            .join("images")
    }

    /// Path of a file as published, relative to the parent of the events
    /// root and always `/`-separated (e.g. `events/acme/event-3/images/image-0.png`)
    pub fn public_path(&self, file: &Path) -> String {
        let base = self.root.parent().unwrap_or_else(|| Path::new(""));
        let relative = file.strip_prefix(base).unwrap_or(file);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
