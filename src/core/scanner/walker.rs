//! Directory listing implementation using walkdir.

use super::{filter::ImageFilter, ImageFile, ImageScanner};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::path::Path;
use walkdir::WalkDir;

/// Lists `image-<N>.<ext>` files directly inside one directory
pub struct DirectoryScanner {
    filter: ImageFilter,
}

impl DirectoryScanner {
    /// Create a scanner for the default naming convention
    pub fn new() -> Self {
        Self {
            filter: ImageFilter::new(),
        }
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageScanner for DirectoryScanner {
    fn scan(&self, dir: &Path) -> Result<Vec<ImageFile>, ScanError> {
        self.scan_with_events(dir, &null_sender())
    }

    fn scan_with_events(
        &self,
        dir: &Path,
        events: &EventSender,
    ) -> Result<Vec<ImageFile>, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            path: dir.to_path_buf(),
        }));

        let mut images = Vec::new();

        for entry_result in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    // Failing to read the directory itself is fatal; a single
                    // unreadable entry is not.
                    if e.depth() == 0 {
                        return Err(ScanError::ReadDirectory {
                            path,
                            source: e.into_io_error().unwrap_or_else(|| {
                                std::io::Error::new(
                                    std::io::ErrorKind::Other,
                                    "directory walk failed",
                                )
                            }),
                        });
                    }
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let Some((index, extension)) = self.filter.parse(name) else {
                continue;
            };

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let image = ImageFile {
                path: entry.path().to_path_buf(),
                index: Some(index),
                extension,
                size,
            };

            events.send(Event::Scan(ScanEvent::ImageFound {
                path: image.path.clone(),
            }));

            images.push(image);
        }

        // Numeric order; ties (image-1.png next to image-1.jpg) broken by name
        images.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));

        tracing::debug!(dir = %dir.display(), count = images.len(), "listed event images");

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(images)
    }
}

/// Next free index for a new image in `dir`.
///
/// One past the highest existing index, or 1 when the directory has no
/// numbered images yet (index 0 is reserved for the logo).
pub fn next_index(dir: &Path) -> Result<u32, ScanError> {
    let images = DirectoryScanner::new().scan(dir)?;
    Ok(images
        .iter()
        .filter_map(|image| image.index)
        .max()
        .map_or(1, |max| max.saturating_add(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47]).unwrap();
        path
    }

    fn names(images: &[ImageFile]) -> Vec<String> {
        images.iter().map(|i| i.file_name()).collect()
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let images = DirectoryScanner::new().scan(temp_dir.path()).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn scan_orders_numerically_not_lexically() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "image-10.png");
        create_file(&temp_dir, "image-2.jpg");
        create_file(&temp_dir, "image-9.webp");
        create_file(&temp_dir, "image-0.png");

        let images = DirectoryScanner::new().scan(temp_dir.path()).unwrap();

        assert_eq!(
            names(&images),
            vec!["image-0.png", "image-2.jpg", "image-9.webp", "image-10.png"]
        );
        assert_eq!(images[3].index, Some(10));
        assert_eq!(images[0].size, 4);
    }

    #[test]
    fn scan_ignores_other_files_and_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        create_file(&temp_dir, "image-1.png");
        create_file(&temp_dir, "notes.txt");
        create_file(&temp_dir, "logo.png");
        create_file(&temp_dir, ".image-2.png");
        fs::create_dir(temp_dir.path().join("image-3.png")).unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        File::create(nested.join("image-4.png")).unwrap();

        let images = DirectoryScanner::new().scan(temp_dir.path()).unwrap();

        assert_eq!(names(&images), vec!["image-1.png"]);
    }

    #[test]
    fn scan_nonexistent_directory_is_an_error() {
        let result = DirectoryScanner::new().scan(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_file_instead_of_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_file(&temp_dir, "image-0.png");
        let result = DirectoryScanner::new().scan(&file);
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn next_index_starts_after_logo() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(next_index(temp_dir.path()).unwrap(), 1);

        create_file(&temp_dir, "image-0.png");
        assert_eq!(next_index(temp_dir.path()).unwrap(), 1);

        create_file(&temp_dir, "image-4.jpg");
        assert_eq!(next_index(temp_dir.path()).unwrap(), 5);
    }
}
