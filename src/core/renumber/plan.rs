//! Pure computation of the renames needed for a dense sequence.

use crate::core::scanner::ImageFile;
use crate::error::RenameError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file moving to its final name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameStep {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// The renames that turn a set of survivors into
/// `image-<start>`, `image-<start+1>`, ... in their current order.
///
/// Files already at their target name are not part of the plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenamePlan {
    steps: Vec<RenameStep>,
}

/// Final file name for position `index`, keeping the extension as written
pub fn target_name(index: u32, extension: &str) -> String {
    format!("image-{}.{}", index, extension)
}

impl RenamePlan {
    /// Plan renames for `images` (already in the desired order) inside `dir`
    pub fn new(dir: &Path, images: &[ImageFile], start: u32) -> Result<Self, RenameError> {
        let mut steps = Vec::new();

        for (offset, image) in images.iter().enumerate() {
            if image.extension.is_empty() {
                return Err(RenameError::InvalidName {
                    path: image.path.clone(),
                });
            }
            let index = u32::try_from(offset)
                .ok()
                .and_then(|offset| start.checked_add(offset))
                .ok_or_else(|| RenameError::InvalidName {
                    path: image.path.clone(),
                })?;

            let to = dir.join(target_name(index, &image.extension));
            if to != image.path {
                steps.push(RenameStep {
                    from: image.path.clone(),
                    to,
                });
            }
        }

        Ok(Self { steps })
    }

    /// Renames to perform, in order
    pub fn steps(&self) -> &[RenameStep] {
        &self.steps
    }

    /// Number of files that change name
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the survivors are already dense
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(dir: &Path, name: &str) -> ImageFile {
        ImageFile::from_path(&dir.join(name))
    }

    #[test]
    fn gaps_are_closed_preserving_order_and_extension() {
        let dir = Path::new("/events/acme/event-1/images");
        let images = vec![
            image(dir, "image-0.png"),
            image(dir, "image-3.png"),
            image(dir, "image-7.jpg"),
        ];

        let plan = RenamePlan::new(dir, &images, 0).unwrap();

        assert_eq!(
            plan.steps(),
            &[
                RenameStep {
                    from: dir.join("image-3.png"),
                    to: dir.join("image-1.png"),
                },
                RenameStep {
                    from: dir.join("image-7.jpg"),
                    to: dir.join("image-2.jpg"),
                },
            ]
        );
    }

    #[test]
    fn dense_sequence_needs_no_renames() {
        let dir = Path::new("/images");
        let images = vec![image(dir, "image-1.png"), image(dir, "image-2.webp")];

        assert!(RenamePlan::new(dir, &images, 1).unwrap().is_empty());
    }

    #[test]
    fn start_index_shifts_every_target() {
        let dir = Path::new("/images");
        let images = vec![image(dir, "image-0.png"), image(dir, "image-1.JPG")];

        let plan = RenamePlan::new(dir, &images, 1).unwrap();

        let targets: Vec<_> = plan.steps().iter().map(|s| s.to.clone()).collect();
        assert_eq!(targets, vec![dir.join("image-1.png"), dir.join("image-2.JPG")]);
    }

    #[test]
    fn file_without_extension_is_rejected() {
        let dir = Path::new("/images");
        let images = vec![image(dir, "image-0")];
        assert!(matches!(
            RenamePlan::new(dir, &images, 0),
            Err(RenameError::InvalidName { .. })
        ));
    }
}
