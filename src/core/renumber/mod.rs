//! # Renumber Module
//!
//! Renames survivors to a dense zero-based (or one-based, when a logo is
//! pinned at index 0) `image-<N>.<ext>` sequence.
//!
//! Renaming goes through two passes: every moving file first gets a unique
//! temporary name in the same directory, then its final name. A file's
//! target can be another survivor's current name, so a single pass could
//! overwrite it.

mod plan;

pub use plan::{target_name, RenamePlan, RenameStep};

use crate::core::scanner::ImageFile;
use crate::error::RenameError;
use crate::events::{null_sender, Event, EventSender, RenumberEvent};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Executes rename plans
pub struct Renumberer;

impl Renumberer {
    /// Rename `images` (in order) to a dense sequence starting at `start`
    pub fn renumber(
        dir: &Path,
        images: &[ImageFile],
        start: u32,
    ) -> Result<Vec<RenameStep>, RenameError> {
        Self::renumber_with_events(dir, images, start, &null_sender())
    }

    /// Same as `renumber`, reporting each rename via events
    pub fn renumber_with_events(
        dir: &Path,
        images: &[ImageFile],
        start: u32,
        events: &EventSender,
    ) -> Result<Vec<RenameStep>, RenameError> {
        let plan = RenamePlan::new(dir, images, start)?;
        Self::execute(&plan, events)
    }

    /// Execute a plan. Returns the steps performed.
    pub fn execute(
        plan: &RenamePlan,
        events: &EventSender,
    ) -> Result<Vec<RenameStep>, RenameError> {
        if plan.is_empty() {
            events.send(Event::Renumber(RenumberEvent::Completed { renamed: 0 }));
            return Ok(Vec::new());
        }

        Self::check_targets_free(plan)?;

        let batch = Uuid::new_v4().simple().to_string();
        let mut staged: Vec<(PathBuf, &RenameStep)> = Vec::with_capacity(plan.len());

        // Pass 1: move every file out of the way
        for (i, step) in plan.steps().iter().enumerate() {
            let temp = temp_path(&step.from, &batch, i);
            if let Err(source) = fs::rename(&step.from, &temp) {
                Self::roll_back(&staged);
                return Err(RenameError::RenameFailed {
                    from: step.from.clone(),
                    to: temp,
                    source,
                });
            }
            staged.push((temp, step));
        }

        // Pass 2: temporary names to final names
        for (temp, step) in &staged {
            fs::rename(temp, &step.to).map_err(|source| RenameError::RenameFailed {
                from: temp.clone(),
                to: step.to.clone(),
                source,
            })?;
            tracing::debug!(from = %step.from.display(), to = %step.to.display(), "renamed");
            events.send(Event::Renumber(RenumberEvent::Renamed {
                from: step.from.clone(),
                to: step.to.clone(),
            }));
        }

        events.send(Event::Renumber(RenumberEvent::Completed {
            renamed: plan.len(),
        }));

        Ok(plan.steps().to_vec())
    }

    /// A target may only exist if it is itself about to move
    fn check_targets_free(plan: &RenamePlan) -> Result<(), RenameError> {
        let moving: HashSet<&Path> = plan.steps().iter().map(|s| s.from.as_path()).collect();
        for step in plan.steps() {
            if step.to.exists() && !moving.contains(step.to.as_path()) {
                return Err(RenameError::RenameFailed {
                    from: step.from.clone(),
                    to: step.to.clone(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "target is occupied by a file outside the sequence",
                    ),
                });
            }
        }
        Ok(())
    }

    fn roll_back(staged: &[(PathBuf, &RenameStep)]) {
        for (temp, step) in staged.iter().rev() {
            if let Err(e) = fs::rename(temp, &step.from) {
                tracing::warn!(
                    temp = %temp.display(),
                    original = %step.from.display(),
                    error = %e,
                    "could not restore file after failed rename"
                );
            }
        }
    }
}

fn temp_path(from: &Path, batch: &str, i: usize) -> PathBuf {
    let extension = from
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    from.with_file_name(format!(".renumber-{}-{}.{}", batch, i, extension))
}
