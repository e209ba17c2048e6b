//! File-backed catalog (`details.json`).

use super::{Catalog, EventCatalog};
use crate::error::CatalogError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Catalog stored as pretty-printed JSON on disk
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CatalogError {
        CatalogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl EventCatalog for JsonCatalog {
    fn load(&self) -> Result<Catalog, CatalogError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| CatalogError::Serialize(e.to_string()))?;

        // Write next to the target so the final rename stays on one filesystem
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.write_all(b"\n"))
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            events = catalog.events.len(),
            "saved catalog"
        );
        Ok(())
    }
}
