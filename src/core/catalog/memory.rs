//! In-memory catalog for testing.

use super::{Catalog, EventCatalog};
use crate::error::CatalogError;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory catalog
///
/// Useful for tests and for embedding without a `details.json` on disk.
pub struct InMemoryCatalog {
    catalog: RwLock<Catalog>,
}

impl InMemoryCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    fn poisoned() -> CatalogError {
        CatalogError::Io {
            path: PathBuf::from("memory"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "catalog lock poisoned"),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl EventCatalog for InMemoryCatalog {
    fn load(&self) -> Result<Catalog, CatalogError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        Ok(catalog.clone())
    }

    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let mut stored = self.catalog.write().map_err(|_| Self::poisoned())?;
        *stored = catalog.clone();
        Ok(())
    }
}
