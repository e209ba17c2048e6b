//! Catalog repository trait definition.

use super::Catalog;
use crate::error::CatalogError;

/// Storage for the event catalog
///
/// Implementations do not coordinate concurrent writers. Callers load,
/// modify and save from a single process.
pub trait EventCatalog: Send + Sync {
    /// Read the current catalog
    fn load(&self) -> Result<Catalog, CatalogError>;

    /// Replace the stored catalog
    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError>;
}
