//! # Pipeline Module
//!
//! Orchestrates the directory-level workflows.
//!
//! ## Workflows
//! 1. **Dedup** - scan a directory, remove duplicates, renumber survivors
//! 2. **Ingest** - admit new candidates against the images already present
//! 3. **Catalog** - run dedup for a catalog event and refresh inventories
//!
//! ## Parallelism
//! Fingerprints are computed with rayon; accept/reject is sequential.

mod catalog_sync;
mod executor;
mod ingest;

pub use catalog_sync::{CatalogWorkflow, EventDedupReport};
pub use executor::{DedupConfig, DedupReport, DirectoryDeduper};
pub use ingest::{IngestReport, Ingestor};
