//! Catalog-driven workflows: deduplicate an event and refresh inventories.

use super::executor::{DedupConfig, DedupReport, DirectoryDeduper};
use crate::core::catalog::{
    update_all_inventories, update_event_inventory, EventCatalog, EventStore, ImageInventory,
};
use crate::error::{CatalogError, DedupError};
use crate::events::{null_sender, EventSender};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Result of deduplicating one catalog event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDedupReport {
    pub event_id: u64,
    pub dedup: DedupReport,
    /// Refreshed inventory; absent on a dry run
    pub inventory: Option<ImageInventory>,
}

/// Runs workflows for events listed in a catalog
pub struct CatalogWorkflow<'a> {
    catalog: &'a dyn EventCatalog,
    store: EventStore,
}

impl<'a> CatalogWorkflow<'a> {
    pub fn new(catalog: &'a dyn EventCatalog, store: EventStore) -> Self {
        Self { catalog, store }
    }

    /// Deduplicate an event's image directory, then record its new
    /// inventory in the catalog
    pub fn dedup_event(
        &self,
        id: u64,
        config: DedupConfig,
    ) -> Result<EventDedupReport, DedupError> {
        self.dedup_event_with_events(id, config, &null_sender())
    }

    pub fn dedup_event_with_events(
        &self,
        id: u64,
        config: DedupConfig,
        events: &EventSender,
    ) -> Result<EventDedupReport, DedupError> {
        let mut catalog = self.catalog.load()?;
        let event = catalog.event(id).ok_or(CatalogError::EventNotFound { id })?;
        let dir = self.store.resolve_images_dir(event);

        tracing::info!(
            event = id,
            brand = %event.brand,
            dir = %dir.display(),
            "deduplicating event"
        );
        let dedup = DirectoryDeduper::new(config)?.run_with_events(&dir, events)?;

        let inventory = if config.dry_run {
            None
        } else {
            let inventory = update_event_inventory(&mut catalog, &self.store, id, Utc::now())?;
            self.catalog.save(&catalog)?;
            Some(inventory)
        };

        Ok(EventDedupReport {
            event_id: id,
            dedup,
            inventory,
        })
    }

    /// Refresh one event's inventory and save the catalog
    pub fn refresh_inventory(&self, id: u64) -> Result<ImageInventory, DedupError> {
        let mut catalog = self.catalog.load()?;
        let inventory = update_event_inventory(&mut catalog, &self.store, id, Utc::now())?;
        self.catalog.save(&catalog)?;
        Ok(inventory)
    }

    /// Refresh every event's inventory and save the catalog once
    pub fn refresh_all(
        &self,
    ) -> Result<Vec<(u64, Result<ImageInventory, DedupError>)>, DedupError> {
        let mut catalog = self.catalog.load()?;
        let results = update_all_inventories(&mut catalog, &self.store, Utc::now());
        self.catalog.save(&catalog)?;
        Ok(results)
    }
}
