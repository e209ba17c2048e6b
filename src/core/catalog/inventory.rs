//! Image inventory records written back into the catalog.

use super::{Catalog, EventRecord, EventStore};
use crate::core::scanner::{DirectoryScanner, ImageScanner};
use crate::error::{CatalogError, DedupError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `imageInventory` block of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInventory {
    pub total_images: usize,
    pub logo_first: bool,
    pub images: Vec<InventoryImage>,
}

/// One listed image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryImage {
    pub path: String,
    pub order: usize,
    pub is_logo: bool,
}

impl ImageInventory {
    /// Scan an event's directory and list its images in numeric order.
    /// The first image is the logo.
    pub fn scan(store: &EventStore, event: &EventRecord) -> Result<Self, DedupError> {
        let dir = store.resolve_images_dir(event);
        let files = DirectoryScanner::new().scan(&dir)?;

        let images: Vec<InventoryImage> = files
            .iter()
            .enumerate()
            .map(|(order, file)| InventoryImage {
                path: store.public_path(&file.path),
                order,
                is_logo: order == 0,
            })
            .collect();

        Ok(Self {
            total_images: images.len(),
            logo_first: true,
            images,
        })
    }

    /// Path of the logo, if any image exists
    pub fn logo_path(&self) -> Option<&str> {
        self.images.first().map(|image| image.path.as_str())
    }

    /// Everything after the logo
    pub fn promotional_count(&self) -> usize {
        self.total_images.saturating_sub(1)
    }
}

/// Write `imageInventory` and refresh `assetInventory` on one event.
///
/// Existing `assetInventory` fields are kept; `logoPath` only changes when
/// the directory has at least one image.
pub fn apply_inventory(event: &mut EventRecord, inventory: &ImageInventory, now: DateTime<Utc>) {
    let value = serde_json::to_value(inventory).unwrap_or(Value::Null);
    event.extra.insert("imageInventory".to_string(), value);

    let asset = event
        .extra
        .entry("assetInventory")
        .or_insert_with(|| Value::Object(Map::new()));
    if !asset.is_object() {
        *asset = Value::Object(Map::new());
    }
    if let Value::Object(fields) = asset {
        fields.insert("hasLogo".to_string(), Value::Bool(inventory.total_images > 0));
        if let Some(logo) = inventory.logo_path() {
            fields.insert("logoPath".to_string(), Value::String(logo.to_string()));
        }
        fields.insert(
            "promotionalImageCount".to_string(),
            Value::from(inventory.promotional_count()),
        );
        fields.insert("lastUpdated".to_string(), Value::String(timestamp(now)));
    }
}

/// Refresh one event's inventory in `catalog`
pub fn update_event_inventory(
    catalog: &mut Catalog,
    store: &EventStore,
    id: u64,
    now: DateTime<Utc>,
) -> Result<ImageInventory, DedupError> {
    let event = catalog
        .event_mut(id)
        .ok_or(CatalogError::EventNotFound { id })?;
    let inventory = ImageInventory::scan(store, event)?;
    apply_inventory(event, &inventory, now);

    tracing::info!(
        event = id,
        brand = %event.brand,
        images = inventory.total_images,
        "updated image inventory"
    );
    Ok(inventory)
}

/// Refresh every event. An event whose directory cannot be read keeps its
/// old inventory and is reported in the returned list.
pub fn update_all_inventories(
    catalog: &mut Catalog,
    store: &EventStore,
    now: DateTime<Utc>,
) -> Vec<(u64, Result<ImageInventory, DedupError>)> {
    let mut results = Vec::with_capacity(catalog.events.len());

    for event in &mut catalog.events {
        let result = ImageInventory::scan(store, event).map(|inventory| {
            apply_inventory(event, &inventory, now);
            inventory
        });
        if let Err(e) = &result {
            tracing::warn!(event = event.id, error = %e, "skipping inventory update");
        }
        results.push((event.id, result));
    }

    catalog.touch(&timestamp(now));
    results
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (TempDir, EventStore, Catalog) {
        let site = TempDir::new().unwrap();
        let root = site.path().join("events");
        let store = EventStore::new(&root);

        let catalog: Catalog = serde_json::from_value(json!({
            "events": [
                {"id": 3, "brand": "Acme Corp",
                 "assetInventory": {"hasLogo": false, "logoPath": "old/logo.png", "source": "manual"}},
                {"id": 4, "brand": "Missing Dir"}
            ]
        }))
        .unwrap();

        let images = store.resolve_images_dir(&catalog.events[0]);
        fs::create_dir_all(&images).unwrap();
        for name in ["image-0.png", "image-2.jpg", "image-10.webp", "notes.txt"] {
            fs::write(images.join(name), b"x").unwrap();
        }

        (site, store, catalog)
    }

    #[test]
    fn inventory_lists_images_with_logo_first() {
        let (_site, store, mut catalog) = setup();

        let inventory = update_event_inventory(&mut catalog, &store, 3, fixed_now()).unwrap();

        assert_eq!(inventory.total_images, 3);
        assert_eq!(
            inventory.images,
            vec![
                InventoryImage {
                    path: "events/acme-corp/event-3/images/image-0.png".to_string(),
                    order: 0,
                    is_logo: true,
                },
                InventoryImage {
                    path: "events/acme-corp/event-3/images/image-2.jpg".to_string(),
                    order: 1,
                    is_logo: false,
                },
                InventoryImage {
                    path: "events/acme-corp/event-3/images/image-10.webp".to_string(),
                    order: 2,
                    is_logo: false,
                },
            ]
        );

        let event = &catalog.event(3).unwrap().extra;
        assert_eq!(event["imageInventory"]["totalImages"], 3);
        assert_eq!(event["imageInventory"]["logoFirst"], true);
        assert_eq!(event["imageInventory"]["images"][0]["isLogo"], true);

        let asset = &event["assetInventory"];
        assert_eq!(asset["hasLogo"], true);
        assert_eq!(asset["logoPath"], "events/acme-corp/event-3/images/image-0.png");
        assert_eq!(asset["promotionalImageCount"], 2);
        assert_eq!(asset["lastUpdated"], "2024-06-01T12:00:00.000Z");
        assert_eq!(asset["source"], "manual");
    }

    #[test]
    fn empty_directory_keeps_previous_logo_path() {
        let (_site, store, mut catalog) = setup();
        let images = store.resolve_images_dir(catalog.event(3).unwrap());
        fs::remove_dir_all(&images).unwrap();
        fs::create_dir_all(&images).unwrap();

        let inventory = update_event_inventory(&mut catalog, &store, 3, fixed_now()).unwrap();

        assert_eq!(inventory.total_images, 0);
        let asset = &catalog.event(3).unwrap().extra["assetInventory"];
        assert_eq!(asset["hasLogo"], false);
        assert_eq!(asset["logoPath"], "old/logo.png");
        assert_eq!(asset["promotionalImageCount"], 0);
    }

    #[test]
    fn unknown_event_is_reported() {
        let (_site, store, mut catalog) = setup();
        let result = update_event_inventory(&mut catalog, &store, 99, fixed_now());
        assert!(matches!(
            result,
            Err(DedupError::Catalog(CatalogError::EventNotFound { id: 99 }))
        ));
    }

    #[test]
    fn update_all_continues_past_missing_directories() {
        let (_site, store, mut catalog) = setup();

        let results = update_all_inventories(&mut catalog, &store, fixed_now());

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(DedupError::Scan(_))));
        assert!(catalog.event(4).unwrap().extra.get("imageInventory").is_none());
        assert_eq!(
            catalog.extra["metadata"]["lastUpdated"],
            "2024-06-01T12:00:00.000Z"
        );
    }
}
