//! # Catalog Module
//!
//! The event catalog (`details.json`) and the on-disk layout of event image
//! directories.
//!
//! ## Backends
//! - `JsonCatalog`: the real file, written atomically
//! - `InMemoryCatalog`: for testing

mod inventory;
mod json;
mod memory;
mod model;
mod store;
mod traits;

pub use inventory::{
    apply_inventory, update_all_inventories, update_event_inventory, ImageInventory,
    InventoryImage,
};
pub use json::JsonCatalog;
pub use memory::InMemoryCatalog;
pub use model::{Catalog, EventRecord};
pub use store::{brand_slug, EventStore};
pub use traits::EventCatalog;
