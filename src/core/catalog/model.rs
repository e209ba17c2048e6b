//! `details.json` document model.
//!
//! Only the fields this crate reads are typed. Everything else rides along
//! in `extra` so a load/save round-trip never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The whole catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub events: Vec<EventRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One event entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    pub brand: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    /// Look up an event by id
    pub fn event(&self, id: u64) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Look up an event by id for modification
    pub fn event_mut(&mut self, id: u64) -> Option<&mut EventRecord> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    /// Set `metadata.lastUpdated`, creating `metadata` if needed
    pub fn touch(&mut self, timestamp: &str) {
        let metadata = self
            .extra
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        if let Value::Object(fields) = metadata {
            fields.insert("lastUpdated".to_string(), Value::String(timestamp.to_string()));
        }
    }
}

impl EventRecord {
    pub fn new(id: u64, brand: impl Into<String>) -> Self {
        Self {
            id,
            brand: brand.into(),
            extra: Map::new(),
        }
    }
}
