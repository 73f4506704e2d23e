//! Key/value data store with file seeding.
//!
//! The whole document sits behind one atomic pointer. A load swaps in a new
//! map, so readers see either the previous content or the new one.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid store data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store data must be a JSON object")]
    NotAnObject,
}

/// A thread-safe cache of named JSON documents.
///
/// Clones share the same underlying document.
#[derive(Clone, Default)]
pub struct DataStore {
    id: &'static str,
    inner: Arc<ArcSwap<Map<String, Value>>>,
}

impl DataStore {
    /// Create a new empty store.
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            inner: Arc::new(ArcSwap::from_pointee(Map::new())),
        }
    }

    /// Create a store seeded from a JSON object file.
    pub fn load_from_file(id: &'static str, path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(id);
        let file = File::open(path)?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        store.load_value(value)?;

        tracing::info!(store = id, path = ?path, entries = store.len(), "Loaded store data from file");
        Ok(store)
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Replace the whole content of the store in one swap.
    pub fn load(&self, data: Map<String, Value>) {
        let entries = data.len();
        self.inner.store(Arc::new(data));

        metrics::record_store_size(entries);
        tracing::debug!(store = self.id, entries, "Store data loaded");
    }

    /// Replace the content from an arbitrary JSON value, which must be an object.
    pub fn load_value(&self, data: Value) -> Result<(), StoreError> {
        match data {
            Value::Object(map) => {
                self.load(map);
                Ok(())
            }
            _ => Err(StoreError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.load().get(key).cloned()
    }

    /// Snapshot of all entries as one JSON object.
    pub fn get_data(&self) -> Value {
        Value::Object(self.inner.load_full().as_ref().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}
