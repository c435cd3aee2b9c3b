//! Session-scoped applied filters.
//!
//! Filters a user applies to a dash without saving them are kept in a
//! client-local key-value store under
//! `dashboards.<dashboardId>.dashes.<dashId>.filters`. When nothing is stored
//! the dash's default filters apply, and failing those an empty block.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{FilterError, FilterResult};
use crate::tree::{IdGenerator, QueryBlock};

/// Where a dash's applied filters live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Dashboard identifier.
    pub dashboard_id: String,
    /// Dash identifier.
    pub dash_id: String,
}

impl SessionKey {
    /// Create a key.
    pub fn new(dashboard_id: impl Into<String>, dash_id: impl Into<String>) -> Self {
        Self {
            dashboard_id: dashboard_id.into(),
            dash_id: dash_id.into(),
        }
    }

    /// Store path, optionally under a namespace.
    pub fn path(&self, namespace: Option<&str>) -> String {
        let path = format!(
            "dashboards.{}.dashes.{}.filters",
            self.dashboard_id, self.dash_id
        );
        match namespace {
            Some(ns) => format!("{}.{}", ns, path),
            None => path,
        }
    }
}

/// A client-local key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    /// Write a value.
    fn set(&self, key: &str, value: serde_json::Value);
    /// Delete a value.
    fn remove(&self, key: &str);
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Applied filters per dash, backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionFilters<S> {
    store: S,
    namespace: Option<String>,
}

impl<S: KeyValueStore> SessionFilters<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            namespace: None,
        }
    }

    /// Prefix every key with `namespace`.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored override, if any.
    ///
    /// An entry that no longer parses is an error rather than silently
    /// ignored, so callers can offer to reset it.
    pub fn stored(&self, key: &SessionKey) -> FilterResult<Option<QueryBlock>> {
        let path = key.path(self.namespace.as_deref());
        let Some(value) = self.store.get(&path) else {
            return Ok(None);
        };
        serde_json::from_value(value).map(Some).map_err(|e| {
            warn!(path = %path, error = %e, "Stored filters are unreadable");
            FilterError::deserialization(e.to_string()).with_source(e)
        })
    }

    /// Filters currently applied to a dash.
    ///
    /// Falls back to `defaults`, then to a fresh empty block.
    pub fn applied(
        &self,
        key: &SessionKey,
        defaults: Option<&QueryBlock>,
        ids: &mut impl IdGenerator,
    ) -> FilterResult<QueryBlock> {
        if let Some(stored) = self.stored(key)? {
            return Ok(stored);
        }
        Ok(match defaults {
            Some(defaults) => defaults.clone(),
            None => QueryBlock::empty(ids),
        })
    }

    /// Store an override for a dash.
    pub fn apply(&self, key: &SessionKey, block: &QueryBlock) -> FilterResult<()> {
        let path = key.path(self.namespace.as_deref());
        let value = serde_json::to_value(block)
            .map_err(|e| FilterError::serialization(e.to_string()).with_source(e))?;
        debug!(path = %path, block = %block.id, "Applying session filters");
        self.store.set(&path, value);
        Ok(())
    }

    /// Drop the override so the defaults apply again.
    pub fn reset(&self, key: &SessionKey) {
        let path = key.path(self.namespace.as_deref());
        debug!(path = %path, "Resetting session filters");
        self.store.remove(&path);
    }
}
