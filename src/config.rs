//! A small configuration snapshot and the trait boundary that persists it.
//!
//! The only setting this crate's external interface names is the decimal
//! width (§6's `DecimalWidth` key). This module gives that setting a
//! concrete shape (`Config`) and a storage seam (`ConfigStore`) that callers
//! can implement against a file, registry, or database; this crate itself
//! only ships the in-memory implementation tests and embedders need.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub decimal_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self { decimal_width: 3 }
    }
}

/// Loads and saves a single [`Config`] snapshot. Implementors decide where
/// "persisted" actually means: a file, an OS registry key, a database row.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Option<Config>;
    fn save(&self, config: &Config);
}

/// An in-memory `ConfigStore`, for tests and for embedders that don't need
/// cross-process persistence.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    slot: Mutex<Option<Config>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Option<Config> {
        *self.slot.lock().unwrap()
    }

    fn save(&self, config: &Config) {
        *self.slot.lock().unwrap() = Some(*config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_config() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryConfigStore::new();
        store.save(&Config { decimal_width: 5 });
        assert_eq!(store.load(), Some(Config { decimal_width: 5 }));
    }

    #[test]
    fn default_width_matches_decimal_module_default() {
        assert_eq!(Config::default().decimal_width, 3);
    }

    #[test]
    fn serializes_as_a_flat_json_object() {
        let json = serde_json::to_string(&Config { decimal_width: 4 }).unwrap();
        assert_eq!(json, r#"{"decimal_width":4}"#);
    }
}
