//! Persistent translation cache.
//!
//! Entries map `"{target}::{source text}"` to the translated text. Persistence
//! is best effort: every storage failure degrades to an in-session cache.

use crate::store::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;

pub const STORAGE_KEY: &str = "translationCache";

pub fn cache_key(target_language: &str, text: &str) -> String {
    format!("{}::{}", target_language, text)
}

#[derive(Clone)]
pub struct TranslationCache {
    store: Arc<dyn KeyValueStore>,
}

impl TranslationCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Never fails; absence or corruption yields an empty mapping.
    pub fn load(&self) -> HashMap<String, String> {
        let Some(raw) = self.store.get(STORAGE_KEY) else {
            return HashMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding corrupt translation cache: {}", e);
                HashMap::new()
            }
        }
    }

    /// Persists the full mapping. Failures are logged and swallowed.
    pub fn save(&self, entries: &HashMap<String, String>) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Could not serialize translation cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(STORAGE_KEY, &raw) {
            tracing::warn!("Translation cache not persisted: {}", e);
        }
    }
}
