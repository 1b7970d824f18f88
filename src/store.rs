use crate::ids::ClassId;
use serde_json::Value;
use std::collections::HashMap;

/// Generic key/value storage attached to a class.
///
/// This is the substrate every registration call writes into: schema hints,
/// media-type defaults, controller route info. Storage for a class is
/// allocated lazily on first write and lives for the registry's lifetime.
///
/// The store never walks the ancestor chain; [`has`](MetadataStore::has) and
/// [`get`](MetadataStore::get) answer for the class's own storage only.
/// Ancestor merging is the property registry's concern, not the store's.
#[derive(Debug, Default)]
pub struct MetadataStore {
    entries: HashMap<ClassId, HashMap<String, Value>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key` on the class's own storage. Never fails; absent targets
    /// and absent keys both yield `None`.
    pub fn get(&self, target: ClassId, key: &str) -> Option<&Value> {
        self.entries.get(&target).and_then(|m| m.get(key))
    }

    /// Attach `value` under `key`, replacing any previous value.
    pub fn set(&mut self, target: ClassId, key: &str, value: Value) {
        self.entries
            .entry(target)
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Existence check on the class's own storage only.
    pub fn has(&self, target: ClassId, key: &str) -> bool {
        self.entries
            .get(&target)
            .is_some_and(|m| m.contains_key(key))
    }

    /// Append `value` to the array stored under `key`, creating the array on
    /// first use. Used for list-valued hints such as class-level media types.
    pub fn push(&mut self, target: ClassId, key: &str, value: Value) {
        let slot = self
            .entries
            .entry(target)
            .or_default()
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = slot {
            items.push(value);
        }
    }

    /// Drop all storage. Intended for test isolation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
