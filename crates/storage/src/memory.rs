use std::collections::BTreeMap;

use arc_swap::ArcSwap;

use super::KeyValueStore;
use super::error::StorageResult;

/// Process-local store. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: ArcSwap<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.load().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.rcu(|current| {
            let mut next = BTreeMap::clone(current);
            next.insert(key.to_string(), value.to_string());
            next
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.rcu(|current| {
            let mut next = BTreeMap::clone(current);
            next.remove(key);
            next
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("session_id", "first").unwrap();
        store.set("session_id", "second").unwrap();
        assert_eq!(store.get("session_id").unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);

        store.remove("session_id").unwrap();
        assert_eq!(store.get("session_id").unwrap(), None);
        // Removing an absent key is a no-op.
        store.remove("session_id").unwrap();
        assert!(store.is_empty());
    }
}
