//! Run-scoped derived value cache
//!
//! Maps an input key to a value computed from it. Entries are filled on
//! first access and never invalidated for the lifetime of the cache, which
//! lives inside a single run. Failed computations are not stored.

use std::collections::HashMap;
use std::hash::Hash;

/// Key to derived value cache
#[derive(Debug)]
pub struct DerivedCache<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Default for DerivedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> DerivedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it on first access
    pub fn get_or_insert_with(&mut self, key: &K, derive: impl FnOnce(&K) -> V) -> V {
        if let Some(value) = self.entries.get(key) {
            return value.clone();
        }
        let value = derive(key);
        self.entries.insert(key.clone(), value.clone());
        value
    }

    /// Fallible variant of [`Self::get_or_insert_with`]; errors are returned
    /// without populating the entry.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: &K,
        derive: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.entries.get(key) {
            return Ok(value.clone());
        }
        let value = derive(key)?;
        self.entries.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Whether `key` has been derived already
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
