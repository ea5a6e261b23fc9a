//! Hash-indexed backend: `index -> value` table plus an explicit counter.
//!
//! Counter rules:
//! - `add` uses the counter and bumps it.
//! - `add_to_index` advances it past any key at or above it.
//! - removing the key `counter - 1` hands that slot back; earlier gaps stay.
//! - the counter never leaves `1..=Index::MAX`; inserts that would push it
//!   past `Index::MAX` are rejected with [`StorageError::IndexOutOfRange`].
//! - `remove_all_by_value` recomputes it as `max(key) + 1`, or 1 once empty.
//! - `clear` resets it to 1.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::record::check_type;
use super::{Index, IndexMode, Record, Storage, StorageError, StorageKind, TypeTag};

const FIRST_INDEX: Index = 1;

struct Table<V> {
    entries: HashMap<Index, V>,
    next_index: Index,
    tag: Option<TypeTag>,
}

impl<V: Record> Table<V> {
    fn new() -> Self {
        Self { entries: HashMap::new(), next_index: FIRST_INDEX, tag: None }
    }

    fn insert(&mut self, index: Index, value: V) {
        if self.tag.is_none() {
            self.tag = Some(value.type_tag());
        }
        self.entries.insert(index, value);
    }

    fn remove(&mut self, index: Index) -> bool {
        if self.entries.remove(&index).is_none() {
            return false;
        }
        if index >= FIRST_INDEX && index == self.next_index - 1 {
            self.next_index = index;
        }
        if self.entries.is_empty() {
            self.tag = None;
        }
        true
    }

    /// Counter value following `index`, or an error when `index` is the
    /// last representable key.
    fn successor(&self, index: Index) -> Result<Index, StorageError> {
        index
            .checked_add(1)
            .ok_or(StorageError::IndexOutOfRange { index, len: self.entries.len() })
    }

    /// Matching keys, lowest first.
    fn keys_of(&self, value: &V) -> Vec<Index> {
        let mut keys: Vec<Index> = self
            .entries
            .iter()
            .filter(|(_, v)| *v == value)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn sorted(&self) -> Vec<(Index, &V)> {
        let mut pairs: Vec<(Index, &V)> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        pairs.sort_unstable_by_key(|(k, _)| *k);
        pairs
    }
}

/// Thread-safe hash-indexed store.
pub struct MapStorage<V> {
    inner: RwLock<Table<V>>,
}

impl<V: Record> Default for MapStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Record> MapStorage<V> {
    pub fn new() -> Self {
        info!(backend = "map", "storage initialized");
        Self { inner: RwLock::new(Table::new()) }
    }

    /// Insert `value` under the literal key `key`, rejecting occupied keys.
    pub fn insert_at_key(&self, value: V, key: Index) -> Result<(), StorageError> {
        let mut table = self.inner.write();
        if table.entries.contains_key(&key) {
            return Err(StorageError::DuplicateIndex(key));
        }
        check_type(table.tag, &value)?;
        let successor = table.successor(key)?;
        table.insert(key, value);
        if successor > table.next_index {
            table.next_index = successor;
        }
        Ok(())
    }
}

impl<V: Record> Storage<V> for MapStorage<V> {
    fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    fn next_index(&self) -> Index {
        self.inner.read().next_index
    }

    fn add(&self, value: V) -> Result<Index, StorageError> {
        let mut table = self.inner.write();
        check_type(table.tag, &value)?;
        let index = table.next_index;
        let successor = table.successor(index)?;
        table.insert(index, value);
        table.next_index = successor;
        Ok(index)
    }

    fn add_to_index(&self, value: V, index: Index) -> Result<(), StorageError> {
        self.insert_at_key(value, index)
    }

    fn remove_by_index(&self, index: Index) {
        self.inner.write().remove(index);
    }

    fn remove_by_value(&self, value: &V) {
        let mut table = self.inner.write();
        if let Some(&key) = table.keys_of(value).first() {
            table.remove(key);
        }
    }

    fn remove_all_by_value(&self, value: &V) {
        let mut table = self.inner.write();
        let before = table.entries.len();
        table.entries.retain(|_, v| *v != *value);
        table.next_index = table
            .entries
            .keys()
            .max()
            .map_or(FIRST_INDEX, |max| max.saturating_add(1).max(FIRST_INDEX));
        if table.entries.is_empty() {
            table.tag = None;
        }
        debug!(removed = before - table.entries.len(), next_index = table.next_index, "remove_all_by_value");
    }

    fn get_by_index(&self, index: Index) -> Option<V> {
        self.inner.read().entries.get(&index).cloned()
    }

    fn get_by_value(&self, value: &V) -> Option<Index> {
        self.inner.read().keys_of(value).first().copied()
    }

    fn get_all_by_value(&self, value: &V) -> Option<Vec<Index>> {
        let keys = self.inner.read().keys_of(value);
        (!keys.is_empty()).then_some(keys)
    }

    fn get_all(&self) -> Option<Vec<V>> {
        let table = self.inner.read();
        if table.entries.is_empty() {
            return None;
        }
        Some(table.sorted().into_iter().map(|(_, v)| v.clone()).collect())
    }

    fn clear(&self) {
        let mut table = self.inner.write();
        table.entries.clear();
        table.next_index = FIRST_INDEX;
        table.tag = None;
    }

    fn print(&self) {
        let table = self.inner.read();
        if table.entries.is_empty() {
            info!(backend = "map", "storage dump: map is empty");
            return;
        }
        let rendered: Vec<String> = table.sorted().iter().map(|(k, v)| format!("{k}:{v:?}")).collect();
        info!(
            backend = "map",
            len = table.entries.len(),
            next_index = table.next_index,
            contents = %format!("map[{}]", rendered.join(" ")),
            "storage dump"
        );
    }

    fn index_mode(&self) -> IndexMode {
        IndexMode::Keyed
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Map
    }
}
