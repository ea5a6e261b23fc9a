//! In-memory indexed storage.
//!
//! [`Storage`] is the contract the transport layer talks to. Two backends
//! implement it:
//! - [`ListStorage`]: a singly-linked chain of `(index, value)` nodes.
//! - [`MapStorage`]: a hash table keyed by index plus a next-index counter.
//!
//! Every backend guards its state with one reader-writer lock. Reads share it,
//! mutations (including the type check that precedes an insert) hold it
//! exclusively. Lookups hand out clones, never references into the store.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod list;
pub mod map;
pub mod record;

pub use list::ListStorage;
pub use map::MapStorage;
pub use record::{Record, TypeTag, Value};

/// Record identifier. Auto-assigned indices start at 1.
pub type Index = i64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("mismatched type: store holds {expected} records, got {found}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },
    #[error("index {0} already exists")]
    DuplicateIndex(Index),
    #[error("index {index} out of range for {len} records")]
    IndexOutOfRange { index: Index, len: usize },
}

/// How a backend interprets the index passed to [`Storage::add_to_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Offset into the chain; the new record is labelled with the offset.
    Positional,
    /// Literal key; occupied keys are rejected.
    Keyed,
}

/// Backend selector, fixed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    List,
    #[default]
    Map,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::List => f.write_str("list"),
            StorageKind::Map => f.write_str("map"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(StorageKind::List),
            "map" => Ok(StorageKind::Map),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Operation set shared by every backend. All methods are safe to call
/// concurrently from any thread.
pub trait Storage<V: Record>: Send + Sync {
    /// Number of records currently present.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index the next [`Storage::add`] would assign.
    fn next_index(&self) -> Index;

    /// Append `value` under the next sequential index.
    ///
    /// Fails with [`StorageError::TypeMismatch`] when the store is non-empty and
    /// holds records of another type; nothing is inserted in that case.
    fn add(&self, value: V) -> Result<Index, StorageError>;

    /// Insert `value` at a caller-chosen index, read according to
    /// [`Storage::index_mode`]. Type homogeneity is enforced here as well.
    fn add_to_index(&self, value: V, index: Index) -> Result<(), StorageError>;

    /// Remove the record at `index`. Absent indices are ignored.
    fn remove_by_index(&self, index: Index);

    /// Remove the first record equal to `value`, if any.
    fn remove_by_value(&self, value: &V);

    /// Remove every record equal to `value`.
    fn remove_all_by_value(&self, value: &V);

    fn get_by_index(&self, index: Index) -> Option<V>;

    /// Index of the first record equal to `value`.
    fn get_by_value(&self, value: &V) -> Option<Index>;

    /// Indices of all records equal to `value`; `None` when there are none.
    fn get_all_by_value(&self, value: &V) -> Option<Vec<Index>>;

    /// Every record in backend order; `None` when the store is empty.
    fn get_all(&self) -> Option<Vec<V>>;

    /// Drop all records and forget the established type.
    fn clear(&self);

    /// Write a diagnostic dump of the contents to the log.
    fn print(&self);

    fn index_mode(&self) -> IndexMode;

    fn kind(&self) -> StorageKind;
}

/// Instantiate the backend selected by `kind`.
pub fn build<V: Record>(kind: StorageKind) -> Arc<dyn Storage<V>> {
    match kind {
        StorageKind::List => Arc::new(ListStorage::new()),
        StorageKind::Map => Arc::new(MapStorage::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Arc<dyn Storage<Value>>> {
        vec![build(StorageKind::List), build(StorageKind::Map)]
    }

    #[test]
    fn storage_kind_parses_case_insensitively() {
        assert_eq!("LIST".parse::<StorageKind>(), Ok(StorageKind::List));
        assert_eq!(" map ".parse::<StorageKind>(), Ok(StorageKind::Map));
        assert!("tree".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::default(), StorageKind::Map);
    }

    #[test]
    fn build_honours_kind() {
        let list = build::<Value>(StorageKind::List);
        assert_eq!(list.kind(), StorageKind::List);
        assert_eq!(list.index_mode(), IndexMode::Positional);
        let map = build::<Value>(StorageKind::Map);
        assert_eq!(map.kind(), StorageKind::Map);
        assert_eq!(map.index_mode(), IndexMode::Keyed);
    }

    #[test]
    fn sequential_adds_yield_one_to_n() {
        for st in backends() {
            for (i, v) in ["a", "b", "c", "d"].into_iter().enumerate() {
                assert_eq!(st.next_index(), i as Index + 1);
                let id = st.add(v.into()).unwrap();
                assert_eq!(id, i as Index + 1, "backend {}", st.kind());
                assert_eq!(st.len(), i + 1);
            }
        }
    }

    #[test]
    fn get_then_remove_by_index() {
        for st in backends() {
            let id = st.add("x".into()).unwrap();
            assert_eq!(st.get_by_index(id), Some(Value::from("x")));
            st.remove_by_index(id);
            assert_eq!(st.get_by_index(id), None);
            assert!(st.is_empty());
        }
    }

    #[test]
    fn mismatched_add_leaves_store_untouched() {
        for st in backends() {
            st.add("x".into()).unwrap();
            let err = st.add(42.into()).unwrap_err();
            assert_eq!(err, StorageError::TypeMismatch { expected: "text", found: "int" });
            assert_eq!(st.len(), 1, "backend {}", st.kind());
            assert_eq!(st.next_index(), 2);
        }
    }

    #[test]
    fn get_all_by_value_single_and_absent() {
        for st in backends() {
            st.add("a".into()).unwrap();
            st.add("b".into()).unwrap();
            assert_eq!(st.get_all_by_value(&"b".into()), Some(vec![2]));
            assert_eq!(st.get_all_by_value(&"zz".into()), None);
        }
    }

    #[test]
    fn remove_all_by_value_twice_is_a_noop() {
        for st in backends() {
            st.add("v".into()).unwrap();
            st.add("v".into()).unwrap();
            st.remove_all_by_value(&"v".into());
            assert!(st.is_empty());
            st.remove_all_by_value(&"v".into());
            assert!(st.is_empty());
            assert_eq!(st.next_index(), 1, "backend {}", st.kind());
        }
    }

    #[test]
    fn emptied_store_accepts_a_new_type() {
        for st in backends() {
            st.add("x".into()).unwrap();
            st.remove_by_value(&"x".into());
            assert_eq!(st.add(7.into()).unwrap(), 1);
            st.clear();
            assert_eq!(st.add(true.into()).unwrap(), 1);
            assert_eq!(st.get_all(), Some(vec![Value::Bool(true)]));
        }
    }

    #[test]
    fn concurrent_adds_assign_unique_indices() {
        for st in backends() {
            std::thread::scope(|s| {
                for t in 0..8 {
                    let st = &st;
                    s.spawn(move || {
                        for i in 0..50 {
                            st.add(Value::Int(t * 100 + i)).unwrap();
                        }
                    });
                }
            });
            assert_eq!(st.len(), 400);
            let mut ids: Vec<Index> = st
                .get_all()
                .unwrap()
                .iter()
                .map(|v| st.get_by_value(v).unwrap())
                .collect();
            ids.sort_unstable();
            assert_eq!(ids, (1..=400).collect::<Vec<_>>(), "backend {}", st.kind());
        }
    }

    #[test]
    fn concurrent_mixed_types_never_mix() {
        for st in backends() {
            std::thread::scope(|s| {
                for t in 0..4 {
                    let st = &st;
                    s.spawn(move || {
                        for i in 0..25 {
                            let v = if t % 2 == 0 { Value::Int(i) } else { Value::Text(i.to_string()) };
                            let _ = st.add(v);
                        }
                    });
                }
            });
            let all = st.get_all().unwrap();
            let tag = all[0].type_tag();
            assert!(all.iter().all(|v| v.type_tag() == tag), "backend {}", st.kind());
        }
    }
}
