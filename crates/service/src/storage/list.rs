//! Sequential backend: a singly-linked chain of `(index, value)` nodes.
//!
//! `add` labels the new tail with `tail.index + 1`. `add_to_index` works on
//! positions, not keys: offset 0 makes a new head, offset `k` splices after the
//! k-th node, and the new node keeps the offset as its index without shifting
//! anyone else. Duplicate or non-monotonic indices are therefore possible and
//! lookups by index return the first node carrying it.

use parking_lot::RwLock;
use tracing::info;

use super::record::check_type;
use super::{Index, IndexMode, Record, Storage, StorageError, StorageKind, TypeTag};

type Link<V> = Option<Box<Node<V>>>;

struct Node<V> {
    index: Index,
    value: V,
    next: Link<V>,
}

struct Iter<'a, V> {
    next: Option<&'a Node<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            node
        })
    }
}

/// Chain plus the bookkeeping cached alongside it. Every field is updated
/// under the same write lock as the chain itself.
struct Chain<V> {
    head: Link<V>,
    len: usize,
    tail_index: Option<Index>,
    tag: Option<TypeTag>,
}

impl<V: Record> Chain<V> {
    fn new() -> Self {
        Self { head: None, len: 0, tail_index: None, tag: None }
    }

    fn iter(&self) -> Iter<'_, V> {
        Iter { next: self.head.as_deref() }
    }

    fn next_index(&self) -> Index {
        self.tail_index.map_or(1, |tail| tail + 1)
    }

    /// Link slot reached after following `steps` nodes from the head, or the
    /// empty slot past the tail if the chain is shorter.
    fn slot(&mut self, steps: usize) -> &mut Link<V> {
        let mut cursor = &mut self.head;
        for _ in 0..steps {
            match cursor {
                Some(node) => cursor = &mut node.next,
                None => break,
            }
        }
        cursor
    }

    fn splice(&mut self, position: usize, index: Index, value: V) {
        let appended = position >= self.len;
        if self.tag.is_none() {
            self.tag = Some(value.type_tag());
        }
        let slot = self.slot(position);
        let next = slot.take();
        *slot = Some(Box::new(Node { index, value, next }));
        self.len += 1;
        if appended {
            self.tail_index = Some(index);
        }
    }

    /// Unlink nodes accepted by `accept`, stopping after the first unless
    /// `all` is set. Returns how many were removed.
    fn unlink_where<F>(&mut self, mut accept: F, all: bool) -> usize
    where
        F: FnMut(&Node<V>) -> bool,
    {
        let mut removed = 0;
        let mut cursor = &mut self.head;
        loop {
            let hit = match cursor.as_deref() {
                Some(node) => accept(node),
                None => break,
            };
            if hit {
                if let Some(node) = cursor.take() {
                    *cursor = node.next;
                }
                removed += 1;
                if !all {
                    break;
                }
            } else if let Some(node) = cursor {
                cursor = &mut node.next;
            }
        }

        if removed > 0 {
            self.len -= removed;
            self.tail_index = self.iter().last().map(|n| n.index);
            if self.len == 0 {
                self.tag = None;
            }
        }
        removed
    }

    fn clear(&mut self) {
        // Unwind iteratively; recursive Box drops overflow on long chains.
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
        self.len = 0;
        self.tail_index = None;
        self.tag = None;
    }
}

impl<V> Drop for Chain<V> {
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

/// Thread-safe linked-chain store.
pub struct ListStorage<V> {
    inner: RwLock<Chain<V>>,
}

impl<V: Record> Default for ListStorage<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Record> ListStorage<V> {
    pub fn new() -> Self {
        info!(backend = "list", "storage initialized");
        Self { inner: RwLock::new(Chain::new()) }
    }

    /// Insert `value` at chain offset `position` and label it with that
    /// offset. Offsets range over `0..=len + 1`; both `len` and `len + 1`
    /// append at the tail.
    pub fn insert_at_position(&self, value: V, position: Index) -> Result<(), StorageError> {
        let mut chain = self.inner.write();
        let len = chain.len;
        let offset = usize::try_from(position)
            .ok()
            .filter(|&p| p <= len + 1)
            .ok_or(StorageError::IndexOutOfRange { index: position, len })?;
        check_type(chain.tag, &value)?;
        chain.splice(offset.min(len), position, value);
        Ok(())
    }

    /// Indices in chain order, duplicates included.
    pub fn indices(&self) -> Vec<Index> {
        self.inner.read().iter().map(|n| n.index).collect()
    }

    fn render(chain: &Chain<V>) -> String {
        if chain.len == 0 {
            return "Empty".to_string();
        }
        let items: Vec<String> = chain.iter().map(|n| format!("{:?}", n.value)).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<V: Record> Storage<V> for ListStorage<V> {
    fn len(&self) -> usize {
        self.inner.read().len
    }

    fn next_index(&self) -> Index {
        self.inner.read().next_index()
    }

    fn add(&self, value: V) -> Result<Index, StorageError> {
        let mut chain = self.inner.write();
        check_type(chain.tag, &value)?;
        let index = chain.next_index();
        let len = chain.len;
        chain.splice(len, index, value);
        Ok(index)
    }

    fn add_to_index(&self, value: V, index: Index) -> Result<(), StorageError> {
        self.insert_at_position(value, index)
    }

    fn remove_by_index(&self, index: Index) {
        self.inner.write().unlink_where(|n| n.index == index, false);
    }

    fn remove_by_value(&self, value: &V) {
        self.inner.write().unlink_where(|n| n.value == *value, false);
    }

    fn remove_all_by_value(&self, value: &V) {
        self.inner.write().unlink_where(|n| n.value == *value, true);
    }

    fn get_by_index(&self, index: Index) -> Option<V> {
        self.inner.read().iter().find(|n| n.index == index).map(|n| n.value.clone())
    }

    fn get_by_value(&self, value: &V) -> Option<Index> {
        self.inner.read().iter().find(|n| n.value == *value).map(|n| n.index)
    }

    fn get_all_by_value(&self, value: &V) -> Option<Vec<Index>> {
        let ids: Vec<Index> = self
            .inner
            .read()
            .iter()
            .filter(|n| n.value == *value)
            .map(|n| n.index)
            .collect();
        (!ids.is_empty()).then_some(ids)
    }

    fn get_all(&self) -> Option<Vec<V>> {
        let chain = self.inner.read();
        if chain.len == 0 {
            return None;
        }
        Some(chain.iter().map(|n| n.value.clone()).collect())
    }

    fn clear(&self) {
        self.inner.write().clear();
    }

    fn print(&self) {
        let chain = self.inner.read();
        info!(backend = "list", len = chain.len, contents = %Self::render(&chain), "storage dump");
    }

    fn index_mode(&self) -> IndexMode {
        IndexMode::Positional
    }

    fn kind(&self) -> StorageKind {
        StorageKind::List
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Value;

    fn list_of(values: &[&str]) -> ListStorage<Value> {
        let list = ListStorage::new();
        for v in values {
            list.add((*v).into()).unwrap();
        }
        list
    }

    #[test]
    fn add_appends_in_order() {
        let list = list_of(&["a", "b", "c"]);
        assert_eq!(list.indices(), vec![1, 2, 3]);
        assert_eq!(list.get_all(), Some(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(list.next_index(), 4);
    }

    #[test]
    fn offset_zero_becomes_head_labelled_zero() {
        let list = list_of(&["a"]);
        list.add_to_index("b".into(), 0).unwrap();

        assert_eq!(list.get_all(), Some(vec!["b".into(), "a".into()]));
        assert_eq!(list.indices(), vec![0, 1]);
        // labels are the offsets passed in, so index 1 still finds "a"
        assert_eq!(list.get_by_index(0), Some("b".into()));
        assert_eq!(list.get_by_index(1), Some("a".into()));
        assert_eq!(list.next_index(), 2);
    }

    #[test]
    fn positional_splice_keeps_existing_labels() {
        let list = list_of(&["a", "b", "c"]);
        list.add_to_index("x".into(), 2).unwrap();
        assert_eq!(list.get_all(), Some(vec!["a".into(), "b".into(), "x".into(), "c".into()]));
        assert_eq!(list.indices(), vec![1, 2, 2, 3]);
        // first node carrying the duplicate label wins
        assert_eq!(list.get_by_index(2), Some("b".into()));
        assert_eq!(list.get_all_by_value(&"x".into()), Some(vec![2]));
    }

    #[test]
    fn offsets_len_and_len_plus_one_append() {
        let list = list_of(&["a", "b"]);
        list.add_to_index("c".into(), 2).unwrap();
        list.add_to_index("d".into(), 4).unwrap();
        assert_eq!(list.indices(), vec![1, 2, 2, 4]);
        assert_eq!(list.next_index(), 5);
        assert_eq!(list.add("e".into()).unwrap(), 5);
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let list = list_of(&["a", "b"]);
        assert_eq!(
            list.add_to_index("z".into(), 4),
            Err(StorageError::IndexOutOfRange { index: 4, len: 2 })
        );
        assert_eq!(
            list.add_to_index("z".into(), -1),
            Err(StorageError::IndexOutOfRange { index: -1, len: 2 })
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn add_to_index_on_empty_list_sets_head_and_type() {
        let list: ListStorage<Value> = ListStorage::new();
        list.add_to_index(Value::Int(9), 1).unwrap();
        assert_eq!(list.indices(), vec![1]);
        assert_eq!(list.next_index(), 2);
        assert!(matches!(list.add("s".into()), Err(StorageError::TypeMismatch { .. })));
        assert!(matches!(list.add_to_index("s".into(), 0), Err(StorageError::TypeMismatch { .. })));
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let list = list_of(&["a", "b", "c", "d"]);
        list.remove_by_index(1);
        list.remove_by_index(3);
        assert_eq!(list.indices(), vec![2, 4]);
        list.remove_by_index(4);
        assert_eq!(list.indices(), vec![2]);
        assert_eq!(list.next_index(), 3);
        list.remove_by_index(99);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_by_value_takes_first_match_only() {
        let list = list_of(&["a", "b", "a"]);
        list.remove_by_value(&"a".into());
        assert_eq!(list.indices(), vec![2, 3]);
        assert_eq!(list.get_by_value(&"a".into()), Some(3));
    }

    #[test]
    fn remove_all_by_value_handles_adjacent_runs() {
        let list = list_of(&["a", "a", "b", "a", "a", "c", "a"]);
        list.remove_all_by_value(&"a".into());
        assert_eq!(list.get_all(), Some(vec!["b".into(), "c".into()]));
        assert_eq!(list.indices(), vec![3, 6]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.next_index(), 7);
    }

    #[test]
    fn getters_on_empty_list_report_absence() {
        let list: ListStorage<Value> = ListStorage::new();
        assert_eq!(list.get_by_index(1), None);
        assert_eq!(list.get_by_value(&"a".into()), None);
        assert_eq!(list.get_all_by_value(&"a".into()), None);
        assert_eq!(list.get_all(), None);
        assert_eq!(list.next_index(), 1);
        list.print();
    }

    #[test]
    fn render_matches_contents() {
        let list = list_of(&["a", "b"]);
        let chain = list.inner.read();
        assert_eq!(ListStorage::render(&chain), r#"[Text("a"), Text("b")]"#);
    }

    #[test]
    fn long_chain_clears_and_drops_without_recursion() {
        let list: ListStorage<i64> = ListStorage::new();
        {
            let mut chain = list.inner.write();
            for i in 1..=200_000 {
                // prepend keeps setup linear
                chain.splice(0, i, i);
            }
        }
        assert_eq!(list.len(), 200_000);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.next_index(), 1);
    }
}
