//! Fixed-capacity least-recently-used cache.
//!
//! The recency order lives in [`RecencyList`], a doubly linked list whose
//! nodes sit in a `Vec` arena and link to each other by index. Slot 0 is a
//! sentinel that is both the head and the tail boundary, so inserting or
//! unlinking never has to special-case an empty list. Slots vacated by
//! `pop_back` go on a free list and are reused by the next `push_front`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

const SENTINEL: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
}

/// Stable handle to a node in a [`RecencyList`].
///
/// A handle stays valid until its entry is popped; after that the slot may be
/// reused for another entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

/// Recency-ordered list, most recently used at the front.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
    len: usize,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyList<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node {
            entry: None,
            prev: SENTINEL,
            next: SENTINEL,
        });
        Self {
            nodes,
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a new entry at the front (MRU position).
    pub fn push_front(&mut self, key: K, value: V) -> NodeId {
        let node = Node {
            entry: Some((key, value)),
            prev: SENTINEL,
            next: SENTINEL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    /// Moves an entry to the front. Already-front and dead handles are ignored.
    pub fn move_to_front(&mut self, id: NodeId) {
        let idx = id.0;
        if self.nodes[SENTINEL].next == idx || !self.is_live(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    /// Removes and returns the back (LRU) entry.
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let idx = self.nodes[SENTINEL].prev;
        if idx == SENTINEL {
            return None;
        }
        self.unlink(idx);
        self.free.push(idx);
        self.len -= 1;
        self.nodes[idx].entry.take()
    }

    pub fn get(&self, id: NodeId) -> Option<&V> {
        self.nodes.get(id.0)?.entry.as_ref().map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.nodes
            .get_mut(id.0)?
            .entry
            .as_mut()
            .map(|(_, value)| value)
    }

    /// Keys from front (MRU) to back (LRU).
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            list: self,
            cursor: self.nodes[SENTINEL].next,
            remaining: self.len,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        self.nodes
            .get(idx)
            .is_some_and(|node| node.entry.is_some())
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[SENTINEL].next;
        self.nodes[idx].prev = SENTINEL;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[SENTINEL].next = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }
}

pub struct Keys<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        node.entry.as_ref().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Fixed-capacity LRU cache with O(1) `get` and `put`.
///
/// Every key in the index maps to exactly one live list node, and the list
/// never holds more than `capacity` entries.
#[derive(Debug)]
pub struct LruCache<K, V> {
    index: HashMap<K, NodeId>,
    list: RecencyList<K, V>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }
        Ok(Self {
            index: HashMap::with_capacity(capacity),
            list: RecencyList::with_capacity(capacity),
            capacity,
        })
    }

    /// Looks up `key` and promotes it to most recently used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id)
    }

    /// Inserts or updates `key` as most recently used.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(slot) = self.list.get_mut(id) {
                *slot = value;
            }
            self.list.move_to_front(id);
            return None;
        }

        let evicted = if self.list.len() == self.capacity {
            let evicted = self.list.pop_back();
            if let Some((old_key, _)) = &evicted {
                self.index.remove(old_key);
            }
            evicted
        } else {
            None
        };

        let id = self.list.push_front(key.clone(), value);
        self.index.insert(key, id);
        debug_assert_eq!(self.index.len(), self.list.len());
        evicted
    }

    /// Membership check without touching the recency order.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.list.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheError, LruCache, RecencyList};

    fn list_keys(list: &RecencyList<i32, i32>) -> Vec<i32> {
        list.keys().copied().collect()
    }

    fn cache_keys(cache: &LruCache<i32, i32>) -> Vec<i32> {
        cache.keys().copied().collect()
    }

    #[test]
    fn push_front_orders_newest_first() {
        let mut list = RecencyList::new();
        list.push_front(1, 1);
        assert_eq!(list_keys(&list), vec![1]);
        list.push_front(2, 1);
        assert_eq!(list_keys(&list), vec![2, 1]);
        list.push_front(3, 1);
        assert_eq!(list_keys(&list), vec![3, 2, 1]);
    }

    #[test]
    fn move_to_front_reorders() {
        let mut list = RecencyList::new();
        let one = list.push_front(1, 1);
        let two = list.push_front(2, 2);
        let _three = list.push_front(3, 3);

        list.move_to_front(one);
        assert_eq!(list_keys(&list), vec![1, 3, 2]);
        list.move_to_front(two);
        assert_eq!(list_keys(&list), vec![2, 1, 3]);
    }

    #[test]
    fn move_to_front_of_front_is_noop() {
        let mut list = RecencyList::new();
        list.push_front(1, 1);
        let two = list.push_front(2, 2);
        list.move_to_front(two);
        assert_eq!(list_keys(&list), vec![2, 1]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn pop_back_drains_from_lru_end() {
        let mut list = RecencyList::new();
        list.push_front(1, 10);
        list.push_front(2, 20);
        list.push_front(3, 30);
        assert_eq!(list_keys(&list), vec![3, 2, 1]);

        assert_eq!(list.pop_back(), Some((1, 10)));
        assert_eq!(list_keys(&list), vec![3, 2]);
        assert_eq!(list.pop_back(), Some((2, 20)));
        assert_eq!(list_keys(&list), vec![3]);
        assert_eq!(list.pop_back(), Some((3, 30)));
        assert!(list_keys(&list).is_empty());
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn popped_slots_are_reused() {
        let mut list = RecencyList::new();
        list.push_front(1, 1);
        list.push_front(2, 2);
        list.pop_back();
        list.push_front(3, 3);
        // Sentinel plus two live slots; the freed slot was recycled.
        assert_eq!(list.nodes.len(), 3);
        assert_eq!(list_keys(&list), vec![3, 2]);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = LruCache::<i32, i32>::new(0).unwrap_err();
        assert_eq!(err, CacheError::ZeroCapacity);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));

        cache.put(3, 3);
        assert_eq!(cache.get(&2), None);

        cache.put(4, 4);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(&3));
        assert_eq!(cache.get(&4), Some(&4));
    }

    #[test]
    fn overflow_by_one_drops_first_inserted() {
        let mut cache = LruCache::new(4).unwrap();
        for key in 0..5 {
            cache.put(key, key * 10);
        }
        assert!(!cache.contains(&0));
        for key in 1..5 {
            assert!(cache.contains(&key));
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn put_reports_evicted_entry() {
        let mut cache = LruCache::new(1).unwrap();
        assert_eq!(cache.put(1, 100), None);
        assert_eq!(cache.put(2, 200), Some((1, 100)));
        assert_eq!(cache_keys(&cache), vec![2]);
    }

    #[test]
    fn get_promotes_and_changes_eviction_order() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        assert_eq!(cache_keys(&cache), vec![3, 2, 1]);

        cache.get(&1);
        assert_eq!(cache_keys(&cache), vec![1, 3, 2]);

        cache.put(4, 4);
        assert_eq!(cache_keys(&cache), vec![4, 1, 3]);
        assert!(!cache.contains(&2));
    }

    #[test]
    fn get_on_mru_keeps_order() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        let before = cache_keys(&cache);
        cache.get(&2);
        assert_eq!(cache_keys(&cache), before);
    }

    #[test]
    fn miss_has_no_side_effect() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&9), None);
        assert_eq!(cache_keys(&cache), vec![2, 1]);
    }

    #[test]
    fn put_existing_key_updates_in_place() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.put(1, 11), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache_keys(&cache), vec![1, 2]);
        assert_eq!(cache.get(&1), Some(&11));
    }

    #[test]
    fn string_keys_are_looked_up_by_str() {
        let mut cache: LruCache<String, usize> = LruCache::new(2).unwrap();
        cache.put("alpha".to_string(), 5);
        assert_eq!(cache.get("alpha"), Some(&5));
        assert!(cache.contains("alpha"));
        assert!(!cache.contains("beta"));
    }

    #[test]
    fn contains_does_not_promote() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);
        assert!(cache.contains(&1));
        cache.put(3, 3);
        assert!(!cache.contains(&1));
    }
}
