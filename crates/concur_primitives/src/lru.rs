// Copyright (c) Microsoft Corporation.

//! Bounded map + recency list with O(1) touch/evict.

use std::collections::HashMap;
use std::hash::Hash;

use cachelon_tier::{CacheEntry, CacheTier, Error};
use parking_lot::Mutex;

type NodeHandle = usize;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<NodeHandle>,
    next: Option<NodeHandle>,
}

/// An arena of recency-list nodes indexed by stable handles.
///
/// Realizes §9's recommendation: "an arena of nodes indexed by stable handles, with map
/// values storing handles", avoiding intrusive raw pointers while keeping splice/evict O(1).
struct Arena<K, V> {
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<NodeHandle>,
    head: Option<NodeHandle>,
    tail: Option<NodeHandle>,
}

impl<K, V> Arena<K, V> {
    fn new() -> Self {
        Self { nodes: Vec::new(), free: Vec::new(), head: None, tail: None }
    }

    fn insert(&mut self, key: K, value: V) -> NodeHandle {
        let node = Node { key, value, prev: None, next: None };
        let handle = if let Some(handle) = self.free.pop() {
            self.nodes[handle] = Some(node);
            handle
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        };
        self.push_front(handle);
        handle
    }

    fn detach(&mut self, handle: NodeHandle) {
        let (prev, next) = {
            let node = self.nodes[handle].as_ref().expect("handle must be live");
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.nodes[prev].as_mut().expect("prev must be live").next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].as_mut().expect("next must be live").prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, handle: NodeHandle) {
        let node = self.nodes[handle].as_mut().expect("handle must be live");
        node.prev = None;
        node.next = self.head;
        if let Some(head) = self.head {
            self.nodes[head].as_mut().expect("head must be live").prev = Some(handle);
        }
        self.head = Some(handle);
        if self.tail.is_none() {
            self.tail = Some(handle);
        }
    }

    fn move_to_front(&mut self, handle: NodeHandle) {
        if self.head == Some(handle) {
            return;
        }
        self.detach(handle);
        self.push_front(handle);
    }

    fn remove(&mut self, handle: NodeHandle) -> Node<K, V> {
        self.detach(handle);
        let node = self.nodes[handle].take().expect("handle must be live");
        self.free.push(handle);
        node
    }

    fn pop_back(&mut self) -> Option<NodeHandle> {
        let tail = self.tail?;
        Some(tail)
    }
}

struct Inner<K, V> {
    arena: Arena<K, V>,
    index: HashMap<K, NodeHandle>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> Inner<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        let handle = *self.index.get(key)?;
        self.arena.move_to_front(handle);
        Some(self.arena.nodes[handle].as_ref().expect("handle must be live").value.clone())
    }

    fn set(&mut self, key: K, value: V) {
        if let Some(&handle) = self.index.get(&key) {
            self.arena.nodes[handle].as_mut().expect("handle must be live").value = value;
            self.arena.move_to_front(handle);
            return;
        }

        if self.index.len() >= self.capacity {
            let evict = self.arena.pop_back().expect("full cache has a tail");
            let evicted = self.arena.remove(evict);
            self.index.remove(&evicted.key);
            tracing::trace!(evicted = ?evicted.key, "lru evicted least-recently-used entry");
        }

        let handle = self.arena.insert(key.clone(), value);
        self.index.insert(key, handle);
    }

    fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut current = self.arena.head;
        while let Some(handle) = current {
            let node = self.arena.nodes[handle].as_ref().expect("handle must be live");
            keys.push(node.key.clone());
            current = node.next;
        }
        keys
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Bounded least-recently-used store: map + doubly linked recency list, O(1) `get`/`set`.
///
/// See §4.3. Default capacity is 100 when constructed via [`LruStore::default`]; use
/// [`LruStore::new`] for an explicit, validated capacity.
pub struct LruStore<K, V> {
    inner: Mutex<Inner<K, V>>,
}

/// The default LRU capacity when none is specified (§6).
pub const DEFAULT_CAPACITY: usize = 100;

impl<K, V> LruStore<K, V> {
    /// Creates a store bounded to `capacity` entries. Returns `ConfigInvalid` if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::from_message("lru cache capacity must be greater than zero"));
        }
        Ok(Self {
            inner: Mutex::new(Inner { arena: Arena::new(), index: HashMap::new(), capacity }),
        })
    }
}

impl<K, V> Default for LruStore<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY).expect("default capacity is always valid")
    }
}

impl<K: Hash + Eq + Clone, V: Clone> LruStore<K, V> {
    /// Looks up `key`, splicing it to the head of the recency list on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Inserts or overwrites `key`, evicting the least-recently-used entry if full.
    pub fn set(&self, key: K, value: V) {
        self.inner.lock().set(key, value);
    }

    /// Returns all keys, most-recently-used first.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }

    /// Returns the number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> CacheTier<K, V> for LruStore<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        LruStore::get(self, key).map(CacheEntry::new)
    }

    async fn insert(&self, key: &K, entry: CacheEntry<V>) {
        LruStore::set(self, key.clone(), entry.into_value());
    }

    fn len(&self) -> Option<u64> {
        Some(LruStore::len(self) as u64)
    }
}
