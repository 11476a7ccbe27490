// Copyright (c) Microsoft Corporation.

//! Bounded map + frequency-bucket list with O(1) promote/evict.
//!
//! Ports the algorithm from the original Go `LFUCache` (map + `container/list`-backed
//! frequency buckets) faithfully, but replaces its non-deterministic "pick any member of
//! the hash set" eviction tie-break with an explicit insertion-order list per bucket, per
//! §4.4's deterministic tie-break requirement.

use std::collections::HashMap;
use std::hash::Hash;

use cachelon_tier::{CacheEntry, CacheTier, Error};
use parking_lot::Mutex;

type ItemHandle = usize;
type BucketHandle = usize;

struct Item<K, V> {
    key: K,
    value: V,
    bucket: BucketHandle,
    prev_in_bucket: Option<ItemHandle>,
    next_in_bucket: Option<ItemHandle>,
}

struct Bucket {
    freq: u64,
    /// Oldest member first; the head is the deterministic eviction candidate.
    head: Option<ItemHandle>,
    tail: Option<ItemHandle>,
    prev: Option<BucketHandle>,
    next: Option<BucketHandle>,
}

struct Inner<K, V> {
    items: Vec<Option<Item<K, V>>>,
    item_free: Vec<ItemHandle>,
    buckets: Vec<Option<Bucket>>,
    bucket_free: Vec<BucketHandle>,
    bucket_head: Option<BucketHandle>,
    bucket_tail: Option<BucketHandle>,
    index: HashMap<K, ItemHandle>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V: Clone> Inner<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            item_free: Vec::new(),
            buckets: Vec::new(),
            bucket_free: Vec::new(),
            bucket_head: None,
            bucket_tail: None,
            index: HashMap::new(),
            capacity,
        }
    }

    fn bucket(&self, handle: BucketHandle) -> &Bucket {
        self.buckets[handle].as_ref().expect("bucket handle must be live")
    }

    fn bucket_mut(&mut self, handle: BucketHandle) -> &mut Bucket {
        self.buckets[handle].as_mut().expect("bucket handle must be live")
    }

    fn item(&self, handle: ItemHandle) -> &Item<K, V> {
        self.items[handle].as_ref().expect("item handle must be live")
    }

    fn item_mut(&mut self, handle: ItemHandle) -> &mut Item<K, V> {
        self.items[handle].as_mut().expect("item handle must be live")
    }

    /// Inserts a new bucket with the given `freq` immediately after `after` (or at the
    /// list head if `after` is `None`).
    fn insert_bucket_after(&mut self, after: Option<BucketHandle>, freq: u64) -> BucketHandle {
        let next = match after {
            Some(after) => self.bucket(after).next,
            None => self.bucket_head,
        };

        let bucket = Bucket { freq, head: None, tail: None, prev: after, next };
        let handle = if let Some(handle) = self.bucket_free.pop() {
            self.buckets[handle] = Some(bucket);
            handle
        } else {
            self.buckets.push(Some(bucket));
            self.buckets.len() - 1
        };

        match after {
            Some(after) => self.bucket_mut(after).next = Some(handle),
            None => self.bucket_head = Some(handle),
        }
        match next {
            Some(next) => self.bucket_mut(next).prev = Some(handle),
            None => self.bucket_tail = Some(handle),
        }
        handle
    }

    fn remove_bucket(&mut self, handle: BucketHandle) {
        let (prev, next) = {
            let bucket = self.bucket(handle);
            (bucket.prev, bucket.next)
        };
        match prev {
            Some(prev) => self.bucket_mut(prev).next = next,
            None => self.bucket_head = next,
        }
        match next {
            Some(next) => self.bucket_mut(next).prev = prev,
            None => self.bucket_tail = prev,
        }
        self.buckets[handle] = None;
        self.bucket_free.push(handle);
    }

    /// Appends `item` to the tail of `bucket`'s member list (newest arrival last).
    fn bucket_push_back(&mut self, bucket: BucketHandle, item: ItemHandle) {
        let tail = self.bucket(bucket).tail;
        self.item_mut(item).prev_in_bucket = tail;
        self.item_mut(item).next_in_bucket = None;
        match tail {
            Some(tail) => self.item_mut(tail).next_in_bucket = Some(item),
            None => self.bucket_mut(bucket).head = Some(item),
        }
        self.bucket_mut(bucket).tail = Some(item);
        self.item_mut(item).bucket = bucket;
    }

    /// Detaches `item` from its current bucket's member list, leaving the bucket
    /// possibly empty (caller decides whether to remove it).
    fn bucket_detach(&mut self, item: ItemHandle) {
        let bucket = self.item(item).bucket;
        let (prev, next) = {
            let it = self.item(item);
            (it.prev_in_bucket, it.next_in_bucket)
        };
        match prev {
            Some(prev) => self.item_mut(prev).next_in_bucket = next,
            None => self.bucket_mut(bucket).head = next,
        }
        match next {
            Some(next) => self.item_mut(next).prev_in_bucket = prev,
            None => self.bucket_mut(bucket).tail = prev,
        }
    }

    fn bucket_is_empty(&self, bucket: BucketHandle) -> bool {
        self.bucket(bucket).head.is_none()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let handle = *self.index.get(key)?;
        let old_bucket = self.item(handle).bucket;
        let old_freq = self.bucket(old_bucket).freq;
        let next_freq = old_freq + 1;

        self.bucket_detach(handle);

        let next_bucket = match self.bucket(old_bucket).next {
            Some(candidate) if self.bucket(candidate).freq == next_freq => candidate,
            _ => self.insert_bucket_after(Some(old_bucket), next_freq),
        };
        self.bucket_push_back(next_bucket, handle);

        if self.bucket_is_empty(old_bucket) {
            self.remove_bucket(old_bucket);
        }

        Some(self.item(handle).value.clone())
    }

    fn set(&mut self, key: K, value: V) {
        if let Some(&handle) = self.index.get(&key) {
            self.item_mut(handle).value = value;
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict();
        }

        let zero_bucket = match self.bucket_head {
            Some(head) if self.bucket(head).freq == 0 => head,
            _ => self.insert_bucket_after(None, 0),
        };

        let item = Item { key: key.clone(), value, bucket: zero_bucket, prev_in_bucket: None, next_in_bucket: None };
        let handle = if let Some(handle) = self.item_free.pop() {
            self.items[handle] = Some(item);
            handle
        } else {
            self.items.push(Some(item));
            self.items.len() - 1
        };
        self.bucket_push_back(zero_bucket, handle);
        self.index.insert(key, handle);
    }

    fn evict(&mut self) {
        let Some(lowest) = self.bucket_head else { return };
        let Some(victim) = self.bucket(lowest).head else { return };

        self.bucket_detach(victim);
        let key = self.item(victim).key.clone();
        self.index.remove(&key);
        self.items[victim] = None;
        self.item_free.push(victim);

        if self.bucket_is_empty(lowest) {
            self.remove_bucket(lowest);
        }
        tracing::trace!(evicted = ?key, "lfu evicted lowest-frequency entry");
    }

    fn keys(&self) -> Vec<K> {
        self.index.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `(freq, members-oldest-first)` for every bucket, head (lowest freq) first.
    /// Exposed for tests asserting the exact bucket layout (§8 "LFU frequency layout").
    fn bucket_layout(&self) -> Vec<(u64, Vec<K>)> {
        let mut layout = Vec::new();
        let mut current = self.bucket_head;
        while let Some(handle) = current {
            let bucket = self.bucket(handle);
            let mut members = Vec::new();
            let mut item_cursor = bucket.head;
            while let Some(item_handle) = item_cursor {
                let item = self.item(item_handle);
                members.push(item.key.clone());
                item_cursor = item.next_in_bucket;
            }
            layout.push((bucket.freq, members));
            current = bucket.next;
        }
        layout
    }
}

/// Bounded least-frequently-used store: map + frequency-bucket doubly linked list, O(1)
/// `get`/`set`. See §4.4.
pub struct LfuStore<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LfuStore<K, V> {
    /// Creates a store bounded to `capacity` entries. Returns `ConfigInvalid` if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error>
    where
        K: Hash + Eq + Clone,
        V: Clone,
    {
        if capacity == 0 {
            return Err(Error::from_message("lfu cache capacity must be greater than zero"));
        }
        Ok(Self { inner: Mutex::new(Inner::new(capacity)) })
    }
}

impl<K: Hash + Eq + Clone, V: Clone> LfuStore<K, V> {
    /// Looks up `key`, promoting it to the next frequency bucket on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Inserts or overwrites `key`. Overwriting an existing key does not bump its
    /// frequency (§4.4, §9 open question: this mirrors the original's behavior).
    pub fn set(&self, key: K, value: V) {
        self.inner.lock().set(key, value);
    }

    /// Returns all keys currently stored, in unspecified order.
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

    /// Returns `(freq, members-oldest-first)` per bucket, lowest frequency first.
    #[must_use]
    pub fn bucket_layout(&self) -> Vec<(u64, Vec<K>)> {
        self.inner.lock().bucket_layout()
    }
}

impl<K, V> CacheTier<K, V> for LfuStore<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        LfuStore::get(self, key).map(CacheEntry::new)
    }

    async fn insert(&self, key: &K, entry: CacheEntry<V>) {
        LfuStore::set(self, key.clone(), entry.into_value());
    }

    fn len(&self) -> Option<u64> {
        Some(LfuStore::len(self) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_capacity() {
        let result: Result<LfuStore<String, String>, _> = LfuStore::new(0);
        assert!(result.is_err());
    }

    #[test]
    fn eviction_prefers_oldest_in_lowest_bucket() {
        let cache: LfuStore<String, String> = LfuStore::new(3).unwrap();
        cache.set("vu".into(), "10".into());
        cache.set("nghia".into(), "20".into());
        cache.set("luan".into(), "5".into());
        cache.set("xanh".into(), "30".into());

        let mut keys = cache.keys();
        keys.sort();
        let mut expected = vec!["nghia".to_string(), "luan".to_string(), "xanh".to_string()];
        expected.sort();
        assert_eq!(keys, expected);
        assert!(!keys.contains(&"vu".to_string()));

        let layout = cache.bucket_layout();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].0, 0);
        let mut members = layout[0].1.clone();
        members.sort();
        assert_eq!(members, expected);
    }

    #[test]
    fn frequency_layout_matches_access_counts() {
        let cache: LfuStore<String, String> = LfuStore::new(3).unwrap();
        cache.set("vu".into(), "10".into());
        cache.set("nghia".into(), "20".into());
        cache.set("luan".into(), "5".into());

        for _ in 0..10 {
            cache.get(&"vu".to_string());
        }
        for _ in 0..9 {
            cache.get(&"nghia".to_string());
        }
        for _ in 0..8 {
            cache.get(&"luan".to_string());
        }

        let layout = cache.bucket_layout();
        let freqs: Vec<u64> = layout.iter().map(|(freq, _)| *freq).collect();
        assert_eq!(freqs, vec![8, 9, 10]);
        assert_eq!(layout[0].1, vec!["luan".to_string()]);
        assert_eq!(layout[1].1, vec!["nghia".to_string()]);
        assert_eq!(layout[2].1, vec!["vu".to_string()]);
    }

    #[test]
    fn get_hit_strictly_increases_frequency() {
        let cache: LfuStore<&str, i32> = LfuStore::new(2).unwrap();
        cache.set("a", 1);
        let before = cache.bucket_layout()[0].0;
        cache.get(&"a");
        let after = cache
            .bucket_layout()
            .into_iter()
            .find(|(_, members)| members.contains(&"a"))
            .map(|(freq, _)| freq)
            .unwrap();
        assert!(after > before);
    }

    #[test]
    fn set_on_existing_key_does_not_bump_frequency() {
        let cache: LfuStore<&str, i32> = LfuStore::new(2).unwrap();
        cache.set("a", 1);
        cache.get(&"a");
        let freq_after_get = cache.bucket_layout().into_iter().find(|(_, m)| m.contains(&"a")).unwrap().0;

        cache.set("a", 2);
        let freq_after_set = cache.bucket_layout().into_iter().find(|(_, m)| m.contains(&"a")).unwrap().0;

        assert_eq!(freq_after_get, freq_after_set);
        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[test]
    fn bucket_layout_snapshot_after_mixed_access_pattern() {
        let cache: LfuStore<&str, i32> = LfuStore::new(4).unwrap();
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        cache.get(&"a");
        cache.get(&"a");
        cache.get(&"b");

        let rendered = cache
            .bucket_layout()
            .iter()
            .map(|(freq, members)| format!("{freq}:{members:?}"))
            .collect::<Vec<_>>()
            .join(" | ");
        insta::assert_snapshot!(rendered, @r#"0:["c"] | 1:["b"] | 2:["a"]"#);
    }

    #[test]
    fn buckets_are_always_strictly_increasing_and_nonempty() {
        let cache: LfuStore<i32, i32> = LfuStore::new(5).unwrap();
        for i in 0..5 {
            cache.set(i, i);
        }
        for i in 0..5 {
            for _ in 0..i {
                cache.get(&i);
            }
        }
        cache.set(5, 5); // triggers an eviction

        let layout = cache.bucket_layout();
        let mut prev: Option<u64> = None;
        for (freq, members) in &layout {
            assert!(!members.is_empty());
            if let Some(prev) = prev {
                assert!(*freq > prev);
            }
            prev = Some(*freq);
        }
    }
}
