//! Process-wide bidirectional map between strings and 64-bit string IDs.
//!
//! Every public entry point takes the dictionary's internal spinlock for its
//! whole duration, so a bulk call acquires and releases the lock exactly
//! once. The backing index is bucket-structured (a `Vec` of slice lists per
//! bucket, selected by FNV-32 over the string bytes) fronted by two layers
//! that make the common case cheap: a bloom filter rejects "definitely new"
//! keys without touching a bucket at all, and a small direct-mapped cache
//! remembers the most recently resolved slot per hash so repeated lookups
//! skip the bucket chain entirely.

pub mod counters;
pub mod id;

pub use counters::DictCounters;
pub use id::StringId;

use colbin_bloom::{fnv1a_32, BloomFilter};
use colbin_spinlock::Spinlock;

const DEFAULT_EXPECTED_ITEMS: usize = 1024;
const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;
const INITIAL_BUCKET_COUNT: usize = 64;
const CACHE_SIZE: usize = 256;
const MAX_LOAD_FACTOR: f64 = 0.75;

#[derive(Clone, Copy)]
struct CacheEntry {
    hash: u32,
    slot: usize,
}

struct Inner {
    slots: Vec<Option<String>>,
    free_list: Vec<usize>,
    buckets: Vec<Vec<usize>>,
    bloom: BloomFilter,
    cache: Vec<Option<CacheEntry>>,
    counters: DictCounters,
}

impl Inner {
    fn new() -> Self {
        Inner {
            slots: Vec::new(),
            free_list: Vec::new(),
            buckets: vec![Vec::new(); INITIAL_BUCKET_COUNT],
            bloom: BloomFilter::new(DEFAULT_EXPECTED_ITEMS, DEFAULT_FALSE_POSITIVE_RATE),
            cache: vec![None; CACHE_SIZE],
            counters: DictCounters::default(),
        }
    }

    fn bucket_index(&self, hash: u32) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    fn cache_index(&self, hash: u32) -> usize {
        (hash as usize) % self.cache.len()
    }

    /// Resolves `s` to its slot, consulting the front cache then the bucket
    /// chain. Updates counters and repopulates the cache on a bucket hit.
    fn find_slot(&mut self, s: &str) -> Option<usize> {
        let hash = fnv1a_32(s.as_bytes());
        let cidx = self.cache_index(hash);
        if let Some(entry) = self.cache[cidx] {
            if entry.hash == hash && self.slots[entry.slot].as_deref() == Some(s) {
                self.counters.bucket_cache_search_hit += 1;
                return Some(entry.slot);
            }
        }
        self.counters.bucket_cache_search_miss += 1;

        let bidx = self.bucket_index(hash);
        for &slot in &self.buckets[bidx] {
            if self.slots[slot].as_deref() == Some(s) {
                self.counters.bucket_search_hit += 1;
                self.cache[cidx] = Some(CacheEntry { hash, slot });
                return Some(slot);
            }
        }
        self.counters.bucket_search_miss += 1;
        None
    }

    fn insert_new(&mut self, s: &str) -> usize {
        let hash = fnv1a_32(s.as_bytes());
        let slot = if let Some(free) = self.free_list.pop() {
            self.slots[free] = Some(s.to_string());
            free
        } else {
            self.slots.push(Some(s.to_string()));
            self.slots.len() - 1
        };
        self.bloom.insert(s.as_bytes());
        let bidx = self.bucket_index(hash);
        self.buckets[bidx].push(slot);
        let cidx = self.cache_index(hash);
        self.cache[cidx] = Some(CacheEntry { hash, slot });
        self.maybe_rehash();
        slot
    }

    fn maybe_rehash(&mut self) {
        let in_use = self.slots.len() - self.free_list.len();
        if (in_use as f64) <= (self.buckets.len() as f64) * MAX_LOAD_FACTOR {
            return;
        }
        let new_count = self.buckets.len() * 2;
        let mut new_buckets = vec![Vec::new(); new_count];
        for (slot, entry) in self.slots.iter().enumerate() {
            if let Some(s) = entry {
                let hash = fnv1a_32(s.as_bytes());
                new_buckets[(hash as usize) & (new_count - 1)].push(slot);
            }
        }
        self.buckets = new_buckets;
        // Cache entries still reference valid slots; no invalidation needed.
    }

    fn remove_slot(&mut self, slot: usize) {
        let Some(s) = self.slots[slot].take() else {
            return;
        };
        let hash = fnv1a_32(s.as_bytes());
        let bidx = self.bucket_index(hash);
        if let Some(pos) = self.buckets[bidx].iter().position(|&x| x == slot) {
            self.buckets[bidx].swap_remove(pos);
        }
        let cidx = self.cache_index(hash);
        if matches!(self.cache[cidx], Some(e) if e.slot == slot) {
            self.cache[cidx] = None;
        }
        self.free_list.push(slot);
    }
}

pub struct StringDictionary {
    inner: Spinlock<Inner>,
}

impl Default for StringDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl StringDictionary {
    pub fn new() -> Self {
        StringDictionary {
            inner: Spinlock::new(Inner::new()),
        }
    }

    /// Bulk insert. For a string already mapped, returns its existing id.
    /// For a new string, allocates a slot (reusing the free list when
    /// possible) and records a copy. Duplicates within `strings` collapse
    /// to the same id, matching the first occurrence's allocation.
    pub fn insert(&self, strings: &[&str]) -> Vec<StringId> {
        let mut inner = self.inner.lock();
        let mut out = Vec::with_capacity(strings.len());
        for &s in strings {
            let might_exist = inner.bloom.may_contain(s.as_bytes());
            let slot = if might_exist {
                match inner.find_slot(s) {
                    Some(slot) => slot,
                    None => inner.insert_new(s),
                }
            } else {
                inner.insert_new(s)
            };
            out.push(StringId::from_slot(slot));
        }
        out
    }

    /// Bulk lookup with a presence mask. Returns `(ids, found, num_not_found)`.
    pub fn locate_safe(&self, keys: &[&str]) -> (Vec<StringId>, Vec<bool>, usize) {
        let mut inner = self.inner.lock();
        let mut ids = Vec::with_capacity(keys.len());
        let mut found = Vec::with_capacity(keys.len());
        let mut num_not_found = 0;
        for &k in keys {
            if !inner.bloom.may_contain(k.as_bytes()) {
                ids.push(StringId::NULL);
                found.push(false);
                num_not_found += 1;
                continue;
            }
            match inner.find_slot(k) {
                Some(slot) => {
                    ids.push(StringId::from_slot(slot));
                    found.push(true);
                }
                None => {
                    ids.push(StringId::NULL);
                    found.push(false);
                    num_not_found += 1;
                }
            }
        }
        (ids, found, num_not_found)
    }

    /// Bulk lookup assuming every key exists. Behavior is unspecified (but
    /// safe: `StringId::NULL`) for keys that do not.
    pub fn locate_fast(&self, keys: &[&str]) -> Vec<StringId> {
        let mut inner = self.inner.lock();
        keys.iter()
            .map(|&k| {
                inner
                    .find_slot(k)
                    .map(StringId::from_slot)
                    .unwrap_or(StringId::NULL)
            })
            .collect()
    }

    /// Reverse lookup. Unknown ids yield `None`.
    pub fn extract(&self, ids: &[StringId]) -> Vec<Option<String>> {
        let inner = self.inner.lock();
        ids.iter()
            .map(|&id| {
                id.as_slot()
                    .and_then(|slot| inner.slots.get(slot))
                    .and_then(|entry| entry.clone())
            })
            .collect()
    }

    /// Drops entries and returns their slots to the free list.
    pub fn remove(&self, ids: &[StringId]) {
        let mut inner = self.inner.lock();
        for &id in ids {
            if let Some(slot) = id.as_slot() {
                if slot < inner.slots.len() {
                    inner.remove_slot(slot);
                }
            }
        }
    }

    /// Drops every entry, resetting the dictionary to empty.
    pub fn free(&self) {
        let mut inner = self.inner.lock();
        *inner = Inner::new();
    }

    pub fn num_distinct(&self) -> usize {
        let inner = self.inner.lock();
        inner.slots.len() - inner.free_list.len()
    }

    pub fn get_contents(&self) -> (Vec<String>, Vec<StringId>) {
        let inner = self.inner.lock();
        let mut strings = Vec::new();
        let mut ids = Vec::new();
        for (slot, entry) in inner.slots.iter().enumerate() {
            if let Some(s) = entry {
                strings.push(s.clone());
                ids.push(StringId::from_slot(slot));
            }
        }
        (strings, ids)
    }

    pub fn counters(&self) -> DictCounters {
        self.inner.lock().counters
    }

    pub fn reset_counters(&self) {
        self.inner.lock().counters.reset();
    }
}
