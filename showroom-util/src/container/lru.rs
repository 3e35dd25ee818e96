//! Implements a count limited LRU cache.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroU32;

const LIST: usize = 0;
const FREE: usize = 1;

struct Entry<K, V> {
    key: Option<K>,
    value: Option<V>,
    next: usize,
    prev: usize,
    size: usize,
}

impl<K, V> Entry<K, V> {
    fn unlinked(index: usize) -> Self {
        Entry {
            key: None,
            value: None,
            next: index,
            prev: index,
            size: 0,
        }
    }
}

/// An LRU cache strategy that tracks the usage of its items and the overall
/// size they represent. All slots are allocated up front. Once every slot is
/// taken, new keys are refused until the caller makes room with
/// [`Lru::pop`] or [`Lru::remove`].
pub struct Lru<K, V> {
    // Slots 0 and 1 are the heads of the used and the free list.
    entries: Vec<Entry<K, V>>,
    lookup: HashMap<K, usize>,
    size: usize,
}

impl<K: Eq + Hash + Clone, V> Lru<K, V> {
    pub fn new(max_count: NonZeroU32) -> Self {
        let slots = max_count.get() as usize;

        let mut cache = Self {
            entries: (0..slots + 2).map(Entry::unlinked).collect(),
            lookup: HashMap::with_capacity(slots),
            size: 0,
        };

        (FREE + 1..slots + 2).for_each(|index| cache.attach(FREE, index));

        cache
    }

    /// Marks an item as the most recently used one.
    pub fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(index) = self.lookup.get(key).copied() {
            self.detach(index);
            self.attach(LIST, index);
        }
    }

    /// Returns an item and marks it as used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.get(key).copied()?;
        self.detach(index);
        self.attach(LIST, index);
        self.entries[index].value.as_ref()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.contains_key(key)
    }

    /// Inserts or replaces an item and marks it as used. Returns false if the
    /// key is new and the cache is full.
    pub fn put(&mut self, key: K, value: V, size: usize) -> bool {
        match self.lookup.get(&key).copied() {
            Some(index) => {
                self.detach(index);
                self.attach(LIST, index);

                let entry = &mut self.entries[index];
                entry.value = Some(value);
                self.size = self.size - entry.size + size;
                entry.size = size;

                true
            }
            None => {
                let index = self.entries[FREE].prev;

                if index == FREE {
                    return false;
                }

                self.detach(index);
                self.attach(LIST, index);
                self.lookup.insert(key.clone(), index);
                self.size += size;

                let entry = &mut self.entries[index];
                entry.key = Some(key);
                entry.value = Some(value);
                entry.size = size;

                true
            }
        }
    }

    /// Sum of the sizes of all items.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn count(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_full(&self) -> bool {
        self.entries[FREE].next == FREE
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.remove(key)?;
        self.detach(index);
        self.attach(FREE, index);

        let entry = &mut self.entries[index];
        self.size -= entry.size;
        entry.size = 0;
        entry.key = None;
        entry.value.take()
    }

    /// Removes the least recently used item.
    pub fn pop(&mut self) -> Option<(K, V)> {
        let index = self.entries[LIST].prev;

        if index == LIST {
            return None;
        }

        let key = self.entries[index].key.clone()?;
        self.remove(&key).map(|value| (key, value))
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// Items in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.lookup.values().filter_map(|index| self.entries[*index].value.as_ref())
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = (self.entries[index].prev, self.entries[index].next);
        self.entries[prev].next = next;
        self.entries[next].prev = prev;
    }

    fn attach(&mut self, head: usize, index: usize) {
        let next = self.entries[head].next;
        self.entries[index].next = next;
        self.entries[index].prev = head;
        self.entries[head].next = index;
        self.entries[next].prev = index;
    }
}
