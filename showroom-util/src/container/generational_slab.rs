//! Implements a generational slab.

use std::iter::Enumerate;
use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::slice::Iter;

/// Trait for keys of generation slabs.
pub trait GenerationalKey: Copy {
    #[doc(hidden)]
    /// Creates a new fixed key. Must not be called by the user.
    fn new(key: u32, generation: NonZeroU32) -> Self;
    #[doc(hidden)]
    /// Returns the key value.
    fn key(&self) -> u32;
    #[doc(hidden)]
    /// Returns the generation.
    fn generation(&self) -> NonZeroU32;
}

enum Slot<T> {
    Occupied { value: T, generation: NonZeroU32 },
    Empty { next_free: Option<u32>, last_generation: NonZeroU32 },
}

/// A slab with generational slots. A key whose slot was freed and reused
/// never resolves to the new value.
pub struct GenerationalSlab<I, V> {
    entries: Vec<Slot<V>>,
    next_free: Option<u32>,
    count: usize,
    _marker: PhantomData<I>,
}

impl<I: GenerationalKey, V> Default for GenerationalSlab<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: GenerationalKey, V> GenerationalSlab<I, V> {
    /// Creates a new generational slab.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_free: None,
            count: 0,
            _marker: PhantomData,
        }
    }

    /// Inserts a new value into the slab and returns its key.
    pub fn insert(&mut self, value: V) -> I {
        self.count += 1;

        if let Some(key) = self.next_free {
            if let Some(Slot::Empty {
                next_free,
                last_generation,
            }) = self.entries.get(key as usize)
            {
                let generation = last_generation
                    .checked_add(1)
                    .unwrap_or(NonZeroU32::MIN);

                self.next_free = *next_free;
                self.entries[key as usize] = Slot::Occupied { value, generation };

                return I::new(key, generation);
            }
        }

        let key = u32::try_from(self.entries.len()).expect("slab exceeded u32::MAX entries");
        let generation = NonZeroU32::MIN;
        self.entries.push(Slot::Occupied { value, generation });

        I::new(key, generation)
    }

    /// Returns a reference to the value of the given key.
    #[must_use]
    pub fn get(&self, key: I) -> Option<&V> {
        match self.entries.get(key.key() as usize) {
            Some(Slot::Occupied { value, generation }) if *generation == key.generation() => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value of the given key.
    #[must_use]
    pub fn get_mut(&mut self, key: I) -> Option<&mut V> {
        match self.entries.get_mut(key.key() as usize) {
            Some(Slot::Occupied { value, generation }) if *generation == key.generation() => Some(value),
            _ => None,
        }
    }

    /// Returns true if the key points at a live value.
    pub fn contains_key(&self, key: I) -> bool {
        self.get(key).is_some()
    }

    /// Removes the value with the given key if present.
    pub fn remove(&mut self, key: I) -> Option<V> {
        let entry = self.entries.get_mut(key.key() as usize)?;

        let generation = match entry {
            Slot::Occupied { generation, .. } if *generation == key.generation() => *generation,
            _ => return None,
        };

        let empty_slot = Slot::Empty {
            next_free: self.next_free,
            last_generation: generation,
        };

        self.next_free = Some(key.key());
        self.count -= 1;

        match std::mem::replace(entry, empty_slot) {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty { .. } => None,
        }
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the slab holds no values.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over all live values together with their keys.
    pub fn iter(&self) -> GenerationalIter<'_, I, V> {
        GenerationalIter {
            entries: self.entries.iter().enumerate(),
            _marker: PhantomData,
        }
    }

    /// Clears the slab. Keys handed out before stay invalid afterwards only
    /// as long as the slab is not reused, so callers drop them as well.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_free = None;
        self.count = 0;
    }
}

/// Iterator over all occupied slots.
pub struct GenerationalIter<'a, I, V> {
    entries: Enumerate<Iter<'a, Slot<V>>>,
    _marker: PhantomData<I>,
}

impl<'a, I: GenerationalKey, V> Iterator for GenerationalIter<'a, I, V> {
    type Item = (I, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.entries.by_ref() {
            if let Slot::Occupied { value, generation } = slot {
                return Some((I::new(index as u32, *generation), value));
            }
        }

        None
    }
}
