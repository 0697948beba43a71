use std::{marker::PhantomData, ops::AddAssign};

use anyhow::{ensure, Context, Result};

use crate::{
    hash::{Hasher, MixHash},
    reduce::{FastMod64, Reduce},
    util::prefetch_index,
    Key, EMPTY,
};

/// Number of slots per expected key. With 2 the load factor never exceeds 0.5.
pub const DEFAULT_FACTOR: usize = 2;

/// Outcome of a single insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insert {
    /// The key was new and now occupies a slot.
    Inserted,
    /// The key was already present. Nothing changed.
    Duplicate,
    /// The table has no free slot left. Nothing changed.
    Full,
    /// The key equals the empty-slot sentinel and can not be stored.
    Reserved,
}

/// Counts of insert outcomes over a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkStats {
    pub inserted: u64,
    pub duplicates: u64,
    pub full: u64,
    pub reserved: u64,
}

impl BulkStats {
    pub fn record(&mut self, outcome: Insert) {
        match outcome {
            Insert::Inserted => self.inserted += 1,
            Insert::Duplicate => self.duplicates += 1,
            Insert::Full => self.full += 1,
            Insert::Reserved => self.reserved += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.duplicates + self.full + self.reserved
    }
}

impl AddAssign for BulkStats {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.duplicates += rhs.duplicates;
        self.full += rhs.full;
        self.reserved += rhs.reserved;
    }
}

/// Computes home slots for a table of fixed capacity.
///
/// This is `Copy` and does not borrow the table, so keys can be hashed on one
/// thread while another thread mutates the table.
#[derive(Clone, Copy, Debug)]
pub struct SlotHasher<Hx: Hasher, R: Reduce> {
    rem: R,
    _hx: PhantomData<Hx>,
}

impl<Hx: Hasher, R: Reduce> SlotHasher<Hx, R> {
    fn new(capacity: usize) -> Self {
        Self {
            rem: R::new(capacity),
            _hx: PhantomData,
        }
    }

    #[inline(always)]
    pub fn slot(&self, key: &Key) -> usize {
        Hx::hash(key).reduce(self.rem)
    }

    /// Overwrite `out` with the home slot of each key.
    pub fn slots_into(&self, keys: &[Key], out: &mut Vec<usize>) {
        out.clear();
        out.extend(keys.iter().map(|key| self.slot(key)));
    }
}

/// Fixed-capacity open-addressing hash set over `i64` keys with linear probing.
///
/// Empty slots hold [`EMPTY`]. The table never grows and keys are never removed.
///
/// `Hx`: The hasher to use for keys.
/// `R`: The reduction from hash to slot.
pub struct FixedSet<Hx: Hasher = MixHash, R: Reduce = FastMod64> {
    /// Number of slots.
    capacity: usize,
    /// Number of non-empty slots.
    occupied: usize,
    slots: Vec<Key>,
    hasher: SlotHasher<Hx, R>,
}

impl<Hx: Hasher, R: Reduce> FixedSet<Hx, R> {
    /// A set for at most `expected` keys, using `DEFAULT_FACTOR` slots per key.
    pub fn new(expected: usize) -> Result<Self> {
        Self::with_factor(expected, DEFAULT_FACTOR)
    }

    /// A set with `factor * expected` slots.
    pub fn with_factor(expected: usize, factor: usize) -> Result<Self> {
        ensure!(expected > 0, "expected number of keys must be positive");
        ensure!(factor >= 2, "factor must be at least 2, got {factor}");
        let capacity = expected
            .checked_mul(factor)
            .with_context(|| format!("capacity {expected} * {factor} overflows"))?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .with_context(|| format!("failed to allocate {capacity} slots"))?;
        slots.resize(capacity, EMPTY);

        Ok(Self {
            capacity,
            occupied: 0,
            slots,
            hasher: SlotHasher::new(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of keys stored.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.capacity
    }

    pub fn load_factor(&self) -> f32 {
        self.occupied as f32 / self.capacity as f32
    }

    /// Raw view of the slots, with [`EMPTY`] marking free ones.
    pub fn slots(&self) -> &[Key] {
        &self.slots
    }

    /// Iterate over the stored keys in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.slots.iter().copied().filter(|&v| v != EMPTY)
    }

    pub fn slot_hasher(&self) -> SlotHasher<Hx, R> {
        self.hasher
    }

    /// The slot where probing for `key` starts.
    pub fn home(&self, key: &Key) -> usize {
        self.hasher.slot(key)
    }

    /// Walk forward from `home`, wrapping after the last slot, until an empty
    /// slot or `key` is found. Returns `None` when all slots were visited.
    #[inline(always)]
    fn probe(&self, key: Key, home: usize) -> Option<usize> {
        let mut i = home;
        for _ in 0..self.capacity {
            let v = self.slots[i];
            if v == EMPTY || v == key {
                return Some(i);
            }
            i = if i + 1 == self.capacity { 0 } else { i + 1 };
        }
        None
    }

    /// Insert `key`; `true` only when it was not present before.
    pub fn insert(&mut self, key: Key) -> bool {
        self.try_insert(key) == Insert::Inserted
    }

    pub fn try_insert(&mut self, key: Key) -> Insert {
        let home = self.home(&key);
        self.insert_at(key, home)
    }

    /// Insert `key` whose home slot `home` was computed by a [`SlotHasher`] of this set.
    #[inline(always)]
    pub fn insert_at(&mut self, key: Key, home: usize) -> Insert {
        debug_assert!(home < self.capacity);
        if key == EMPTY {
            return Insert::Reserved;
        }
        if self.is_full() {
            return Insert::Full;
        }
        match self.probe(key, home) {
            Some(i) if self.slots[i] == key => Insert::Duplicate,
            Some(i) => {
                self.slots[i] = key;
                self.occupied += 1;
                Insert::Inserted
            }
            None => Insert::Full,
        }
    }

    /// The slot holding `key`, if present.
    pub fn lookup(&self, key: Key) -> Option<usize> {
        if key == EMPTY {
            return None;
        }
        self.probe(key, self.home(&key))
            .filter(|&i| self.slots[i] == key)
    }

    pub fn contains(&self, key: Key) -> bool {
        self.lookup(key).is_some()
    }

    /// Insert `keys` in order, with `homes[i]` the precomputed home slot of `keys[i]`.
    ///
    /// Before probing for key `i`, the home slot of key `i+1` is prefetched.
    pub fn bulk_insert(&mut self, keys: &[Key], homes: &[usize]) -> BulkStats {
        self.bulk_insert_ahead::<1>(keys, homes)
    }

    /// Like `bulk_insert`, but prefetch `AHEAD` keys ahead instead of 1.
    pub fn bulk_insert_ahead<const AHEAD: usize>(
        &mut self,
        keys: &[Key],
        homes: &[usize],
    ) -> BulkStats {
        assert_eq!(keys.len(), homes.len(), "one home slot per key");
        let mut stats = BulkStats::default();
        for (i, (&key, &home)) in keys.iter().zip(homes).enumerate() {
            if let Some(&next) = homes.get(i + AHEAD) {
                prefetch_index(&self.slots, next);
            }
            stats.record(self.insert_at(key, home));
        }
        stats
    }
}
