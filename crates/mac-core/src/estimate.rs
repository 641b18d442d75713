//! Lazily populated value-estimate tables.
//!
//! An [`EstimateTable`] maps a key (candidate, slot, or `(cell, candidate)`)
//! to a numeric estimate plus a visit count.  Entries are created on first
//! touch and never removed for the lifetime of the component.
//!
//! The backing map is a `BTreeMap`, so iteration follows key order.  Ranking
//! and tie-breaking code that walks the table therefore behaves identically
//! across runs, which a hashed map with a random state would not guarantee.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

/// One entry of an [`EstimateTable`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimate {
    pub value:  f64,
    /// Number of updates folded into `value`.  Only ever increases.
    pub visits: u64,
}

impl Estimate {
    #[inline]
    pub fn new(value: f64) -> Self {
        Self { value, visits: 0 }
    }
}

#[derive(Clone, Debug)]
pub struct EstimateTable<K> {
    inner: BTreeMap<K, Estimate>,
}

impl<K> Default for EstimateTable<K> {
    fn default() -> Self {
        Self { inner: BTreeMap::new() }
    }
}

impl<K: Ord + Copy> EstimateTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&Estimate> {
        self.inner.get(key)
    }

    /// Current value for `key`, or `None` if it was never visited.
    #[inline]
    pub fn value(&self, key: &K) -> Option<f64> {
        self.inner.get(key).map(|e| e.value)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Create the entry with `init` if absent and return it.
    pub fn ensure(&mut self, key: K, init: f64) -> &mut Estimate {
        self.inner.entry(key).or_insert_with(|| Estimate::new(init))
    }

    /// Overwrite the value for `key` without counting a visit.
    ///
    /// Used to seed estimates (e.g. from warm-up frequencies).
    pub fn set_value(&mut self, key: K, value: f64) {
        self.ensure(key, value).value = value;
    }

    /// Apply `f` to the current value (created with `init` if absent) and
    /// count one visit.  Returns the new value.
    pub fn update(&mut self, key: K, init: f64, f: impl FnOnce(f64) -> f64) -> f64 {
        let entry = self.ensure(key, init);
        entry.value = f(entry.value);
        entry.visits += 1;
        entry.value
    }

    /// Like [`update`](Self::update) but without counting a visit, for
    /// tables whose visit count tracks something other than updates.
    pub fn modify(&mut self, key: K, init: f64, f: impl FnOnce(f64) -> f64) -> f64 {
        let entry = self.ensure(key, init);
        entry.value = f(entry.value);
        entry.value
    }

    /// Count a visit without changing the value.
    pub fn visit(&mut self, key: K, init: f64) -> u64 {
        let entry = self.ensure(key, init);
        entry.visits += 1;
        entry.visits
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Estimate)> {
        self.inner.iter()
    }

    /// Entries whose key falls inside `range`, in key order.
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> impl Iterator<Item = (&K, &Estimate)> {
        self.inner.range(range)
    }
}
