//! Ordered multiset of axis values.
//!
//! Each curve keeps one tracker per axis so that the auto-range can read the
//! extent of the live points without rescanning them.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// `f32` ordered by [`f32::total_cmp`] so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct Key(f32);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Ordered multiset of scalars with O(log n) insert/remove and fast min/max.
///
/// Duplicates are kept as separate occurrences: inserting `1.0` twice and
/// removing it once leaves one `1.0` behind.
#[derive(Debug, Clone, Default)]
pub struct RangeTracker {
    counts: BTreeMap<Key, usize>,
    len: usize,
}

impl RangeTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one occurrence of `value`.
    pub fn insert(&mut self, value: f32) {
        *self.counts.entry(Key(value)).or_insert(0) += 1;
        self.len += 1;
    }

    /// Remove one occurrence of `value`.
    ///
    /// Returns `false` (and changes nothing) when the value is absent.
    pub fn remove(&mut self, value: f32) -> bool {
        let key = Key(value);
        match self.counts.get_mut(&key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.counts.remove(&key);
            }
            None => return false,
        }
        self.len -= 1;
        true
    }

    /// Smallest value held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRange`] if the tracker is empty.
    pub fn min(&self) -> Result<f32> {
        self.counts
            .first_key_value()
            .map(|(key, _)| key.0)
            .ok_or(Error::EmptyRange)
    }

    /// Largest value held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRange`] if the tracker is empty.
    pub fn max(&self) -> Result<f32> {
        self.counts
            .last_key_value()
            .map(|(key, _)| key.0)
            .ok_or(Error::EmptyRange)
    }

    /// `(min, max)` pair, `None` when empty.
    #[must_use]
    pub fn extent(&self) -> Option<(f32, f32)> {
        Some((self.min().ok()?, self.max().ok()?))
    }

    /// Number of occurrences held (duplicates counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no value is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of occurrences of `value`.
    #[must_use]
    pub fn count(&self, value: f32) -> usize {
        self.counts.get(&Key(value)).copied().unwrap_or(0)
    }

    /// All occurrences in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.counts
            .iter()
            .flat_map(|(key, &count)| std::iter::repeat(key.0).take(count))
    }

    /// Drop every value.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.len = 0;
    }
}
