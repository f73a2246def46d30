//! Multi-version index
//!
//! A sorted map from domain key to version chain, plus the one clock that
//! versions every write across all keys.
//!
//! # Invariants
//!
//! - Versions are strictly increasing and never reused, across all keys
//! - A key's chain is created on its first append, never removed
//! - The key directory is written before a new key's first node
//! - Range scans visit keys in ascending order and omit keys with nothing
//!   visible at the requested version

mod multi;
mod range;

use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use crate::errors::IndexResult;
use crate::mvcc::Version;
use crate::observability::MetricsSnapshot;

pub use multi::MultiVersionIndex;
pub use range::RangeSnapshot;

/// Identifier of a logical row.
///
/// The text form names the key's chain in the store and in the key
/// directory, so `FromStr` must accept what `Display` produces.
pub trait DomainKey: Ord + Clone + fmt::Display + FromStr {}

impl<T: Ord + Clone + fmt::Display + FromStr> DomainKey for T {}

/// Key interval of a range snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange<K> {
    pub from: K,
    pub from_inclusive: bool,
    pub to: K,
    pub to_inclusive: bool,
}

impl<K: Ord> KeyRange<K> {
    pub fn new(from: K, from_inclusive: bool, to: K, to_inclusive: bool) -> Self {
        Self {
            from,
            from_inclusive,
            to,
            to_inclusive,
        }
    }

    /// `[from, to]`
    pub fn inclusive(from: K, to: K) -> Self {
        Self::new(from, true, to, true)
    }

    /// Map bounds, `None` when the interval holds no key.
    ///
    /// An inverted interval, or a single point with either end excluded, is
    /// empty.
    pub fn bounds(&self) -> Option<(Bound<&K>, Bound<&K>)> {
        let empty = match self.from.cmp(&self.to) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => !(self.from_inclusive && self.to_inclusive),
            std::cmp::Ordering::Less => false,
        };
        if empty {
            return None;
        }
        let lower = if self.from_inclusive {
            Bound::Included(&self.from)
        } else {
            Bound::Excluded(&self.from)
        };
        let upper = if self.to_inclusive {
            Bound::Included(&self.to)
        } else {
            Bound::Excluded(&self.to)
        };
        Some((lower, upper))
    }
}

/// Rows yielded by a snapshot: ascending by key, ending after the first error.
pub type Rows<'a, K, P> = Box<dyn Iterator<Item = IndexResult<(K, P)>> + 'a>;

/// Strategy-independent view of an index, as driven by the CLI.
pub trait TemporalIndex<K, P> {
    /// Record `payload` as the newest value of `key`; returns its version.
    fn append(&mut self, key: K, payload: P) -> IndexResult<Version>;

    /// Value of `key` visible at `at`.
    fn get(&self, key: &K, at: Version) -> IndexResult<Option<P>>;

    /// Every key in `range` with a value visible at `at`.
    fn range_snapshot<'a>(&'a self, range: &KeyRange<K>, at: Version) -> Rows<'a, K, P>;

    /// Every key with a value visible at `at`.
    fn snapshot<'a>(&'a self, at: Version) -> Rows<'a, K, P>;

    /// Number of keys.
    fn key_count(&self) -> usize;

    /// Highest version assigned so far.
    fn latest_version(&self) -> Option<Version>;

    fn strategy(&self) -> &'static str;

    fn metrics(&self) -> MetricsSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_bounds() {
        let range = KeyRange::inclusive(2, 4);
        assert_eq!(
            range.bounds(),
            Some((Bound::Included(&2), Bound::Included(&4)))
        );
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert_eq!(KeyRange::inclusive(5, 1).bounds(), None);
    }

    #[test]
    fn test_point_range() {
        assert!(KeyRange::inclusive(3, 3).bounds().is_some());
        assert_eq!(KeyRange::new(3, false, 3, true).bounds(), None);
        assert_eq!(KeyRange::new(3, true, 3, false).bounds(), None);
    }

    #[test]
    fn test_exclusive_bounds() {
        let range = KeyRange::new("a", false, "c", false);
        assert_eq!(
            range.bounds(),
            Some((Bound::Excluded(&"a"), Bound::Excluded(&"c")))
        );
    }
}
