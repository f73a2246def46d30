//! Version - Global logical timestamp
//!
//! - Totally orders every write across all keys
//! - Independent of wall-clock time
//! - No two writes share the same version
//! - Doubles as the node address inside a chain
//!
//! This is a PURE TYPE with NO behavior beyond construction and access.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-bit logical timestamp.
///
/// Versions are drawn from a single index-wide counter, which is what makes
/// a version observed under one key comparable with a version under another.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The first version an index ever assigns.
    pub const FIRST: Version = Version(1);

    /// Creates a version with the given value.
    ///
    /// No Default implementation exists to prevent accidental construction.
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the version immediately after this one.
    #[inline]
    pub fn successor(&self) -> Version {
        Version(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Version(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_requires_explicit_construction() {
        let v = Version::new(42);
        assert_eq!(v.value(), 42);
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1) < Version::new(2));
        assert_eq!(Version::new(7), Version::from(7));
    }

    #[test]
    fn test_version_successor() {
        assert_eq!(Version::FIRST.successor(), Version::new(2));
    }

    #[test]
    fn test_version_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Version::new(19)).unwrap();
        assert_eq!(json, "19");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Version::new(19));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(123).to_string(), "123");
    }
}
