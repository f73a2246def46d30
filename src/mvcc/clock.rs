//! Version Clock - Index-owned version assignment
//!
//! - One clock per index, shared by every key
//! - Starts at 1, never reuses a value
//! - Advanced only under the single-writer discipline
//! - No atomics, no wall clock, no global state
//!
//! On reopen the clock resumes after the highest version found in the
//! backing store.

use super::Version;

/// Monotonic source of versions for one index.
#[derive(Debug, Clone)]
pub struct VersionClock {
    /// The version the next append will receive.
    next: u64,
}

impl VersionClock {
    /// Create a clock for a fresh index. The first draw returns 1.
    pub fn new() -> Self {
        Self {
            next: Version::FIRST.value(),
        }
    }

    /// Create a clock that resumes after `highest`.
    ///
    /// `None` means nothing was ever written and behaves like `new`.
    pub fn resume_after(highest: Option<Version>) -> Self {
        match highest {
            Some(v) => Self {
                next: v.value() + 1,
            },
            None => Self::new(),
        }
    }

    /// Peek at the version the next draw will return.
    pub fn peek(&self) -> Version {
        Version::new(self.next)
    }

    /// Draw the next version and advance the clock.
    pub fn draw(&mut self) -> Version {
        let v = Version::new(self.next);
        self.next += 1;
        v
    }

    /// Highest version handed out so far, if any.
    pub fn highest(&self) -> Option<Version> {
        if self.next <= Version::FIRST.value() {
            None
        } else {
            Some(Version::new(self.next - 1))
        }
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_starts_at_one() {
        let mut clock = VersionClock::new();
        assert!(clock.highest().is_none());
        assert_eq!(clock.peek(), Version::new(1));
        assert_eq!(clock.draw(), Version::new(1));
        assert_eq!(clock.highest(), Some(Version::new(1)));
    }

    #[test]
    fn test_draws_are_strictly_increasing() {
        let mut clock = VersionClock::new();
        let mut last = clock.draw();
        for _ in 0..100 {
            let v = clock.draw();
            assert!(v > last);
            last = v;
        }
        assert_eq!(last, Version::new(101));
    }

    #[test]
    fn test_resume_after_highest() {
        let mut clock = VersionClock::resume_after(Some(Version::new(100)));
        assert_eq!(clock.highest(), Some(Version::new(100)));
        assert_eq!(clock.draw(), Version::new(101));
    }

    #[test]
    fn test_resume_after_nothing() {
        let mut clock = VersionClock::resume_after(None);
        assert_eq!(clock.draw(), Version::FIRST);
    }

    #[test]
    fn test_deterministic_sequence() {
        let mut a = VersionClock::new();
        let mut b = VersionClock::new();
        for _ in 0..10 {
            assert_eq!(a.draw(), b.draw());
        }
    }
}
