//! Per-index metrics registry
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Owned by each index instance, never global

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one index.
///
/// Relaxed atomics: counters are updated through `&self` from query paths.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Successful appends
    appends: AtomicU64,
    /// Chains created by a first append
    chains_created: AtomicU64,
    /// Point lookups served
    point_lookups: AtomicU64,
    /// Range and full snapshots started
    range_scans: AtomicU64,
    /// Rows yielded by range scans
    rows_emitted: AtomicU64,
    /// Nodes resolved during traversals
    hops: AtomicU64,
    /// Bridge pointers set
    bridges_recorded: AtomicU64,
    /// Bridges skipped because the store write failed
    bridge_failures: AtomicU64,
    /// Range steps that resumed from a bridge
    hint_hits: AtomicU64,
    /// Range steps that descended from the chain head instead
    hint_fallbacks: AtomicU64,
    /// Fallbacks caused by a bridge into the wrong chain
    prefix_mismatches: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_appends(&self) {
        self.appends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chains_created(&self) {
        self.chains_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_point_lookups(&self) {
        self.point_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_range_scans(&self) {
        self.range_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rows_emitted(&self) {
        self.rows_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Add traversal hops
    pub fn add_hops(&self, hops: u64) {
        self.hops.fetch_add(hops, Ordering::Relaxed);
    }

    pub fn increment_bridges_recorded(&self) {
        self.bridges_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bridge_failures(&self) {
        self.bridge_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hint_hits(&self) {
        self.hint_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hint_fallbacks(&self) {
        self.hint_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_prefix_mismatches(&self) {
        self.prefix_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    /// Total hops so far
    pub fn hops(&self) -> u64 {
        self.hops.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            appends: self.appends.load(Ordering::Relaxed),
            chains_created: self.chains_created.load(Ordering::Relaxed),
            point_lookups: self.point_lookups.load(Ordering::Relaxed),
            range_scans: self.range_scans.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
            hops: self.hops.load(Ordering::Relaxed),
            bridges_recorded: self.bridges_recorded.load(Ordering::Relaxed),
            bridge_failures: self.bridge_failures.load(Ordering::Relaxed),
            hint_hits: self.hint_hits.load(Ordering::Relaxed),
            hint_fallbacks: self.hint_fallbacks.load(Ordering::Relaxed),
            prefix_mismatches: self.prefix_mismatches.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub appends: u64,
    pub chains_created: u64,
    pub point_lookups: u64,
    pub range_scans: u64,
    pub rows_emitted: u64,
    pub hops: u64,
    pub bridges_recorded: u64,
    pub bridge_failures: u64,
    pub hint_hits: u64,
    pub hint_fallbacks: u64,
    pub prefix_mismatches: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_appends();
        registry.increment_appends();
        registry.increment_chains_created();
        registry.increment_point_lookups();
        registry.increment_range_scans();
        registry.increment_rows_emitted();
        registry.increment_bridges_recorded();
        registry.increment_hint_hits();
        registry.increment_hint_fallbacks();
        registry.increment_prefix_mismatches();
        registry.add_hops(17);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.appends, 2);
        assert_eq!(snapshot.chains_created, 1);
        assert_eq!(snapshot.point_lookups, 1);
        assert_eq!(snapshot.range_scans, 1);
        assert_eq!(snapshot.rows_emitted, 1);
        assert_eq!(snapshot.bridges_recorded, 1);
        assert_eq!(snapshot.hint_hits, 1);
        assert_eq!(snapshot.hint_fallbacks, 1);
        assert_eq!(snapshot.prefix_mismatches, 1);
        assert_eq!(snapshot.hops, 17);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.add_hops(5);

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["hops"], 5);
        assert_eq!(json["hint_fallbacks"], 0);
    }

    #[test]
    fn test_monotonic_increase() {
        let registry = MetricsRegistry::new();

        let mut prev = registry.hops();
        for _ in 0..10 {
            registry.add_hops(3);
            let current = registry.hops();
            assert!(current >= prev);
            prev = current;
        }
    }
}
