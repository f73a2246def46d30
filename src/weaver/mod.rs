//! Cross-chain weaver
//!
//! A ladder index whose nodes carry bridge pointers into the chain of the
//! next larger key. Range scans use the bridges as starting hints (see
//! `WovenSnapshot`); point lookups are unchanged.
//!
//! Bridges are recorded on append, at most once per node:
//! - forward: the new node bridges to the earliest node of the next larger
//!   key whose version is ≥ its own
//! - backfill: the previous key's head, if it has no bridge yet, bridges to
//!   the new node
//!
//! Under the index's own clock a new node always carries the highest
//! version, so the forward rule finds nothing to point at and bridges come
//! from backfill. A bridge is never rewritten when keys are later inserted
//! between two chains; such a bridge no longer lands in the neighbour's
//! chain and range scans fall back to a head descent.

mod config;
mod snapshot;

use std::ops::Bound;

use crate::chain::{LadderChain, LadderFactory, VersionChain};
use crate::errors::{IndexError, IndexResult};
use crate::index::{DomainKey, KeyRange, MultiVersionIndex, Rows, TemporalIndex};
use crate::mvcc::Version;
use crate::node::{NodeRef, NodeStore};
use crate::observability::{
    event_enabled, log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot,
};

pub use config::WeaverConfig;
pub use snapshot::WovenSnapshot;

pub struct WeaverIndex<K, P, N> {
    inner: MultiVersionIndex<K, P, N, LadderFactory>,
    config: WeaverConfig,
}

impl<K, P, N> WeaverIndex<K, P, N>
where
    K: DomainKey,
    N: NodeStore<P>,
{
    pub fn new(store: N, prefix: impl Into<String>, config: WeaverConfig) -> Self {
        Self {
            inner: MultiVersionIndex::new(store, LadderFactory, prefix),
            config,
        }
    }

    /// Reopen a weaver index persisted in `store`. Bridges live in the node
    /// records and need no separate restore.
    pub fn open(store: N, prefix: impl Into<String>, config: WeaverConfig) -> IndexResult<Self> {
        Ok(Self {
            inner: MultiVersionIndex::open(store, LadderFactory, prefix)?,
            config,
        })
    }

    /// Append `payload` to `key`, then record bridges around the new node.
    ///
    /// `Err` means nothing was appended. Once the node is committed, bridge
    /// failures are logged as BRIDGE_FAILED and counted but not returned: a
    /// node without a bridge only costs range scans a head descent.
    pub fn append(&mut self, key: K, payload: P) -> IndexResult<Version> {
        let node = self.inner.append_node(&key, payload)?;

        let forward = self
            .forward_target(&key, node.version)
            .and_then(|target| match target {
                Some(target) => self.record_bridge(&node, &target),
                None => Ok(()),
            });
        if let Err(e) = forward {
            self.bridge_failed(&node, &e);
        }
        if self.config.bridge_backfill {
            if let Some(previous_head) = self.previous_head(&key) {
                if let Err(e) = self.record_bridge(&previous_head, &node) {
                    self.bridge_failed(&previous_head, &e);
                }
            }
        }
        Ok(node.version)
    }

    fn bridge_failed(&self, from: &NodeRef, err: &IndexError) {
        self.inner.metrics().increment_bridge_failures();
        log_event_with_fields(
            Event::BridgeFailed,
            &[
                ("code", err.code()),
                ("from", &from.to_key()),
                ("reason", &err.to_string()),
            ],
        );
    }

    /// Earliest node of the next larger key with version ≥ `version`.
    fn forward_target(&self, key: &K, version: Version) -> IndexResult<Option<NodeRef>> {
        let next = self
            .inner
            .chains()
            .range::<K, _>((Bound::Excluded(key), Bound::Unbounded))
            .next();
        let chain = match next {
            Some((_, chain)) if !chain.is_empty() => chain,
            _ => return Ok(None),
        };
        first_at_or_after::<P, N>(chain, self.inner.store(), version, &self.config, self.metrics())
    }

    fn previous_head(&self, key: &K) -> Option<NodeRef> {
        self.inner
            .chains()
            .range::<K, _>((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
            .and_then(|(_, chain)| chain.head())
    }

    fn record_bridge(&mut self, from: &NodeRef, to: &NodeRef) -> IndexResult<()> {
        if !self.inner.store_mut().set_bridge(from, to)? {
            return Ok(());
        }
        self.inner.metrics().increment_bridges_recorded();
        if event_enabled(Event::BridgeRecorded) {
            log_event_with_fields(
                Event::BridgeRecorded,
                &[("from", &from.to_key()), ("to", &to.to_key())],
            );
        }
        Ok(())
    }

    /// Value of `key` visible at `at`.
    pub fn get(&self, key: &K, at: Version) -> IndexResult<Option<P>> {
        self.inner.get(key, at)
    }

    /// Keys in `range` with a value visible at `at`, resolved with bridge hints.
    pub fn range_snapshot(&self, range: &KeyRange<K>, at: Version) -> WovenSnapshot<'_, K, P, N> {
        let keys = range.bounds().map(|bounds| self.inner.chains().range(bounds));
        WovenSnapshot::new(keys, self.inner.store(), at, self.config, self.inner.metrics())
    }

    /// All keys with a value visible at `at`.
    pub fn snapshot(&self, at: Version) -> WovenSnapshot<'_, K, P, N> {
        let keys = self.inner.chains().range::<K, _>(..);
        WovenSnapshot::new(Some(keys), self.inner.store(), at, self.config, self.inner.metrics())
    }

    /// Chain of `key`, if it was ever written.
    pub fn chain(&self, key: &K) -> Option<&LadderChain> {
        self.inner.chain(key)
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn latest_version(&self) -> Option<Version> {
        self.inner.latest_version()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        self.inner.metrics()
    }

    pub fn store(&self) -> &N {
        self.inner.store()
    }

    /// Mutable store access, e.g. to damage records in tests.
    pub fn store_mut(&mut self) -> &mut N {
        self.inner.store_mut()
    }

    pub fn into_store(self) -> N {
        self.inner.into_store()
    }
}

/// Earliest node of `chain` with version ≥ `version`, as an absolute address.
fn first_at_or_after<P, N>(
    chain: &LadderChain,
    store: &N,
    version: Version,
    config: &WeaverConfig,
    metrics: &MetricsRegistry,
) -> IndexResult<Option<NodeRef>>
where
    N: NodeStore<P> + ?Sized,
{
    let probe = chain.first_greater_or_equal::<P, N>(store, version, config.laddered_first_ge)?;
    metrics.add_hops(probe.hops);
    Ok(probe
        .found
        .map(|header| NodeRef::new(chain.namespace().clone(), header.version)))
}

impl<K, P, N> TemporalIndex<K, P> for WeaverIndex<K, P, N>
where
    K: DomainKey,
    N: NodeStore<P>,
{
    fn append(&mut self, key: K, payload: P) -> IndexResult<Version> {
        WeaverIndex::append(self, key, payload)
    }

    fn get(&self, key: &K, at: Version) -> IndexResult<Option<P>> {
        WeaverIndex::get(self, key, at)
    }

    fn range_snapshot<'a>(&'a self, range: &KeyRange<K>, at: Version) -> Rows<'a, K, P> {
        Box::new(WeaverIndex::range_snapshot(self, range, at))
    }

    fn snapshot<'a>(&'a self, at: Version) -> Rows<'a, K, P> {
        Box::new(WeaverIndex::snapshot(self, at))
    }

    fn key_count(&self) -> usize {
        self.len()
    }

    fn latest_version(&self) -> Option<Version> {
        WeaverIndex::latest_version(self)
    }

    fn strategy(&self) -> &'static str {
        "weaver"
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainFactory;
    use crate::node::{ArenaNodeStore, Namespace};

    type Weaver = WeaverIndex<String, String, ArenaNodeStore<String>>;

    fn weaver(config: WeaverConfig) -> Weaver {
        WeaverIndex::new(ArenaNodeStore::new(), "VW", config)
    }

    fn bridge_of(index: &Weaver, key: &str, version: u64) -> Option<NodeRef> {
        let node = NodeRef::new(Namespace::new("VW", key), Version::new(version));
        index.store().resolve(&node).unwrap().bridge
    }

    #[test]
    fn test_backfill_links_previous_head() {
        let mut index = weaver(WeaverConfig::default());
        index.append("a".into(), "a1".into()).unwrap();
        index.append("b".into(), "b2".into()).unwrap();
        index.append("b".into(), "b3".into()).unwrap();

        // a1 bridges to b2 and keeps it when b3 arrives.
        let expected = NodeRef::new(Namespace::new("VW", "b"), Version::new(2));
        assert_eq!(bridge_of(&index, "a", 1), Some(expected));
        assert_eq!(index.metrics().snapshot().bridges_recorded, 1);
    }

    #[test]
    fn test_no_backfill_when_disabled() {
        let config = WeaverConfig {
            bridge_backfill: false,
            ..WeaverConfig::default()
        };
        let mut index = weaver(config);
        index.append("a".into(), "a1".into()).unwrap();
        index.append("b".into(), "b2".into()).unwrap();
        assert_eq!(bridge_of(&index, "a", 1), None);
    }

    #[test]
    fn test_forward_rule_finds_nothing_under_index_clock() {
        let mut index = weaver(WeaverConfig::default());
        index.append("b".into(), "b1".into()).unwrap();
        index.append("a".into(), "a2".into()).unwrap();
        // b1 is older than a2, so a2 gets no forward bridge.
        assert_eq!(bridge_of(&index, "a", 2), None);
    }

    #[test]
    fn test_forward_target_on_externally_versioned_chain() {
        let mut store = ArenaNodeStore::new();
        let mut chain = LadderFactory.create(Namespace::new("VW", "b"));
        for v in [3u64, 6, 9, 12] {
            chain.append(&mut store, Version::new(v), format!("b{}", v)).unwrap();
        }
        let metrics = MetricsRegistry::new();
        let config = WeaverConfig::default();

        let target = first_at_or_after::<String, _>(&chain, &store, Version::new(7), &config, &metrics)
            .unwrap()
            .unwrap();
        assert_eq!(target.version, Version::new(9));
        assert!(first_at_or_after::<String, _>(&chain, &store, Version::new(13), &config, &metrics)
            .unwrap()
            .is_none());
        assert!(metrics.hops() > 0);
    }

    #[test]
    fn test_hint_used_in_range() {
        let mut index = weaver(WeaverConfig::default());
        index.append("a".into(), "a1".into()).unwrap();
        index.append("b".into(), "b2".into()).unwrap();
        index.append("a".into(), "a3".into()).unwrap();
        for i in 4..=20u64 {
            index.append("b".into(), format!("b{}", i)).unwrap();
        }

        // a3 is a's earliest node at or after t=3 and bridges to b4, so b's
        // descent starts at b4 instead of b20.
        let range = KeyRange::inclusive("a".to_string(), "b".to_string());
        let rows: Vec<_> = index
            .range_snapshot(&range, Version::new(3))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(
            rows,
            vec![("a".to_string(), "a3".to_string()), ("b".to_string(), "b2".to_string())]
        );
        let m = index.metrics().snapshot();
        assert_eq!(m.hint_hits, 1);
        assert_eq!(m.hint_fallbacks, 0);
    }

    #[test]
    fn test_weaver_strategy_name() {
        let index = weaver(WeaverConfig::default());
        assert_eq!(TemporalIndex::strategy(&index), "weaver");
    }
}
