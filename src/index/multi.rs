//! Sorted key → chain map with a shared version clock

use std::collections::BTreeMap;
use std::marker::PhantomData;

use super::range::RangeSnapshot;
use super::{DomainKey, KeyRange, Rows, TemporalIndex};
use crate::chain::{ChainFactory, VersionChain};
use crate::errors::{IndexError, IndexResult};
use crate::mvcc::{Version, VersionClock};
use crate::node::{directory_key, Namespace, NodeRef, NodeStore};
use crate::observability::{
    event_enabled, log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot,
};

/// Multi-version index over one chain strategy.
///
/// The index exclusively owns its node store; chains only carry metadata
/// and borrow the store per operation.
pub struct MultiVersionIndex<K, P, N, F: ChainFactory> {
    store: N,
    factory: F,
    prefix: String,
    chains: BTreeMap<K, F::Chain>,
    clock: VersionClock,
    metrics: MetricsRegistry,
    _payload: PhantomData<fn() -> P>,
}

impl<K, P, N, F> MultiVersionIndex<K, P, N, F>
where
    K: DomainKey,
    N: NodeStore<P>,
    F: ChainFactory,
{
    /// Fresh index over `store`; keys are namespaced under `prefix`.
    pub fn new(store: N, factory: F, prefix: impl Into<String>) -> Self {
        Self {
            store,
            factory,
            prefix: prefix.into(),
            chains: BTreeMap::new(),
            clock: VersionClock::new(),
            metrics: MetricsRegistry::new(),
            _payload: PhantomData,
        }
    }

    /// Reopen the index persisted in `store` under `prefix`.
    ///
    /// Every chain in the key directory is restored from its metadata and
    /// the clock resumes after the newest head. A key without metadata was
    /// registered but never written and comes back empty.
    pub fn open(store: N, factory: F, prefix: impl Into<String>) -> IndexResult<Self> {
        let mut index = Self::new(store, factory, prefix);
        let directory = index.store.load_directory(&index.prefix)?;

        let mut highest: Option<Version> = None;
        for text in directory {
            let key = K::from_str(&text).map_err(|_| {
                IndexError::corrupt_record(
                    directory_key(&index.prefix),
                    format!("unparseable key {}", text),
                )
            })?;
            let namespace = Namespace::new(&index.prefix, &text);
            let chain = match index.store.load_meta(&namespace)? {
                Some(meta) => index.factory.restore(namespace, meta)?,
                None => index.factory.create(namespace),
            };
            if event_enabled(Event::ChainReopened) {
                let length = chain.len().to_string();
                log_event_with_fields(
                    Event::ChainReopened,
                    &[("namespace", chain.namespace().as_str()), ("length", &length)],
                );
            }
            highest = highest.max(chain.meta().head);
            index.chains.insert(key, chain);
        }

        index.clock = VersionClock::resume_after(highest);
        log_event_with_fields(
            Event::IndexOpen,
            &[
                ("keys", &index.chains.len().to_string()),
                ("next_version", &index.clock.peek().to_string()),
                ("prefix", &index.prefix),
                ("strategy", index.factory.name()),
            ],
        );
        Ok(index)
    }

    /// Append `payload` to `key`'s chain under the next global version.
    pub fn append(&mut self, key: K, payload: P) -> IndexResult<Version> {
        let node = self.append_node(&key, payload)?;
        Ok(node.version)
    }

    /// Append and return the new node's address.
    pub(crate) fn append_node(&mut self, key: &K, payload: P) -> IndexResult<NodeRef> {
        if !self.chains.contains_key(key) {
            self.register(key)?;
        }

        let version = self.clock.draw();
        let factory = &self.factory;
        let prefix = &self.prefix;
        let chain = self
            .chains
            .entry(key.clone())
            .or_insert_with(|| factory.create(Namespace::new(prefix, &key.to_string())));
        let node = chain.append(&mut self.store, version, payload)?;

        self.metrics.increment_appends();
        if event_enabled(Event::AppendCommit) {
            log_event_with_fields(
                Event::AppendCommit,
                &[
                    ("node", &node.to_key()),
                    ("length", &chain.len().to_string()),
                ],
            );
        }
        Ok(node)
    }

    /// Add `key` to the key directory, then create its chain.
    fn register(&mut self, key: &K) -> IndexResult<()> {
        let text = key.to_string();
        self.store
            .append_directory(&self.prefix, self.chains.len(), &text)?;

        let namespace = Namespace::new(&self.prefix, &text);
        log_event_with_fields(Event::ChainCreated, &[("namespace", namespace.as_str())]);
        self.chains.insert(key.clone(), self.factory.create(namespace));
        self.metrics.increment_chains_created();
        Ok(())
    }

    /// Value of `key` visible at `at`.
    pub fn get(&self, key: &K, at: Version) -> IndexResult<Option<P>> {
        self.metrics.increment_point_lookups();
        let chain = match self.chains.get(key) {
            Some(chain) => chain,
            None => return Ok(None),
        };
        let descent = chain.find_visible_ref::<P, N>(&self.store, at)?;
        self.metrics.add_hops(descent.hops);
        match descent.found {
            Some(header) => {
                let node = NodeRef::new(chain.namespace().clone(), header.version);
                self.store.payload(&node).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Keys in `range` with a value visible at `at`, ascending.
    pub fn range_snapshot(
        &self,
        range: &KeyRange<K>,
        at: Version,
    ) -> RangeSnapshot<'_, K, P, N, F::Chain> {
        let keys = range.bounds().map(|bounds| self.chains.range(bounds));
        RangeSnapshot::new(keys, &self.store, at, &self.metrics)
    }

    /// All keys with a value visible at `at`, ascending.
    pub fn snapshot(&self, at: Version) -> RangeSnapshot<'_, K, P, N, F::Chain> {
        let keys = self.chains.range::<K, _>(..);
        RangeSnapshot::new(Some(keys), &self.store, at, &self.metrics)
    }

    /// Chain of `key`, if it was ever written.
    pub fn chain(&self, key: &K) -> Option<&F::Chain> {
        self.chains.get(key)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.chains.keys()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Highest version assigned so far.
    pub fn latest_version(&self) -> Option<Version> {
        self.clock.highest()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn strategy(&self) -> &'static str {
        self.factory.name()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn store(&self) -> &N {
        &self.store
    }

    /// Mutable store access, e.g. to damage records in tests.
    pub fn store_mut(&mut self) -> &mut N {
        &mut self.store
    }

    pub fn into_store(self) -> N {
        self.store
    }

    pub(crate) fn chains(&self) -> &BTreeMap<K, F::Chain> {
        &self.chains
    }
}

impl<K, P, N, F> TemporalIndex<K, P> for MultiVersionIndex<K, P, N, F>
where
    K: DomainKey,
    N: NodeStore<P>,
    F: ChainFactory,
{
    fn append(&mut self, key: K, payload: P) -> IndexResult<Version> {
        MultiVersionIndex::append(self, key, payload)
    }

    fn get(&self, key: &K, at: Version) -> IndexResult<Option<P>> {
        MultiVersionIndex::get(self, key, at)
    }

    fn range_snapshot<'a>(&'a self, range: &KeyRange<K>, at: Version) -> Rows<'a, K, P> {
        Box::new(MultiVersionIndex::range_snapshot(self, range, at))
    }

    fn snapshot<'a>(&'a self, at: Version) -> Rows<'a, K, P> {
        Box::new(MultiVersionIndex::snapshot(self, at))
    }

    fn key_count(&self) -> usize {
        self.len()
    }

    fn latest_version(&self) -> Option<Version> {
        MultiVersionIndex::latest_version(self)
    }

    fn strategy(&self) -> &'static str {
        MultiVersionIndex::strategy(self)
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
