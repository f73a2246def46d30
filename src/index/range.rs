//! Lazy range snapshot over chain heads
//!
//! Keys are pulled from the map one at a time; each one costs a full descent
//! from its chain head. Single pass, not restartable.

use std::collections::btree_map;
use std::marker::PhantomData;

use crate::chain::VersionChain;
use crate::errors::IndexResult;
use crate::mvcc::Version;
use crate::node::{NodeRef, NodeStore};
use crate::observability::MetricsRegistry;

pub struct RangeSnapshot<'a, K, P, N: ?Sized, C> {
    /// `None` once exhausted or after an error
    keys: Option<btree_map::Range<'a, K, C>>,
    store: &'a N,
    at: Version,
    metrics: &'a MetricsRegistry,
    _payload: PhantomData<fn() -> P>,
}

impl<'a, K, P, N, C> RangeSnapshot<'a, K, P, N, C>
where
    N: NodeStore<P> + ?Sized,
    C: VersionChain,
{
    pub(crate) fn new(
        keys: Option<btree_map::Range<'a, K, C>>,
        store: &'a N,
        at: Version,
        metrics: &'a MetricsRegistry,
    ) -> Self {
        metrics.increment_range_scans();
        Self {
            keys,
            store,
            at,
            metrics,
            _payload: PhantomData,
        }
    }

    fn visible(&self, chain: &C) -> IndexResult<Option<P>> {
        let descent = chain.find_visible_ref::<P, N>(self.store, self.at)?;
        self.metrics.add_hops(descent.hops);
        match descent.found {
            Some(header) => {
                let node = NodeRef::new(chain.namespace().clone(), header.version);
                self.store.payload(&node).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl<'a, K, P, N, C> Iterator for RangeSnapshot<'a, K, P, N, C>
where
    K: Clone,
    N: NodeStore<P> + ?Sized,
    C: VersionChain,
{
    type Item = IndexResult<(K, P)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, chain) = match self.keys.as_mut()?.next() {
                Some(entry) => entry,
                None => {
                    self.keys = None;
                    return None;
                }
            };
            match self.visible(chain) {
                Ok(Some(payload)) => {
                    self.metrics.increment_rows_emitted();
                    return Some(Ok((key.clone(), payload)));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.keys = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
