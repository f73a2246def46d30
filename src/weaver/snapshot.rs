//! Hinted range snapshot
//!
//! The first key descends from its chain head. Every later key looks at the
//! previous key's earliest node with version ≥ `at`; if that node bridges
//! into the current key's chain, the descent starts at the bridge target
//! instead of the head. The target's version is ≥ `at`, so every node
//! skipped is too new to be visible and the result equals a head descent.
//! Any unusable bridge falls back to the head, silently.

use std::collections::btree_map;
use std::marker::PhantomData;

use crate::chain::{LadderChain, VersionChain};
use crate::errors::{IndexError, IndexResult};
use crate::mvcc::Version;
use crate::node::{Namespace, NodeRef, NodeStore};
use crate::observability::{event_enabled, log_event_with_fields, Event, MetricsRegistry};

use super::WeaverConfig;

pub struct WovenSnapshot<'a, K, P, N: ?Sized> {
    keys: Option<btree_map::Range<'a, K, LadderChain>>,
    previous: Option<&'a LadderChain>,
    store: &'a N,
    at: Version,
    config: WeaverConfig,
    metrics: &'a MetricsRegistry,
    _payload: PhantomData<fn() -> P>,
}

impl<'a, K, P, N> WovenSnapshot<'a, K, P, N>
where
    N: NodeStore<P> + ?Sized,
{
    pub(crate) fn new(
        keys: Option<btree_map::Range<'a, K, LadderChain>>,
        store: &'a N,
        at: Version,
        config: WeaverConfig,
        metrics: &'a MetricsRegistry,
    ) -> Self {
        metrics.increment_range_scans();
        Self {
            keys,
            previous: None,
            store,
            at,
            config,
            metrics,
            _payload: PhantomData,
        }
    }

    fn visible(&self, previous: Option<&LadderChain>, chain: &LadderChain) -> IndexResult<Option<P>> {
        let start = match previous {
            Some(previous) => self.hint(previous, chain)?,
            None => None,
        };
        let descent = chain.descend::<P, N>(self.store, start, self.at)?;
        self.metrics.add_hops(descent.hops);
        match descent.found {
            Some(header) => {
                let node = NodeRef::new(chain.namespace().clone(), header.version);
                self.store.payload(&node).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Start version for `chain` derived from `previous`, `None` to use the head.
    fn hint(&self, previous: &LadderChain, chain: &LadderChain) -> IndexResult<Option<Version>> {
        let probe = previous.first_greater_or_equal::<P, N>(
            self.store,
            self.at,
            self.config.laddered_first_ge,
        )?;
        self.metrics.add_hops(probe.hops);

        let bridge = match probe.found.and_then(|header| header.bridge) {
            Some(bridge) => bridge,
            None => return Ok(self.fall_back(chain.namespace(), "no_bridge")),
        };

        match check_bridge(chain.namespace(), &bridge) {
            Ok(()) => {}
            Err(IndexError::PrefixMismatch { found, .. }) => {
                self.metrics.increment_prefix_mismatches();
                return Ok(self.fall_back(chain.namespace(), &found));
            }
            Err(e) => return Err(e),
        }

        // A target below `at` cannot bound the answer from above.
        if bridge.version < self.at {
            return Ok(self.fall_back(chain.namespace(), "below_timestamp"));
        }

        self.metrics.increment_hint_hits();
        Ok(Some(bridge.version))
    }

    fn fall_back(&self, namespace: &Namespace, reason: &str) -> Option<Version> {
        self.metrics.increment_hint_fallbacks();
        if event_enabled(Event::HintFallback) {
            log_event_with_fields(
                Event::HintFallback,
                &[
                    ("at", &self.at.to_string()),
                    ("namespace", namespace.as_str()),
                    ("reason", reason),
                ],
            );
        }
        None
    }
}

/// A bridge is usable only if it lands in the chain being searched.
pub(crate) fn check_bridge(expected: &Namespace, bridge: &NodeRef) -> IndexResult<()> {
    if expected.contains(bridge) {
        Ok(())
    } else {
        Err(IndexError::PrefixMismatch {
            expected: expected.to_string(),
            found: bridge.to_key(),
        })
    }
}

impl<'a, K, P, N> Iterator for WovenSnapshot<'a, K, P, N>
where
    K: Clone,
    N: NodeStore<P> + ?Sized,
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
            let previous = self.previous.replace(chain);
            match self.visible(previous, chain) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bridge() {
        let b = Namespace::new("VW", "b");
        let into_b = NodeRef::new(b.clone(), Version::new(4));
        let into_c = NodeRef::new(Namespace::new("VW", "c"), Version::new(4));

        assert!(check_bridge(&b, &into_b).is_ok());
        let err = check_bridge(&b, &into_c).unwrap_err();
        assert_eq!(err.code(), "CHRONO_PREFIX_MISMATCH");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_prefix_is_not_a_string_prefix_check() {
        // "VW:b:" must not accept a node of "VW:b:x:"
        let b = Namespace::new("VW", "b");
        let nested = NodeRef::new(Namespace::new("VW", "b:x"), Version::new(2));
        assert!(check_bridge(&b, &nested).is_err());
    }
}
