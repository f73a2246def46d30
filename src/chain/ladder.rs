//! Deterministic skip-ladder chain
//!
//! The `count`-th append gets level `tz(count)` and reaches every level up to
//! it. Its ladder pointer targets the previous node that reached the same
//! level, which is always `2^level` appends back and always a node of higher
//! level than its own. A lookup greedily takes the ladder while the ladder
//! target is still too new, otherwise steps to the predecessor; no walk
//! resolves more than b(b+1)/2 nodes, b being the bit length of the append
//! count.

use super::{check_order, commit, level_for, ChainFactory, Descent, VersionChain};
use crate::errors::IndexResult;
use crate::mvcc::Version;
use crate::node::{ChainMeta, Namespace, NodeHeader, NodeRef, NodeStore};

#[derive(Debug, Clone)]
pub struct LadderChain {
    namespace: Namespace,
    meta: ChainMeta,
}

impl LadderChain {
    /// Earliest node whose version is ≥ `at`, `None` if the head is older.
    ///
    /// The plain walk steps through predecessors one at a time. With
    /// `laddered` set it jumps along the ladder whenever the ladder target
    /// still qualifies; every node jumped over lies between the two and
    /// qualifies too, so both walks settle on the same node.
    pub fn first_greater_or_equal<P, N>(
        &self,
        store: &N,
        at: Version,
        laddered: bool,
    ) -> IndexResult<Descent>
    where
        N: NodeStore<P> + ?Sized,
    {
        let head = match self.meta.head {
            Some(head) if head >= at => head,
            _ => return Ok(Descent::not_found(0)),
        };

        let mut current = self.resolve(store, head)?;
        let mut hops = 1;
        loop {
            let next = match (current.ladder, current.predecessor) {
                (Some(ladder), _) if laddered && ladder >= at => ladder,
                (_, Some(predecessor)) if predecessor >= at => predecessor,
                _ => {
                    return Ok(Descent {
                        found: Some(current),
                        hops,
                    })
                }
            };
            current = self.resolve(store, next)?;
            hops += 1;
        }
    }

    fn resolve<P, N>(&self, store: &N, version: Version) -> IndexResult<NodeHeader>
    where
        N: NodeStore<P> + ?Sized,
    {
        store.resolve(&NodeRef::new(self.namespace.clone(), version))
    }
}

impl VersionChain for LadderChain {
    fn from_meta(namespace: Namespace, meta: ChainMeta) -> Self {
        Self { namespace, meta }
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn meta(&self) -> &ChainMeta {
        &self.meta
    }

    fn append<P, N>(&mut self, store: &mut N, version: Version, payload: P) -> IndexResult<NodeRef>
    where
        N: NodeStore<P> + ?Sized,
    {
        check_order(&self.meta, &self.namespace, version)?;

        let count = self.meta.append_count + 1;
        let level = level_for(count);
        let header = NodeHeader {
            version,
            predecessor: self.meta.head,
            ladder: self.meta.level_tails.get(level as usize).copied(),
            level,
            bridge: None,
        };

        let mut level_tails = self.meta.level_tails.clone();
        for l in 0..=level as usize {
            match level_tails.get_mut(l) {
                Some(tail) => *tail = version,
                None => level_tails.push(version),
            }
        }
        let next = ChainMeta {
            head: Some(version),
            append_count: count,
            level_tails,
        };

        let node = commit(store, &self.namespace, header, payload, &next)?;
        self.meta = next;
        Ok(node)
    }

    fn descend<P, N>(&self, store: &N, start: Option<Version>, at: Version) -> IndexResult<Descent>
    where
        N: NodeStore<P> + ?Sized,
    {
        let mut next = start.or(self.meta.head);
        let mut hops = 0;

        while let Some(version) = next {
            let header = self.resolve(store, version)?;
            hops += 1;
            if header.version <= at {
                return Ok(Descent {
                    found: Some(header),
                    hops,
                });
            }
            next = match header.ladder {
                Some(ladder) if ladder > at => Some(ladder),
                _ => header.predecessor,
            };
        }
        Ok(Descent::not_found(hops))
    }
}

/// Factory for `LadderChain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LadderFactory;

impl ChainFactory for LadderFactory {
    type Chain = LadderChain;

    fn name(&self) -> &'static str {
        "ladder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ArenaNodeStore;

    fn chain_of(n: u64) -> (LadderChain, ArenaNodeStore<u64>) {
        let mut store = ArenaNodeStore::new();
        let mut chain = LadderFactory.create(Namespace::new("FSL", "k"));
        for v in 1..=n {
            chain.append(&mut store, Version::new(v), v).unwrap();
        }
        (chain, store)
    }

    fn header(chain: &LadderChain, store: &ArenaNodeStore<u64>, v: u64) -> NodeHeader {
        store
            .resolve(&NodeRef::new(chain.namespace().clone(), Version::new(v)))
            .unwrap()
    }

    #[test]
    fn test_levels_and_ladders() {
        let (chain, store) = chain_of(16);

        let levels: Vec<u32> = (1..=16).map(|v| header(&chain, &store, v).level).collect();
        assert_eq!(levels, vec![0, 1, 0, 2, 0, 1, 0, 3, 0, 1, 0, 2, 0, 1, 0, 4]);

        // A level-L node skips 2^L appends back.
        assert_eq!(header(&chain, &store, 1).ladder, None);
        assert_eq!(header(&chain, &store, 2).ladder, None);
        assert_eq!(header(&chain, &store, 3).ladder, Some(Version::new(2)));
        assert_eq!(header(&chain, &store, 6).ladder, Some(Version::new(4)));
        assert_eq!(header(&chain, &store, 12).ladder, Some(Version::new(8)));
        assert_eq!(header(&chain, &store, 16).ladder, None);
        assert_eq!(chain.meta().level_tails.len(), 5);
    }

    #[test]
    fn test_find_visible_every_timestamp() {
        let (chain, store) = chain_of(300);
        assert_eq!(chain.find_visible(&store, Version::new(0)).unwrap(), None);
        for t in 1..=310u64 {
            let expected = t.min(300);
            assert_eq!(chain.find_visible(&store, Version::new(t)).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_sparse_versions() {
        let mut store = ArenaNodeStore::new();
        let mut chain = LadderFactory.create(Namespace::new("FSL", "k"));
        for v in (10..=1000).step_by(10) {
            chain.append(&mut store, Version::new(v), v).unwrap();
        }
        assert_eq!(chain.find_visible(&store, Version::new(9)).unwrap(), None);
        assert_eq!(chain.find_visible(&store, Version::new(15)).unwrap(), Some(10));
        assert_eq!(chain.find_visible(&store, Version::new(555)).unwrap(), Some(550));
        assert_eq!(chain.find_visible(&store, Version::new(1000)).unwrap(), Some(1000));
    }

    #[test]
    fn test_hops_stay_logarithmic() {
        let n = 4096;
        let (chain, store) = chain_of(n);
        let b = 64 - n.leading_zeros() as u64;
        for t in 0..=n {
            let descent = chain.find_visible_ref(&store, Version::new(t)).unwrap();
            assert!(descent.hops <= b * (b + 1) / 2, "t={} hops={}", t, descent.hops);
        }
    }

    #[test]
    fn test_descend_from_start() {
        let (chain, store) = chain_of(64);
        let descent = chain
            .descend(&store, Some(Version::new(40)), Version::new(33))
            .unwrap();
        assert_eq!(descent.found.unwrap().version, Version::new(33));
    }

    #[test]
    fn test_first_greater_or_equal_walks_agree() {
        for n in [0u64, 1, 2, 3, 7, 8, 9, 100, 257] {
            let (chain, store) = chain_of(n);
            for t in 0..=n + 2 {
                let plain = chain
                    .first_greater_or_equal(&store, Version::new(t), false)
                    .unwrap();
                let laddered = chain
                    .first_greater_or_equal(&store, Version::new(t), true)
                    .unwrap();
                let expected = if n == 0 || t > n {
                    None
                } else {
                    Some(Version::new(t.max(1)))
                };
                assert_eq!(plain.found.as_ref().map(|h| h.version), expected);
                assert_eq!(laddered.found.map(|h| h.version), expected);
                assert!(laddered.hops <= plain.hops);
            }
        }
    }

    #[test]
    fn test_first_greater_or_equal_plain_is_linear() {
        let (chain, store) = chain_of(100);
        let plain = chain
            .first_greater_or_equal(&store, Version::new(1), false)
            .unwrap();
        assert_eq!(plain.hops, 100);
    }
}
