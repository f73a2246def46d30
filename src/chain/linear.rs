//! Plain chronological chain
//!
//! Each node points at its predecessor only. Lookups walk the history one
//! node at a time from the head.

use super::{check_order, commit, ChainFactory, Descent, VersionChain};
use crate::errors::IndexResult;
use crate::mvcc::Version;
use crate::node::{ChainMeta, Namespace, NodeHeader, NodeRef, NodeStore};

#[derive(Debug, Clone)]
pub struct LinearChain {
    namespace: Namespace,
    meta: ChainMeta,
}

impl VersionChain for LinearChain {
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

        let header = NodeHeader {
            version,
            predecessor: self.meta.head,
            ladder: None,
            level: 0,
            bridge: None,
        };
        let next = ChainMeta {
            head: Some(version),
            append_count: self.meta.append_count + 1,
            level_tails: Vec::new(),
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
            let header = store.resolve(&NodeRef::new(self.namespace.clone(), version))?;
            hops += 1;
            if header.version <= at {
                return Ok(Descent {
                    found: Some(header),
                    hops,
                });
            }
            next = header.predecessor;
        }
        Ok(Descent::not_found(hops))
    }
}

/// Factory for `LinearChain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearFactory;

impl ChainFactory for LinearFactory {
    type Chain = LinearChain;

    fn name(&self) -> &'static str {
        "linear"
    }
}
