//! Version chains
//!
//! A chain is the append-only history of one key. It holds only its
//! metadata (head, append count, per-level tails); nodes live in the
//! `NodeStore` passed to every operation.
//!
//! Two strategies share the `VersionChain` contract:
//! - `LinearChain` walks predecessor links, O(chain length)
//! - `LadderChain` adds deterministic shortcut pointers, O(log² n) worst case
//!
//! Both require strictly increasing versions on append.

mod ladder;
mod linear;

use crate::errors::{IndexError, IndexResult};
use crate::mvcc::Version;
use crate::node::{ChainMeta, Namespace, NodeHeader, NodeRef, NodeStore, VersionNode};

pub use ladder::{LadderChain, LadderFactory};
pub use linear::{LinearChain, LinearFactory};

/// Outcome of one chain traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    /// The node the walk settled on, if any
    pub found: Option<NodeHeader>,
    /// Nodes resolved on the way, the found one included
    pub hops: u64,
}

impl Descent {
    fn not_found(hops: u64) -> Self {
        Self { found: None, hops }
    }
}

/// Level of the node appended as the `count`-th (1-based) entry of a chain.
#[inline]
pub fn level_for(count: u64) -> u32 {
    count.trailing_zeros()
}

/// Append/lookup contract shared by every chain strategy.
pub trait VersionChain {
    /// Chain over `namespace` in the state described by `meta`.
    fn from_meta(namespace: Namespace, meta: ChainMeta) -> Self
    where
        Self: Sized;

    fn namespace(&self) -> &Namespace;

    fn meta(&self) -> &ChainMeta;

    /// Append `payload` at `version`, writing the node before the metadata.
    fn append<P, N>(&mut self, store: &mut N, version: Version, payload: P) -> IndexResult<NodeRef>
    where
        N: NodeStore<P> + ?Sized;

    /// Walk toward older nodes from `start` (the head when `None`) until a
    /// node with version ≤ `at` is reached.
    fn descend<P, N>(&self, store: &N, start: Option<Version>, at: Version) -> IndexResult<Descent>
    where
        N: NodeStore<P> + ?Sized;

    fn head(&self) -> Option<NodeRef> {
        self.meta()
            .head
            .map(|v| NodeRef::new(self.namespace().clone(), v))
    }

    fn len(&self) -> u64 {
        self.meta().append_count
    }

    fn is_empty(&self) -> bool {
        self.meta().head.is_none()
    }

    /// Newest node with version ≤ `at`.
    fn find_visible_ref<P, N>(&self, store: &N, at: Version) -> IndexResult<Descent>
    where
        N: NodeStore<P> + ?Sized,
    {
        self.descend::<P, N>(store, None, at)
    }

    /// Payload of the newest node with version ≤ `at`.
    fn find_visible<P, N>(&self, store: &N, at: Version) -> IndexResult<Option<P>>
    where
        N: NodeStore<P> + ?Sized,
    {
        let descent = self.find_visible_ref::<P, N>(store, at)?;
        match descent.found {
            Some(header) => {
                let node = NodeRef::new(self.namespace().clone(), header.version);
                store.payload(&node).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Builds chains of one strategy for an index.
pub trait ChainFactory {
    type Chain: VersionChain;

    /// Strategy name as used in configuration.
    fn name(&self) -> &'static str;

    /// Empty chain for a key's first append.
    fn create(&self, namespace: Namespace) -> Self::Chain {
        Self::Chain::from_meta(namespace, ChainMeta::default())
    }

    /// Chain reopened from persisted metadata.
    fn restore(&self, namespace: Namespace, meta: ChainMeta) -> IndexResult<Self::Chain> {
        validate_meta(&namespace, &meta)?;
        Ok(Self::Chain::from_meta(namespace, meta))
    }
}

/// Reject metadata that cannot describe a real chain.
fn validate_meta(namespace: &Namespace, meta: &ChainMeta) -> IndexResult<()> {
    let reason = if meta.head.is_some() != (meta.append_count > 0) {
        Some("head and append_count disagree")
    } else if meta.level_tails.len() > 64 {
        Some("more than 64 levels")
    } else if meta
        .level_tails
        .iter()
        .any(|tail| Some(*tail) > meta.head)
    {
        Some("level tail newer than head")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(IndexError::corrupt_record(namespace.meta_key(), reason)),
        None => Ok(()),
    }
}

fn check_order(meta: &ChainMeta, namespace: &Namespace, version: Version) -> IndexResult<()> {
    match meta.head {
        Some(head) if version <= head => Err(IndexError::IllegalAppendOrder {
            namespace: namespace.to_string(),
            attempted: version,
            head,
        }),
        _ => Ok(()),
    }
}

/// Write `header`'s node, then `next` as the chain metadata.
fn commit<P, N>(
    store: &mut N,
    namespace: &Namespace,
    header: NodeHeader,
    payload: P,
    next: &ChainMeta,
) -> IndexResult<NodeRef>
where
    N: NodeStore<P> + ?Sized,
{
    let node = store.allocate(namespace, VersionNode { header, payload })?;
    store.store_meta(namespace, next)?;
    Ok(node)
}
