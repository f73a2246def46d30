//! In-process node arena
//!
//! Nodes are owned by a `Vec`; addresses map to slots through a hash index.
//! Nothing is ever removed, so a slot index stays valid for the arena's life.

use std::collections::HashMap;

use super::{ChainMeta, Namespace, NodeHeader, NodeRef, NodeStore, VersionNode};
use crate::errors::{IndexError, IndexResult};

#[derive(Debug)]
pub struct ArenaNodeStore<P> {
    nodes: Vec<VersionNode<P>>,
    slots: HashMap<NodeRef, usize>,
    metas: HashMap<Namespace, ChainMeta>,
    directories: HashMap<String, Vec<String>>,
}

impl<P> ArenaNodeStore<P> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            slots: HashMap::new(),
            metas: HashMap::new(),
            directories: HashMap::new(),
        }
    }

    /// Number of nodes allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn slot(&self, node: &NodeRef) -> IndexResult<usize> {
        self.slots
            .get(node)
            .copied()
            .ok_or_else(|| IndexError::missing_node(node))
    }
}

impl<P> Default for ArenaNodeStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> NodeStore<P> for ArenaNodeStore<P> {
    fn resolve(&self, node: &NodeRef) -> IndexResult<NodeHeader> {
        let slot = self.slot(node)?;
        Ok(self.nodes[slot].header.clone())
    }

    fn payload(&self, node: &NodeRef) -> IndexResult<P> {
        let slot = self.slot(node)?;
        Ok(self.nodes[slot].payload.clone())
    }

    fn allocate(&mut self, namespace: &Namespace, node: VersionNode<P>) -> IndexResult<NodeRef> {
        let address = NodeRef::new(namespace.clone(), node.header.version);
        self.slots.insert(address.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(address)
    }

    fn set_bridge(&mut self, node: &NodeRef, target: &NodeRef) -> IndexResult<bool> {
        let slot = self.slot(node)?;
        let header = &mut self.nodes[slot].header;
        if header.bridge.is_some() {
            return Ok(false);
        }
        header.bridge = Some(target.clone());
        Ok(true)
    }

    fn load_meta(&self, namespace: &Namespace) -> IndexResult<Option<ChainMeta>> {
        Ok(self.metas.get(namespace).cloned())
    }

    fn store_meta(&mut self, namespace: &Namespace, meta: &ChainMeta) -> IndexResult<()> {
        self.metas.insert(namespace.clone(), meta.clone());
        Ok(())
    }

    fn load_directory(&self, prefix: &str) -> IndexResult<Vec<String>> {
        Ok(self.directories.get(prefix).cloned().unwrap_or_default())
    }

    fn append_directory(&mut self, prefix: &str, position: usize, key: &str) -> IndexResult<()> {
        let entries = self.directories.entry(prefix.to_string()).or_default();
        entries.truncate(position);
        entries.push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvcc::Version;

    fn node(version: u64, payload: &str) -> VersionNode<String> {
        VersionNode {
            header: NodeHeader {
                version: Version::new(version),
                predecessor: None,
                ladder: None,
                level: 0,
                bridge: None,
            },
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_allocate_then_resolve() {
        let mut arena = ArenaNodeStore::new();
        let ns = Namespace::new("VW", "a");
        let r = arena.allocate(&ns, node(3, "x")).unwrap();

        assert_eq!(r, NodeRef::new(ns, Version::new(3)));
        assert_eq!(arena.resolve(&r).unwrap().version, Version::new(3));
        assert_eq!(arena.payload(&r).unwrap(), "x");
    }

    #[test]
    fn test_unknown_ref_is_missing_node() {
        let arena: ArenaNodeStore<String> = ArenaNodeStore::new();
        let r = NodeRef::new(Namespace::new("VW", "a"), Version::new(1));
        let err = arena.resolve(&r).unwrap_err();
        assert_eq!(err.code(), "CHRONO_MISSING_NODE");
    }

    #[test]
    fn test_bridge_is_set_once() {
        let mut arena = ArenaNodeStore::new();
        let a = Namespace::new("VW", "a");
        let b = Namespace::new("VW", "b");
        let n = arena.allocate(&a, node(1, "a1")).unwrap();
        let m1 = arena.allocate(&b, node(2, "b2")).unwrap();
        let m2 = arena.allocate(&b, node(3, "b3")).unwrap();

        assert!(arena.set_bridge(&n, &m1).unwrap());
        assert!(!arena.set_bridge(&n, &m2).unwrap());
        assert_eq!(arena.resolve(&n).unwrap().bridge, Some(m1));
    }

    #[test]
    fn test_meta_and_directory() {
        let mut arena: ArenaNodeStore<String> = ArenaNodeStore::new();
        let ns = Namespace::new("VW", "a");
        assert_eq!(arena.load_meta(&ns).unwrap(), None);

        let meta = ChainMeta {
            head: Some(Version::new(4)),
            append_count: 2,
            level_tails: vec![Version::new(4), Version::new(4)],
        };
        arena.store_meta(&ns, &meta).unwrap();
        assert_eq!(arena.load_meta(&ns).unwrap(), Some(meta));

        arena.append_directory("VW", 0, "a").unwrap();
        arena.append_directory("VW", 1, "b").unwrap();
        assert_eq!(arena.load_directory("VW").unwrap(), vec!["a", "b"]);
        assert!(arena.load_directory("LL").unwrap().is_empty());
    }
}
