//! Node storage
//!
//! Every node lives in exactly one owner: an in-process arena or an external
//! key-value store. Links between nodes are never embedded references; they
//! are versions (inside one chain) or absolute `NodeRef`s (across chains),
//! resolved through the `NodeStore` on every hop.
//!
//! A node's address is derived from its chain's namespace and its version,
//! so allocation needs no identifier generator.

mod arena;
mod backed;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{IndexError, IndexResult};
use crate::mvcc::Version;

pub use arena::ArenaNodeStore;
pub use backed::BackedNodeStore;

/// Address space of one key's chain: `<prefix>:<key>:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(Arc<str>);

impl Namespace {
    /// Namespace for `key` under the index prefix.
    pub fn new(prefix: &str, key: &str) -> Self {
        Self(Arc::from(format!("{}:{}:", prefix, key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key of the node at `version`.
    pub fn node_key(&self, version: Version) -> String {
        format!("{}{}", self.0, version)
    }

    /// Store key of the chain metadata record.
    pub fn meta_key(&self) -> String {
        format!("{}__meta__", self.0)
    }

    /// Whether `node` lives in this namespace.
    pub fn contains(&self, node: &NodeRef) -> bool {
        node.namespace == *self
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute address of a node: its chain's namespace plus its version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub namespace: Namespace,
    pub version: Version,
}

impl NodeRef {
    pub fn new(namespace: Namespace, version: Version) -> Self {
        Self { namespace, version }
    }

    /// Textual form, identical to the node's store key.
    pub fn to_key(&self) -> String {
        self.namespace.node_key(self.version)
    }

    /// Parse a textual reference produced by `to_key`.
    pub fn parse(key: &str) -> IndexResult<Self> {
        let (namespace, version) = key
            .rsplit_once(':')
            .ok_or_else(|| IndexError::corrupt_record(key, "reference has no namespace"))?;
        let version: u64 = version
            .parse()
            .map_err(|e| IndexError::corrupt_record(key, format!("bad version: {}", e)))?;
        Ok(Self {
            namespace: Namespace(Arc::from(format!("{}:", namespace))),
            version: Version::new(version),
        })
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.version)
    }
}

/// A node's link structure, everything a traversal hop needs.
///
/// Predecessor and ladder targets live in the same chain, so a version is a
/// complete address for them; their versions can be compared against a
/// query timestamp without resolving the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHeader {
    pub version: Version,
    pub predecessor: Option<Version>,
    pub ladder: Option<Version>,
    pub level: u32,
    pub bridge: Option<NodeRef>,
}

/// A node as handed to `NodeStore::allocate`.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionNode<P> {
    pub header: NodeHeader,
    pub payload: P,
}

/// Persisted chain state, rewritten wholesale on every append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMeta {
    pub head: Option<Version>,
    pub append_count: u64,
    /// `level_tails[l]` is the newest node that reached level `l`.
    pub level_tails: Vec<Version>,
}

/// Owner of every node and chain metadata record of an index.
///
/// `resolve` on an address that was never allocated is `MissingNode`, never
/// a default. Payloads are fetched separately so traversals do not decode
/// payloads they only pass through.
pub trait NodeStore<P> {
    /// Link structure of the node at `node`.
    fn resolve(&self, node: &NodeRef) -> IndexResult<NodeHeader>;

    /// Payload of the node at `node`.
    fn payload(&self, node: &NodeRef) -> IndexResult<P>;

    /// Store a new node in `namespace`; its address follows from its version.
    fn allocate(&mut self, namespace: &Namespace, node: VersionNode<P>) -> IndexResult<NodeRef>;

    /// Set the bridge of `node` unless it already has one.
    ///
    /// Returns whether the bridge was written.
    fn set_bridge(&mut self, node: &NodeRef, target: &NodeRef) -> IndexResult<bool>;

    /// Chain metadata, `None` for a chain that was never written.
    fn load_meta(&self, namespace: &Namespace) -> IndexResult<Option<ChainMeta>>;

    fn store_meta(&mut self, namespace: &Namespace, meta: &ChainMeta) -> IndexResult<()>;

    /// Domain keys (text form) of every chain under `prefix`, in
    /// registration order. Empty for an index that was never written.
    fn load_directory(&self, prefix: &str) -> IndexResult<Vec<String>>;

    /// Record `key` as directory entry `position` under `prefix`.
    ///
    /// Earlier entries are never rewritten.
    fn append_directory(&mut self, prefix: &str, position: usize, key: &str) -> IndexResult<()>;
}

/// Store key of the directory entry count of the index under `prefix`.
pub fn directory_key(prefix: &str) -> String {
    format!("{}:__keys__", prefix)
}

/// Store key of directory entry `position` under `prefix`.
///
/// Carries a single `:`, so it never collides with a node or metadata key.
pub fn directory_entry_key(prefix: &str, position: usize) -> String {
    format!("{}:__keys__#{}", prefix, position)
}
