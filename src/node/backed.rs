//! Node store over an external key-value store
//!
//! Record layout (all JSON):
//! - node: `<namespace><version>` → `{version, payload, predecessor, ladder, level, bridge}`
//!   where `payload` is the serializer's text and `bridge` an absolute node key
//! - chain metadata: `<namespace>__meta__` → `{head, append_count, level_tails}`
//! - key directory: `<prefix>:__keys__#<n>` → `"KEY001"`, one record per key,
//!   and `<prefix>:__keys__` → entry count, written after the entry
//!
//! Every resolve is one store `get`. A missing record is `MissingNode`; a
//! record that does not decode is `CorruptRecord`. Both are logged as
//! CORRUPTION_DETECTED before being returned.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{directory_entry_key, directory_key, ChainMeta, Namespace, NodeHeader, NodeRef, NodeStore, VersionNode};
use crate::codec::Serializer;
use crate::errors::{IndexError, IndexResult};
use crate::kv::KvStore;
use crate::mvcc::Version;
use crate::observability::{log_event_with_fields, Event};

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    version: Version,
    payload: String,
    #[serde(default)]
    predecessor: Option<Version>,
    #[serde(default)]
    ladder: Option<Version>,
    #[serde(default)]
    level: u32,
    #[serde(default)]
    bridge: Option<String>,
}

pub struct BackedNodeStore<S, C, P> {
    store: S,
    codec: C,
    _payload: PhantomData<fn() -> P>,
}

impl<S: KvStore, C: Serializer<P>, P> BackedNodeStore<S, C, P> {
    pub fn new(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            _payload: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access to the backing store, e.g. to damage records in tests.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> IndexResult<Option<T>> {
        let text = match self.store.get(key)? {
            Some(text) => text,
            None => return Ok(None),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| corruption(IndexError::corrupt_record(key, e)))
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> IndexResult<()> {
        let text = serde_json::to_string(value)
            .map_err(|e| IndexError::corrupt_record(key, format!("encode failed: {}", e)))?;
        self.store.put(key, &text)?;
        Ok(())
    }

    fn read_node(&self, node: &NodeRef) -> IndexResult<NodeRecord> {
        let key = node.to_key();
        let record: NodeRecord = self
            .read_json(&key)?
            .ok_or_else(|| corruption(IndexError::missing_node(&key)))?;
        if record.version != node.version {
            return Err(corruption(IndexError::corrupt_record(
                key,
                format!("record carries version {}", record.version),
            )));
        }
        Ok(record)
    }
}

fn corruption(err: IndexError) -> IndexError {
    log_event_with_fields(
        Event::CorruptionDetected,
        &[("code", err.code()), ("reason", &err.to_string())],
    );
    err
}

impl<S: KvStore, C: Serializer<P>, P> NodeStore<P> for BackedNodeStore<S, C, P> {
    fn resolve(&self, node: &NodeRef) -> IndexResult<NodeHeader> {
        let record = self.read_node(node)?;
        let bridge = record.bridge.as_deref().map(NodeRef::parse).transpose()?;
        Ok(NodeHeader {
            version: record.version,
            predecessor: record.predecessor,
            ladder: record.ladder,
            level: record.level,
            bridge,
        })
    }

    fn payload(&self, node: &NodeRef) -> IndexResult<P> {
        let record = self.read_node(node)?;
        self.codec
            .decode(&record.payload)
            .map_err(|e| corruption(IndexError::corrupt_record(node.to_key(), e)))
    }

    fn allocate(&mut self, namespace: &Namespace, node: VersionNode<P>) -> IndexResult<NodeRef> {
        let address = NodeRef::new(namespace.clone(), node.header.version);
        let record = NodeRecord {
            version: node.header.version,
            payload: self.codec.encode(&node.payload)?,
            predecessor: node.header.predecessor,
            ladder: node.header.ladder,
            level: node.header.level,
            bridge: node.header.bridge.as_ref().map(NodeRef::to_key),
        };
        self.write_json(&address.to_key(), &record)?;
        Ok(address)
    }

    fn set_bridge(&mut self, node: &NodeRef, target: &NodeRef) -> IndexResult<bool> {
        let mut record = self.read_node(node)?;
        if record.bridge.is_some() {
            return Ok(false);
        }
        record.bridge = Some(target.to_key());
        self.write_json(&node.to_key(), &record)?;
        Ok(true)
    }

    fn load_meta(&self, namespace: &Namespace) -> IndexResult<Option<ChainMeta>> {
        self.read_json(&namespace.meta_key())
    }

    fn store_meta(&mut self, namespace: &Namespace, meta: &ChainMeta) -> IndexResult<()> {
        self.write_json(&namespace.meta_key(), meta)
    }

    fn load_directory(&self, prefix: &str) -> IndexResult<Vec<String>> {
        let count: usize = self.read_json(&directory_key(prefix))?.unwrap_or(0);
        let mut keys = Vec::new();
        for position in 0..count {
            let entry = directory_entry_key(prefix, position);
            let key: String = self.read_json(&entry)?.ok_or_else(|| {
                corruption(IndexError::corrupt_record(
                    entry.as_str(),
                    format!("directory entry missing, count is {}", count),
                ))
            })?;
            keys.push(key);
        }
        Ok(keys)
    }

    fn append_directory(&mut self, prefix: &str, position: usize, key: &str) -> IndexResult<()> {
        // Entry first: a crash in between leaves an unreferenced entry
        self.write_json(&directory_entry_key(prefix, position), &key)?;
        self.write_json(&directory_key(prefix), &(position + 1))
    }
}
