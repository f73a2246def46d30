//! External key-value store adapters
//!
//! The index consumes a store exclusively through the two-operation
//! `KvStore` contract:
//! - `get` returns `Ok(None)` on a genuine miss, never an error
//! - `put` overwrites, and is durable-or-erroring
//!
//! Realizations:
//! - `MemoryKvStore` - in-process map
//! - `FileKvStore` - append-only checksummed record log with fsync per put
//! - `Namespaced` - key-prefixing wrapper over any store

mod checksum;
mod errors;
mod file;
mod memory;
mod namespaced;
mod reader;
mod record;

pub use errors::{KvError, KvErrorCode, KvResult};
pub use file::{FileKvStore, STORE_FILE_NAME};
pub use memory::MemoryKvStore;
pub use namespaced::Namespaced;

/// Narrow text key-value interface the index is backed by.
pub trait KvStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str) -> KvResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).put(key, value)
    }
}
