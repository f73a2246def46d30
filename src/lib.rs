//! chronoweave - a deterministic temporal (multi-version) index over keyed data
//!
//! Every write to a key is kept with the global version it was assigned;
//! queries ask what was visible at a version, for one key or a sorted key
//! range.
//!
//! - `mvcc` - versions and the index-wide clock
//! - `node` - version nodes and the stores that hold them
//! - `chain` - per-key version chains (linear and skip-ladder)
//! - `index` - the multi-version index over chains
//! - `weaver` - ladder index with cross-key bridges for range scans
//! - `kv`, `codec` - external key-value stores and payload serializers
//! - `observability` - structured logs and counters
//! - `cli` - command-line driver

pub mod chain;
pub mod cli;
pub mod codec;
pub mod errors;
pub mod index;
pub mod kv;
pub mod mvcc;
pub mod node;
pub mod observability;
pub mod weaver;

pub use errors::{IndexError, IndexResult};
pub use index::{KeyRange, MultiVersionIndex, TemporalIndex};
pub use mvcc::Version;
pub use weaver::{WeaverConfig, WeaverIndex};
