//! MVCC Domain Types
//!
//! This module provides:
//! - `Version` - Global logical timestamp, totally ordered across keys
//! - `VersionClock` - Index-owned source of strictly increasing versions

mod clock;
mod version;

pub use clock::VersionClock;
pub use version::Version;
