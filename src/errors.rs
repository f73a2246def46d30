//! Index error taxonomy
//!
//! Error codes:
//! - CHRONO_MISSING_NODE (FATAL) - a reference cannot be resolved
//! - CHRONO_CORRUPT_RECORD (FATAL) - a stored node or metadata record fails to decode
//! - CHRONO_ILLEGAL_APPEND_ORDER (ERROR) - append version not above the chain head
//! - CHRONO_PREFIX_MISMATCH (ERROR) - bridge points outside the expected chain
//!
//! Store and codec failures are wrapped and keep their own code and severity.
//!
//! Missing nodes and corrupt records indicate durable-store damage. They abort
//! the current query and are never retried internally. A prefix mismatch is
//! only ever raised inside hinted range scans, where it is absorbed by a
//! fallback to a full chain descent.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::kv::KvError;
use crate::mvcc::Version;

/// Severity levels shared by every error type in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the index remains usable
    Error,
    /// The affected chain or store cannot be trusted any more
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Errors raised by node stores, chains and indexes.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Dangling reference or a record that vanished from the store.
    #[error("[FATAL] CHRONO_MISSING_NODE: no node at {reference}")]
    MissingNode { reference: String },

    /// A node or metadata record exists but cannot be decoded.
    #[error("[FATAL] CHRONO_CORRUPT_RECORD: record {key} is corrupt ({reason})")]
    CorruptRecord { key: String, reason: String },

    /// Strict chains only accept versions above their current head.
    #[error(
        "[ERROR] CHRONO_ILLEGAL_APPEND_ORDER: version {attempted} is not above head {head} in {namespace}"
    )]
    IllegalAppendOrder {
        namespace: String,
        attempted: Version,
        head: Version,
    },

    /// A bridge reference does not belong to the chain it was used for.
    #[error("[ERROR] CHRONO_PREFIX_MISMATCH: expected a reference under {expected}, found {found}")]
    PrefixMismatch { expected: String, found: String },

    #[error(transparent)]
    Store(#[from] KvError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl IndexError {
    /// Create a missing node error for the given reference.
    pub fn missing_node(reference: impl fmt::Display) -> Self {
        IndexError::MissingNode {
            reference: reference.to_string(),
        }
    }

    /// Create a corrupt record error.
    pub fn corrupt_record(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        IndexError::CorruptRecord {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the string code.
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::MissingNode { .. } => "CHRONO_MISSING_NODE",
            IndexError::CorruptRecord { .. } => "CHRONO_CORRUPT_RECORD",
            IndexError::IllegalAppendOrder { .. } => "CHRONO_ILLEGAL_APPEND_ORDER",
            IndexError::PrefixMismatch { .. } => "CHRONO_PREFIX_MISMATCH",
            IndexError::Store(e) => e.code().code(),
            IndexError::Codec(e) => e.code(),
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> Severity {
        match self {
            IndexError::MissingNode { .. } | IndexError::CorruptRecord { .. } => Severity::Fatal,
            IndexError::IllegalAppendOrder { .. } | IndexError::PrefixMismatch { .. } => {
                Severity::Error
            }
            IndexError::Store(e) => e.severity(),
            IndexError::Codec(_) => Severity::Fatal,
        }
    }

    /// Returns whether the error indicates durable-store damage.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(IndexError::missing_node("VW:a:1").code(), "CHRONO_MISSING_NODE");
        assert_eq!(
            IndexError::corrupt_record("VW:a:1", "eof").code(),
            "CHRONO_CORRUPT_RECORD"
        );
        let err = IndexError::PrefixMismatch {
            expected: "VW:b:".into(),
            found: "VW:c:4".into(),
        };
        assert_eq!(err.code(), "CHRONO_PREFIX_MISMATCH");
    }

    #[test]
    fn test_corruption_is_fatal() {
        assert!(IndexError::missing_node("x").is_fatal());
        assert!(IndexError::corrupt_record("x", "bad json").is_fatal());
    }

    #[test]
    fn test_order_violation_not_fatal() {
        let err = IndexError::IllegalAppendOrder {
            namespace: "VW:k:".into(),
            attempted: Version::new(3),
            head: Version::new(5),
        };
        assert!(!err.is_fatal());
        let display = err.to_string();
        assert!(display.contains("CHRONO_ILLEGAL_APPEND_ORDER"));
        assert!(display.contains("version 3"));
        assert!(display.contains("head 5"));
    }

    #[test]
    fn test_store_error_keeps_its_code() {
        let err: IndexError = KvError::corruption_at_offset(64, "checksum mismatch").into();
        assert_eq!(err.code(), "CHRONO_STORE_CORRUPTION");
        assert!(err.is_fatal());
    }
}
