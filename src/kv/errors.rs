//! Key-value adapter error types
//!
//! Error codes:
//! - CHRONO_STORE_IO_ERROR (ERROR severity)
//! - CHRONO_STORE_WRITE_FAILED (ERROR severity)
//! - CHRONO_STORE_READ_FAILED (ERROR severity)
//! - CHRONO_STORE_CORRUPTION (FATAL severity)
//!
//! A genuine miss is never an error: `get` returns `Ok(None)`.

use std::fmt;
use std::io;

use crate::errors::Severity;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvErrorCode {
    /// Disk I/O failure
    StoreIoError,
    /// Put failed
    StoreWriteFailed,
    /// Get failed
    StoreReadFailed,
    /// Record length or checksum failure
    StoreCorruption,
}

impl KvErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            KvErrorCode::StoreIoError => "CHRONO_STORE_IO_ERROR",
            KvErrorCode::StoreWriteFailed => "CHRONO_STORE_WRITE_FAILED",
            KvErrorCode::StoreReadFailed => "CHRONO_STORE_READ_FAILED",
            KvErrorCode::StoreCorruption => "CHRONO_STORE_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            KvErrorCode::StoreIoError => Severity::Error,
            KvErrorCode::StoreWriteFailed => Severity::Error,
            KvErrorCode::StoreReadFailed => Severity::Error,
            KvErrorCode::StoreCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for KvErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with full context
#[derive(Debug)]
pub struct KvError {
    /// Error code
    code: KvErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl KvError {
    /// Create a new store I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: KvErrorCode::StoreIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: KvErrorCode::StoreWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: KvErrorCode::StoreReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a corruption error (FATAL)
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: KvErrorCode::StoreCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: KvErrorCode::StoreCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> KvErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for KvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type KvResult<T> = Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(KvErrorCode::StoreIoError.code(), "CHRONO_STORE_IO_ERROR");
        assert_eq!(KvErrorCode::StoreWriteFailed.code(), "CHRONO_STORE_WRITE_FAILED");
        assert_eq!(KvErrorCode::StoreReadFailed.code(), "CHRONO_STORE_READ_FAILED");
        assert_eq!(KvErrorCode::StoreCorruption.code(), "CHRONO_STORE_CORRUPTION");
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = KvError::corruption("checksum mismatch");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_write_failed_not_fatal() {
        let err = KvError::write_failed("disk full", io::Error::new(io::ErrorKind::Other, "full"));
        assert!(!err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_display_contains_offset() {
        let err = KvError::corruption_at_offset(1024, "checksum mismatch");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("CHRONO_STORE_CORRUPTION"));
        assert!(display.contains("byte_offset: 1024"));
    }
}
