//! CLI-specific error types
//!
//! Index failures keep the index's own code; everything else is
//! `CHRONO_CLI_*`.

use std::fmt;
use std::io;

use crate::errors::IndexError;
use crate::kv::KvError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Malformed dataset row
    DatasetError,
    /// Dataset version column disagrees with the assigned version
    VersionMismatch,
    /// Failure reported by the index, carrying its code
    Index(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHRONO_CLI_CONFIG_ERROR",
            Self::IoError => "CHRONO_CLI_IO_ERROR",
            Self::DatasetError => "CHRONO_CLI_DATASET_ERROR",
            Self::VersionMismatch => "CHRONO_CLI_VERSION_MISMATCH",
            Self::Index(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    /// Set when the underlying index error is FATAL
    fatal: bool,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fatal: false,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed row at 1-based `line`
    pub fn dataset_error(line: usize, msg: impl fmt::Display) -> Self {
        Self::new(CliErrorCode::DatasetError, format!("line {}: {}", line, msg))
    }

    pub fn version_mismatch(line: usize, expected: u64, assigned: u64) -> Self {
        Self::new(
            CliErrorCode::VersionMismatch,
            format!(
                "line {}: dataset says version {}, index assigned {}",
                line, expected, assigned
            ),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failure indicates damaged stored data
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<IndexError> for CliError {
    fn from(e: IndexError) -> Self {
        let mut err = Self::new(CliErrorCode::Index(e.code()), e.to_string());
        err.fatal = e.is_fatal();
        err
    }
}

impl From<KvError> for CliError {
    fn from(e: KvError) -> Self {
        IndexError::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvcc::Version;

    #[test]
    fn test_index_error_keeps_code() {
        let err: CliError = IndexError::IllegalAppendOrder {
            namespace: "VW:a:".into(),
            attempted: Version::new(1),
            head: Version::new(2),
        }
        .into();
        assert_eq!(err.code_str(), "CHRONO_ILLEGAL_APPEND_ORDER");
    }

    #[test]
    fn test_store_error_keeps_code() {
        let err: CliError = KvError::corruption("bad checksum").into();
        assert_eq!(err.code_str(), "CHRONO_STORE_CORRUPTION");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = CliError::version_mismatch(4, 3, 5);
        assert_eq!(err.code_str(), "CHRONO_CLI_VERSION_MISMATCH");
        assert!(err.to_string().contains("line 4"));
    }
}
