//! # Codec Errors
//!
//! Error types for payload serialization.

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Payload encode/decode failures
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Payload could not be turned into text
    #[error("[FATAL] CHRONO_CODEC_ENCODE: failed to encode payload: {0}")]
    Encode(String),

    /// Stored text is not a valid payload
    #[error("[FATAL] CHRONO_CODEC_DECODE: failed to decode payload: {0}")]
    Decode(String),
}

impl CodecError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Encode(_) => "CHRONO_CODEC_ENCODE",
            CodecError::Decode(_) => "CHRONO_CODEC_DECODE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CodecError::Encode("x".into()).code(), "CHRONO_CODEC_ENCODE");
        assert_eq!(CodecError::Decode("x".into()).code(), "CHRONO_CODEC_DECODE");
    }

    #[test]
    fn test_display() {
        let err = CodecError::Decode("expected value at line 1".into());
        assert!(err.to_string().contains("CHRONO_CODEC_DECODE"));
        assert!(err.to_string().contains("line 1"));
    }
}
