//! Error types for wire encoding and decoding.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Input exceeds the size accepted by the decoder
    #[error("encoded record too large: {size} bytes exceeds maximum {max}")]
    TooLarge {
        /// Size of the rejected input
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// Record decoded but bytes were left over after it
    #[error("trailing data: {count} bytes after record")]
    TrailingData {
        /// Number of unconsumed bytes
        count: usize,
    },

    /// CBOR serialization failed
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),
}
