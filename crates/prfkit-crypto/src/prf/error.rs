//! Error types for PRF primitives

use thiserror::Error;

use super::HashFunction;

/// Errors from PRF construction and computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrfError {
    /// Requested output exceeds what the primitive can safely produce
    #[error("output too long: requested {requested} bytes, maximum is {max}")]
    OutputTooLong {
        /// Requested output length
        requested: usize,
        /// Maximum output length of the primitive
        max: usize,
    },

    /// Key has the wrong length for the primitive
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Supplied key length
        actual: usize,
    },

    /// Primitive cannot be built on the requested hash
    #[error("{primitive} does not support {hash}")]
    UnsupportedHash {
        /// Primitive name
        primitive: &'static str,
        /// Rejected hash function
        hash: HashFunction,
    },
}
