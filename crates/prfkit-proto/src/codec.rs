//! CBOR codec shared by every wire record.
//!
//! # Security
//!
//! - Size Validation First: [`decode`] rejects oversized input BEFORE the
//!   CBOR parser sees it, so a hostile keyset cannot make the parser allocate
//!   or recurse proportionally to an unbounded input.
//! - Exact Consumption: the input must contain exactly one record. Bytes
//!   appended after it are rejected rather than ignored. Decoding is not
//!   canonical: field order and integer width may vary between encodings
//!   of the same record.

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{ProtocolError, Result};

/// Largest encoded record accepted by [`decode`] (1 MiB).
pub const MAX_ENCODED_SIZE: usize = 1 << 20;

/// Encode a record to CBOR.
///
/// # Errors
///
/// - `ProtocolError::CborEncode` if serialization fails
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;
    Ok(buf)
}

/// Decode a record from CBOR, accepting at most [`MAX_ENCODED_SIZE`] bytes.
///
/// # Errors
///
/// - `ProtocolError::TooLarge` if `bytes` exceeds [`MAX_ENCODED_SIZE`]
/// - `ProtocolError::CborDecode` if the bytes are not a valid record
/// - `ProtocolError::TrailingData` if bytes remain after the record
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    decode_with_limit(bytes, MAX_ENCODED_SIZE)
}

/// Decode a record from CBOR with a caller-chosen size limit.
///
/// # Errors
///
/// Same as [`decode`], with `max_size` in place of [`MAX_ENCODED_SIZE`].
pub fn decode_with_limit<T: DeserializeOwned>(bytes: &[u8], max_size: usize) -> Result<T> {
    if bytes.len() > max_size {
        return Err(ProtocolError::TooLarge { size: bytes.len(), max: max_size });
    }

    let mut reader = bytes;
    let value = ciborium::de::from_reader(&mut reader)
        .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;

    if !reader.is_empty() {
        return Err(ProtocolError::TrailingData { count: reader.len() });
    }

    Ok(value)
}
