//! The PRF capability and its three implementations.
//!
//! ```text
//! HmacPrf    : HMAC(key, input)[..n]
//! HkdfPrf    : HKDF-Expand(HKDF-Extract(salt, key), info = input, n)
//! AesCmacPrf : AES-256-CMAC(key, input)[..n]
//! ```

pub mod aes_cmac_prf;
pub mod error;
pub mod hkdf_prf;
pub mod hmac_prf;

use std::fmt;

pub use aes_cmac_prf::{AES_CMAC_KEY_SIZE, AES_CMAC_MAX_OUTPUT, AesCmacPrf};
pub use error::PrfError;
pub use hkdf_prf::HkdfPrf;
pub use hmac_prf::HmacPrf;

/// Keyed pseudo-random function.
///
/// # Invariants
///
/// - Deterministic: the same key, input and `output_length` always produce
///   the same bytes
/// - Prefix-consistent: the output for `n` is the first `n` bytes of the
///   output for any larger valid length
/// - `compute` returns exactly `output_length` bytes or an error, never a
///   shorter output
///
/// Implementations must not print key material from `Debug`.
pub trait Prf: fmt::Debug + Send + Sync {
    /// Compute `output_length` pseudo-random bytes from `input`.
    ///
    /// # Errors
    ///
    /// - `OutputTooLong` if `output_length` exceeds
    ///   [`max_output_length`](Self::max_output_length)
    fn compute(&self, input: &[u8], output_length: usize) -> Result<Vec<u8>, PrfError>;

    /// Largest `output_length` accepted by [`compute`](Self::compute).
    fn max_output_length(&self) -> usize;
}

/// Hash functions the PRF primitives can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashFunction {
    /// Digest size in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reject requests beyond `max` before any work is done.
fn check_output_length(requested: usize, max: usize) -> Result<(), PrfError> {
    if requested > max {
        return Err(PrfError::OutputTooLong { requested, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sizes_match_digest_lengths() {
        assert_eq!(HashFunction::Sha224.output_size(), 28);
        assert_eq!(HashFunction::Sha256.output_size(), 32);
        assert_eq!(HashFunction::Sha384.output_size(), 48);
        assert_eq!(HashFunction::Sha512.output_size(), 64);
    }

    #[test]
    fn check_output_length_boundary() {
        assert!(check_output_length(32, 32).is_ok());
        assert!(check_output_length(0, 32).is_ok());
        assert_eq!(
            check_output_length(33, 32),
            Err(PrfError::OutputTooLong { requested: 33, max: 32 })
        );
    }
}
