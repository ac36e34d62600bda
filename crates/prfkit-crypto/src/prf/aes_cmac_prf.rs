//! AES-CMAC-PRF: truncated AES-256-CMAC

use std::fmt;

use aes::Aes256;
use cmac::{Cmac, Mac, digest::KeyInit};
use zeroize::Zeroize;

use super::{Prf, PrfError, check_output_length};

/// AES-256 key size in bytes.
pub const AES_CMAC_KEY_SIZE: usize = 32;

/// CMAC tag size (the AES block size) in bytes.
pub const AES_CMAC_MAX_OUTPUT: usize = 16;

/// PRF computing the first `n` bytes of `AES-256-CMAC(key, input)`.
pub struct AesCmacPrf {
    key: [u8; AES_CMAC_KEY_SIZE],
}

impl AesCmacPrf {
    /// Create an AES-CMAC-PRF from a 32-byte key.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` if `key` is not exactly 32 bytes
    pub fn new(key: &[u8]) -> Result<Self, PrfError> {
        let key: [u8; AES_CMAC_KEY_SIZE] = key.try_into().map_err(|_| {
            PrfError::InvalidKeyLength { expected: AES_CMAC_KEY_SIZE, actual: key.len() }
        })?;
        Ok(Self { key })
    }
}

impl Prf for AesCmacPrf {
    fn compute(&self, input: &[u8], output_length: usize) -> Result<Vec<u8>, PrfError> {
        check_output_length(output_length, AES_CMAC_MAX_OUTPUT)?;

        let Ok(mut mac) = <Cmac<Aes256> as KeyInit>::new_from_slice(&self.key) else {
            unreachable!("key length is checked at construction");
        };
        mac.update(input);

        let mut tag = mac.finalize().into_bytes().to_vec();
        tag.truncate(output_length);
        Ok(tag)
    }

    fn max_output_length(&self) -> usize {
        AES_CMAC_MAX_OUTPUT
    }
}

impl fmt::Debug for AesCmacPrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCmacPrf").finish_non_exhaustive()
    }
}

impl Drop for AesCmacPrf {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
