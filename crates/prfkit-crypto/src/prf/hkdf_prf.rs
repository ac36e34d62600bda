//! HKDF-PRF: HKDF-Expand with the message as `info`

use std::fmt;

use hkdf::Hkdf;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use super::{HashFunction, Prf, PrfError, check_output_length};

/// HKDF-Expand may produce at most this many blocks of output.
const MAX_EXPAND_BLOCKS: usize = 255;

/// PRF computing `HKDF-Expand(HKDF-Extract(salt, key), input, n)`.
///
/// Extraction happens once, at construction, and only the pseudorandom key
/// is kept. Each computation is a single expand with the message as the
/// `info` parameter, so the output can be up to 255 digest blocks long.
pub struct HkdfPrf {
    hash: HashFunction,
    /// Extracted pseudorandom key, one digest long
    prk: Vec<u8>,
}

impl HkdfPrf {
    /// Create an HKDF-PRF over `hash` from input key material `key` and
    /// `salt` (empty for none).
    ///
    /// # Errors
    ///
    /// - `UnsupportedHash` unless `hash` is SHA-256 or SHA-512
    pub fn new(hash: HashFunction, key: &[u8], salt: &[u8]) -> Result<Self, PrfError> {
        let prk = match hash {
            HashFunction::Sha256 => {
                let (mut prk, _) = Hkdf::<Sha256>::extract(Some(salt), key);
                let bytes = prk.to_vec();
                prk.as_mut_slice().zeroize();
                bytes
            },
            HashFunction::Sha512 => {
                let (mut prk, _) = Hkdf::<Sha512>::extract(Some(salt), key);
                let bytes = prk.to_vec();
                prk.as_mut_slice().zeroize();
                bytes
            },
            HashFunction::Sha224 | HashFunction::Sha384 => {
                return Err(PrfError::UnsupportedHash { primitive: "HKDF-PRF", hash });
            },
        };

        Ok(Self { hash, prk })
    }

    /// Largest output HKDF-Expand can produce over `hash`.
    pub const fn max_output_for(hash: HashFunction) -> usize {
        MAX_EXPAND_BLOCKS * hash.output_size()
    }

    /// Hash function underlying this PRF.
    pub fn hash(&self) -> HashFunction {
        self.hash
    }
}

impl Prf for HkdfPrf {
    fn compute(&self, input: &[u8], output_length: usize) -> Result<Vec<u8>, PrfError> {
        let max = self.max_output_length();
        check_output_length(output_length, max)?;

        let mut okm = vec![0u8; output_length];
        let expanded = match self.hash {
            HashFunction::Sha256 => {
                Hkdf::<Sha256>::from_prk(&self.prk).map(|hkdf| hkdf.expand(input, &mut okm))
            },
            HashFunction::Sha512 => {
                Hkdf::<Sha512>::from_prk(&self.prk).map(|hkdf| hkdf.expand(input, &mut okm))
            },
            HashFunction::Sha224 | HashFunction::Sha384 => {
                unreachable!("HKDF-PRF is only built over SHA-256 or SHA-512")
            },
        };
        let Ok(expanded) = expanded else {
            unreachable!("PRK is one digest long");
        };
        expanded.map_err(|_| PrfError::OutputTooLong { requested: output_length, max })?;

        Ok(okm)
    }

    fn max_output_length(&self) -> usize {
        Self::max_output_for(self.hash)
    }
}

impl fmt::Debug for HkdfPrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HkdfPrf").field("hash", &self.hash).finish_non_exhaustive()
    }
}

impl Drop for HkdfPrf {
    fn drop(&mut self) {
        self.prk.zeroize();
    }
}
