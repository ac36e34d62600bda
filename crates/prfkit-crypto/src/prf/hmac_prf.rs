//! HMAC-PRF: truncated HMAC over the SHA-2 family

use std::fmt;

use hmac::{Hmac, Mac, digest::KeyInit};
use sha2::{Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroize;

use super::{HashFunction, Prf, PrfError, check_output_length};

/// PRF computing the first `n` bytes of `HMAC(key, input)`.
///
/// The maximum output is the digest size of the chosen hash. There is no
/// expansion step: asking for more than one tag is an error.
pub struct HmacPrf {
    hash: HashFunction,
    key: Vec<u8>,
}

impl HmacPrf {
    /// Create an HMAC-PRF over `hash` keyed with `key`.
    ///
    /// HMAC accepts keys of any length. Minimum key sizes are enforced by the
    /// key manager, not here.
    pub fn new(hash: HashFunction, key: &[u8]) -> Self {
        Self { hash, key: key.to_vec() }
    }

    /// Hash function underlying this PRF.
    pub fn hash(&self) -> HashFunction {
        self.hash
    }
}

impl Prf for HmacPrf {
    fn compute(&self, input: &[u8], output_length: usize) -> Result<Vec<u8>, PrfError> {
        check_output_length(output_length, self.max_output_length())?;

        let mut tag = match self.hash {
            HashFunction::Sha224 => hmac_tag::<Hmac<Sha224>>(&self.key, input),
            HashFunction::Sha256 => hmac_tag::<Hmac<Sha256>>(&self.key, input),
            HashFunction::Sha384 => hmac_tag::<Hmac<Sha384>>(&self.key, input),
            HashFunction::Sha512 => hmac_tag::<Hmac<Sha512>>(&self.key, input),
        };
        tag.truncate(output_length);
        Ok(tag)
    }

    fn max_output_length(&self) -> usize {
        self.hash.output_size()
    }
}

/// Full-length HMAC tag.
fn hmac_tag<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Vec<u8> {
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(key) else {
        unreachable!("HMAC accepts any key size");
    };
    mac.update(input);
    mac.finalize().into_bytes().to_vec()
}

impl fmt::Debug for HmacPrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacPrf").field("hash", &self.hash).finish_non_exhaustive()
    }
}

impl Drop for HmacPrf {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231, test case 1
    const RFC4231_KEY: [u8; 20] = [0x0b; 20];
    const RFC4231_DATA: &[u8] = b"Hi There";

    #[test]
    fn hmac_sha256_matches_rfc4231() {
        let prf = HmacPrf::new(HashFunction::Sha256, &RFC4231_KEY);
        let output = prf.compute(RFC4231_DATA, 32).unwrap();
        assert_eq!(
            hex::encode(output),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn hmac_sha512_matches_rfc4231() {
        let prf = HmacPrf::new(HashFunction::Sha512, &RFC4231_KEY);
        let output = prf.compute(RFC4231_DATA, 64).unwrap();
        assert_eq!(
            hex::encode(output),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn truncated_output_is_prefix_of_full_tag() {
        let prf = HmacPrf::new(HashFunction::Sha256, &RFC4231_KEY);
        let full = prf.compute(RFC4231_DATA, 32).unwrap();
        let short = prf.compute(RFC4231_DATA, 16).unwrap();

        assert_eq!(short.len(), 16);
        assert_eq!(short, full[..16]);
    }

    #[test]
    fn rejects_output_beyond_digest_size() {
        for hash in [
            HashFunction::Sha224,
            HashFunction::Sha256,
            HashFunction::Sha384,
            HashFunction::Sha512,
        ] {
            let prf = HmacPrf::new(hash, &[0x11; 32]);
            let max = hash.output_size();

            assert_eq!(prf.max_output_length(), max);
            assert!(prf.compute(b"msg", max).is_ok());
            assert_eq!(
                prf.compute(b"msg", max + 1),
                Err(PrfError::OutputTooLong { requested: max + 1, max })
            );
        }
    }

    #[test]
    fn zero_length_output_is_empty() {
        let prf = HmacPrf::new(HashFunction::Sha256, &[0x11; 32]);
        assert!(prf.compute(b"msg", 0).unwrap().is_empty());
    }

    #[test]
    fn debug_does_not_print_key() {
        let prf = HmacPrf::new(HashFunction::Sha384, &[0xEE; 32]);
        assert_eq!(format!("{prf:?}"), "HmacPrf { hash: Sha384, .. }");
    }
}
