//! HMAC-PRF key manager

use std::sync::Arc;

use prfkit_crypto::{HashFunction, HmacPrf};
use prfkit_proto::{HmacPrfKey, HmacPrfKeyFormat, HmacPrfParams, KeyMaterialType};

use super::{
    KEY_VERSION, KeyManager, MAX_GENERATED_KEY_SIZE, check_version, decode_format, decode_key,
    encode_key, random_key, supported_hash,
};
use crate::{
    env::RandomSource,
    error::{KeysetError, Result},
    primitive::Primitive,
};

/// Type URL of HMAC-PRF keys.
pub const HMAC_PRF_TYPE_URL: &str = "type.googleapis.com/google.crypto.tink.HmacPrfKey";

/// Smallest accepted HMAC-PRF key, in bytes.
pub const MIN_HMAC_KEY_SIZE: usize = 16;

const SUPPORTED_HASHES: [HashFunction; 4] =
    [HashFunction::Sha224, HashFunction::Sha256, HashFunction::Sha384, HashFunction::Sha512];

/// Key manager for [`HmacPrf`] keys.
///
/// Keys must be at least 16 bytes and name a SHA-2 hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacPrfKeyManager;

impl HmacPrfKeyManager {
    fn check_params(params: &HmacPrfParams) -> std::result::Result<HashFunction, String> {
        supported_hash(params.hash, &SUPPORTED_HASHES)
    }

    fn check_key_size(size: usize) -> std::result::Result<(), String> {
        if size < MIN_HMAC_KEY_SIZE {
            return Err(format!("key size {size} below minimum {MIN_HMAC_KEY_SIZE}"));
        }
        Ok(())
    }

    fn parse_format(serialized_format: &[u8]) -> Result<HmacPrfKeyFormat> {
        let format: HmacPrfKeyFormat = decode_format(HMAC_PRF_TYPE_URL, serialized_format)?;
        let size = format.key_size as usize;

        check_version(format.version)
            .and_then(|()| Self::check_key_size(size))
            .and_then(|()| {
                if size > MAX_GENERATED_KEY_SIZE {
                    return Err(format!("key size {size} above maximum {MAX_GENERATED_KEY_SIZE}"));
                }
                Ok(())
            })
            .and_then(|()| Self::check_params(&format.params))
            .map_err(|reason| KeysetError::invalid_params(HMAC_PRF_TYPE_URL, reason))?;

        Ok(format)
    }

    fn parse_key(serialized_key: &[u8]) -> Result<(HmacPrfKey, HashFunction)> {
        let key: HmacPrfKey = decode_key(HMAC_PRF_TYPE_URL, serialized_key)?;

        let hash = check_version(key.version)
            .and_then(|()| Self::check_key_size(key.key_value.len()))
            .and_then(|()| Self::check_params(&key.params))
            .map_err(|reason| KeysetError::malformed_key(HMAC_PRF_TYPE_URL, reason))?;

        Ok((key, hash))
    }
}

impl KeyManager for HmacPrfKeyManager {
    fn type_url(&self) -> &'static str {
        HMAC_PRF_TYPE_URL
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn validate_key_format(&self, serialized_format: &[u8]) -> Result<()> {
        Self::parse_format(serialized_format).map(|_| ())
    }

    fn new_key(&self, serialized_format: &[u8], rng: &dyn RandomSource) -> Result<Vec<u8>> {
        let format = Self::parse_format(serialized_format)?;
        let key = HmacPrfKey {
            version: KEY_VERSION,
            params: format.params,
            key_value: random_key(format.key_size as usize, rng),
        };
        Ok(encode_key(&key))
    }

    fn validate_key(&self, serialized_key: &[u8]) -> Result<()> {
        Self::parse_key(serialized_key).map(|_| ())
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<Primitive> {
        let (key, hash) = Self::parse_key(serialized_key)?;
        Ok(Primitive::Prf(Arc::new(HmacPrf::new(hash, &key.key_value))))
    }
}
