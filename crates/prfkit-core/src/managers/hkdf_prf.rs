//! HKDF-PRF key manager

use std::sync::Arc;

use prfkit_crypto::{HashFunction, HkdfPrf};
use prfkit_proto::{HkdfPrfKey, HkdfPrfKeyFormat, HkdfPrfParams, KeyMaterialType};

use super::{
    KEY_VERSION, KeyManager, MAX_GENERATED_KEY_SIZE, check_version, decode_format, decode_key,
    encode_key, random_key, supported_hash,
};
use crate::{
    env::RandomSource,
    error::{KeysetError, Result},
    primitive::Primitive,
};

/// Type URL of HKDF-PRF keys.
pub const HKDF_PRF_TYPE_URL: &str = "type.googleapis.com/google.crypto.tink.HkdfPrfKey";

/// Smallest accepted HKDF-PRF input key, in bytes.
pub const MIN_HKDF_KEY_SIZE: usize = 32;

const SUPPORTED_HASHES: [HashFunction; 2] = [HashFunction::Sha256, HashFunction::Sha512];

/// Key manager for [`HkdfPrf`] keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct HkdfPrfKeyManager;

impl HkdfPrfKeyManager {
    fn check(
        version: u32,
        key_size: usize,
        params: &HkdfPrfParams,
    ) -> std::result::Result<HashFunction, String> {
        check_version(version)?;
        if key_size < MIN_HKDF_KEY_SIZE {
            return Err(format!("key size {key_size} below minimum {MIN_HKDF_KEY_SIZE}"));
        }
        supported_hash(params.hash, &SUPPORTED_HASHES)
    }

    fn parse_format(serialized_format: &[u8]) -> Result<HkdfPrfKeyFormat> {
        let format: HkdfPrfKeyFormat = decode_format(HKDF_PRF_TYPE_URL, serialized_format)?;
        let size = format.key_size as usize;

        if size > MAX_GENERATED_KEY_SIZE {
            return Err(KeysetError::invalid_params(
                HKDF_PRF_TYPE_URL,
                format!("key size {size} above maximum {MAX_GENERATED_KEY_SIZE}"),
            ));
        }

        Self::check(format.version, size, &format.params)
            .map_err(|reason| KeysetError::invalid_params(HKDF_PRF_TYPE_URL, reason))?;

        Ok(format)
    }

    fn parse_key(serialized_key: &[u8]) -> Result<(HkdfPrfKey, HashFunction)> {
        let key: HkdfPrfKey = decode_key(HKDF_PRF_TYPE_URL, serialized_key)?;

        let hash = Self::check(key.version, key.key_value.len(), &key.params)
            .map_err(|reason| KeysetError::malformed_key(HKDF_PRF_TYPE_URL, reason))?;

        Ok((key, hash))
    }
}

impl KeyManager for HkdfPrfKeyManager {
    fn type_url(&self) -> &'static str {
        HKDF_PRF_TYPE_URL
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn validate_key_format(&self, serialized_format: &[u8]) -> Result<()> {
        Self::parse_format(serialized_format).map(|_| ())
    }

    fn new_key(&self, serialized_format: &[u8], rng: &dyn RandomSource) -> Result<Vec<u8>> {
        let format = Self::parse_format(serialized_format)?;
        let key = HkdfPrfKey {
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
        let prf = HkdfPrf::new(hash, &key.key_value, &key.params.salt)
            .map_err(|e| KeysetError::malformed_key(HKDF_PRF_TYPE_URL, e.to_string()))?;
        Ok(Primitive::Prf(Arc::new(prf)))
    }
}
