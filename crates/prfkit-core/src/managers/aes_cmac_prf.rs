//! AES-CMAC-PRF key manager

use std::sync::Arc;

use prfkit_crypto::{AES_CMAC_KEY_SIZE, AesCmacPrf};
use prfkit_proto::{AesCmacPrfKey, AesCmacPrfKeyFormat, KeyMaterialType};

use super::{
    KEY_VERSION, KeyManager, check_version, decode_format, decode_key, encode_key, random_key,
};
use crate::{
    env::RandomSource,
    error::{KeysetError, Result},
    primitive::Primitive,
};

/// Type URL of AES-CMAC-PRF keys.
pub const AES_CMAC_PRF_TYPE_URL: &str = "type.googleapis.com/google.crypto.tink.AesCmacPrfKey";

/// Key manager for [`AesCmacPrf`] keys. Only AES-256 keys are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCmacPrfKeyManager;

fn check(version: u32, key_size: usize) -> std::result::Result<(), String> {
    check_version(version)?;
    if key_size != AES_CMAC_KEY_SIZE {
        return Err(format!("key size {key_size}, must be {AES_CMAC_KEY_SIZE}"));
    }
    Ok(())
}

fn parse_key(serialized_key: &[u8]) -> Result<AesCmacPrfKey> {
    let key: AesCmacPrfKey = decode_key(AES_CMAC_PRF_TYPE_URL, serialized_key)?;
    check(key.version, key.key_value.len())
        .map_err(|reason| KeysetError::malformed_key(AES_CMAC_PRF_TYPE_URL, reason))?;
    Ok(key)
}

impl KeyManager for AesCmacPrfKeyManager {
    fn type_url(&self) -> &'static str {
        AES_CMAC_PRF_TYPE_URL
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn validate_key_format(&self, serialized_format: &[u8]) -> Result<()> {
        let format: AesCmacPrfKeyFormat = decode_format(AES_CMAC_PRF_TYPE_URL, serialized_format)?;
        check(format.version, format.key_size as usize)
            .map_err(|reason| KeysetError::invalid_params(AES_CMAC_PRF_TYPE_URL, reason))
    }

    fn new_key(&self, serialized_format: &[u8], rng: &dyn RandomSource) -> Result<Vec<u8>> {
        self.validate_key_format(serialized_format)?;
        let key =
            AesCmacPrfKey { version: KEY_VERSION, key_value: random_key(AES_CMAC_KEY_SIZE, rng) };
        Ok(encode_key(&key))
    }

    fn validate_key(&self, serialized_key: &[u8]) -> Result<()> {
        parse_key(serialized_key).map(|_| ())
    }

    fn primitive(&self, serialized_key: &[u8]) -> Result<Primitive> {
        let key = parse_key(serialized_key)?;
        let prf = AesCmacPrf::new(&key.key_value)
            .map_err(|e| KeysetError::malformed_key(AES_CMAC_PRF_TYPE_URL, e.to_string()))?;
        Ok(Primitive::Prf(Arc::new(prf)))
    }
}
