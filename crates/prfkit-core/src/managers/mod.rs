//! Key managers: validation and instantiation for one key type each.
//!
//! A key manager is the only code allowed to interpret serialized key
//! material. Every path that produces a primitive goes through
//! [`KeyManager::validate_key`] first, so a key that decoded successfully but
//! violates a size or parameter constraint never becomes a primitive.
//!
//! ```text
//! key format ──validate_key_format──► new_key ──► serialized key
//!                                                      │
//!                      untrusted storage ◄─────────────┤
//!                                                      ▼
//!                                    validate_key ──► primitive
//! ```

pub mod aes_cmac_prf;
pub mod hkdf_prf;
pub mod hmac_prf;

use std::{any::Any, sync::Arc};

use prfkit_crypto::HashFunction;
use prfkit_proto::{HashType, KeyData, KeyMaterialType};
use serde::de::DeserializeOwned;

pub use aes_cmac_prf::{AES_CMAC_PRF_TYPE_URL, AesCmacPrfKeyManager};
pub use hkdf_prf::{HKDF_PRF_TYPE_URL, HkdfPrfKeyManager};
pub use hmac_prf::{HMAC_PRF_TYPE_URL, HmacPrfKeyManager};

use crate::{
    env::RandomSource,
    error::{KeysetError, Result},
    primitive::Primitive,
};

/// Generates, validates and instantiates keys of a single type.
///
/// # Invariants
///
/// - `primitive()` calls `validate_key()` before touching key bytes
/// - `new_key()` only emits keys that pass `validate_key()`
/// - Implementations are stateless, so one instance may serve every thread
pub trait KeyManager: Any + Send + Sync {
    /// Type URL this manager handles.
    fn type_url(&self) -> &'static str;

    /// Class of key material produced.
    fn key_material_type(&self) -> KeyMaterialType;

    /// Check a serialized key format.
    ///
    /// # Errors
    ///
    /// - `InvalidParams` if the format does not decode or violates a
    ///   constraint
    fn validate_key_format(&self, serialized_format: &[u8]) -> Result<()>;

    /// Generate a fresh serialized key from a serialized key format.
    ///
    /// # Errors
    ///
    /// - `InvalidParams` if the format is rejected by
    ///   [`validate_key_format`](Self::validate_key_format)
    fn new_key(&self, serialized_format: &[u8], rng: &dyn RandomSource) -> Result<Vec<u8>>;

    /// Check serialized key material, which may come from untrusted storage.
    ///
    /// # Errors
    ///
    /// - `MalformedKey` if the key does not decode or violates a constraint
    fn validate_key(&self, serialized_key: &[u8]) -> Result<()>;

    /// Build the runtime primitive for a serialized key.
    ///
    /// # Errors
    ///
    /// - `MalformedKey` under the same conditions as
    ///   [`validate_key`](Self::validate_key)
    fn primitive(&self, serialized_key: &[u8]) -> Result<Primitive>;

    /// Generate a fresh key wrapped in [`KeyData`].
    fn new_key_data(&self, serialized_format: &[u8], rng: &dyn RandomSource) -> Result<KeyData> {
        Ok(KeyData {
            type_url: self.type_url().to_string(),
            value: self.new_key(serialized_format, rng)?,
            key_material_type: self.key_material_type(),
        })
    }
}

/// One instance of every PRF key manager.
pub fn prf_key_managers() -> [Arc<dyn KeyManager>; 3] {
    [
        Arc::new(HmacPrfKeyManager),
        Arc::new(HkdfPrfKeyManager),
        Arc::new(AesCmacPrfKeyManager),
    ]
}

/// Key format version every manager in this crate accepts.
pub(crate) const KEY_VERSION: u32 = 0;

/// Upper bound on generated key sizes, far above any useful PRF key.
pub(crate) const MAX_GENERATED_KEY_SIZE: usize = 1024;

/// Decode a key format, mapping failure to `InvalidParams`.
fn decode_format<T: DeserializeOwned>(type_url: &str, bytes: &[u8]) -> Result<T> {
    prfkit_proto::decode(bytes)
        .map_err(|e| KeysetError::invalid_params(type_url, format!("undecodable key format: {e}")))
}

/// Decode a key, mapping failure to `MalformedKey`.
fn decode_key<T: DeserializeOwned>(type_url: &str, bytes: &[u8]) -> Result<T> {
    prfkit_proto::decode(bytes)
        .map_err(|e| KeysetError::malformed_key(type_url, format!("undecodable key: {e}")))
}

/// Encode a freshly generated key.
fn encode_key<T: serde::Serialize>(key: &T) -> Vec<u8> {
    let Ok(bytes) = prfkit_proto::encode(key) else {
        unreachable!("key records always encode to an in-memory buffer");
    };
    bytes
}

/// Check a key or format version against [`KEY_VERSION`].
fn check_version(version: u32) -> std::result::Result<(), String> {
    if version > KEY_VERSION {
        return Err(format!("version {version} not supported, maximum is {KEY_VERSION}"));
    }
    Ok(())
}

/// Map a wire hash to a supported hash function, if it is in `allowed`.
fn supported_hash(
    hash: HashType,
    allowed: &[HashFunction],
) -> std::result::Result<HashFunction, String> {
    let function = match hash {
        HashType::Sha224 => Some(HashFunction::Sha224),
        HashType::Sha256 => Some(HashFunction::Sha256),
        HashType::Sha384 => Some(HashFunction::Sha384),
        HashType::Sha512 => Some(HashFunction::Sha512),
        HashType::Sha1 => None,
    };

    function
        .filter(|function| allowed.contains(function))
        .ok_or_else(|| format!("unsupported hash {hash:?}"))
}

/// Fresh random key bytes.
fn random_key(size: usize, rng: &dyn RandomSource) -> Vec<u8> {
    let mut key = vec![0u8; size];
    rng.fill_bytes(&mut key);
    key
}
