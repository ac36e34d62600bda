//! Primitive-specific key formats and keys.
//!
//! A key format is what a [`crate::KeyTemplate`] carries in its `value`: the
//! parameters from which a key manager generates a key. A key is what
//! [`crate::KeyData`] carries: the same parameters plus the secret bytes.
//!
//! Key records zeroize their secret bytes on drop and redact them from
//! `Debug` output.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::keyset::HashType;

/// HMAC-PRF parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacPrfParams {
    /// Hash function underlying the HMAC
    pub hash: HashType,
}

/// HMAC-PRF key generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacPrfKeyFormat {
    /// Primitive parameters
    pub params: HmacPrfParams,
    /// Key size in bytes
    pub key_size: u32,
    /// Key format version
    pub version: u32,
}

/// HMAC-PRF key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacPrfKey {
    /// Key version
    pub version: u32,
    /// Primitive parameters
    pub params: HmacPrfParams,
    /// Secret key bytes
    pub key_value: Vec<u8>,
}

/// HKDF-PRF parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HkdfPrfParams {
    /// Hash function underlying HKDF
    pub hash: HashType,
    /// HKDF-Extract salt, empty for none
    pub salt: Vec<u8>,
}

/// HKDF-PRF key generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HkdfPrfKeyFormat {
    /// Primitive parameters
    pub params: HkdfPrfParams,
    /// Key size in bytes
    pub key_size: u32,
    /// Key format version
    pub version: u32,
}

/// HKDF-PRF key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HkdfPrfKey {
    /// Key version
    pub version: u32,
    /// Primitive parameters
    pub params: HkdfPrfParams,
    /// Secret input key material
    pub key_value: Vec<u8>,
}

/// AES-CMAC-PRF key generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesCmacPrfKeyFormat {
    /// Key format version
    pub version: u32,
    /// Key size in bytes
    pub key_size: u32,
}

/// AES-CMAC-PRF key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesCmacPrfKey {
    /// Key version
    pub version: u32,
    /// Secret AES key bytes
    pub key_value: Vec<u8>,
}

impl fmt::Debug for HmacPrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacPrfKey")
            .field("version", &self.version)
            .field("params", &self.params)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

impl fmt::Debug for HkdfPrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HkdfPrfKey")
            .field("version", &self.version)
            .field("params", &self.params)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

impl fmt::Debug for AesCmacPrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCmacPrfKey")
            .field("version", &self.version)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}

// Implement Drop to zeroize key material
impl Drop for HmacPrfKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

impl Drop for HkdfPrfKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

impl Drop for AesCmacPrfKey {
    fn drop(&mut self) {
        self.key_value.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn hmac_key_roundtrip() {
        let key = HmacPrfKey {
            version: 0,
            params: HmacPrfParams { hash: HashType::Sha512 },
            key_value: vec![0x42; 64],
        };
        let decoded: HmacPrfKey = decode(&encode(&key).unwrap()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn hkdf_format_preserves_salt() {
        let format = HkdfPrfKeyFormat {
            params: HkdfPrfParams { hash: HashType::Sha256, salt: b"salt".to_vec() },
            key_size: 32,
            version: 0,
        };
        let decoded: HkdfPrfKeyFormat = decode(&encode(&format).unwrap()).unwrap();
        assert_eq!(decoded.params.salt, b"salt");
    }

    #[test]
    fn key_format_does_not_decode_as_key() {
        // A format lacks `key_value`, so reading it as a key must fail
        let format = AesCmacPrfKeyFormat { version: 0, key_size: 32 };
        let result: crate::Result<AesCmacPrfKey> = decode(&encode(&format).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn key_debug_redacts_secret() {
        let key = AesCmacPrfKey { version: 0, key_value: vec![0x99; 32] };
        let rendered = format!("{key:?}");
        assert_eq!(rendered, "AesCmacPrfKey { version: 0, key_value: <32 bytes redacted> }");
    }
}
