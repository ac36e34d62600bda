//! Key templates for the supported PRFs.
//!
//! Every template uses [`OutputPrefixType::Raw`]. PRF output is a pure
//! function of key and message and is never tagged with key metadata.

use prfkit_proto::{
    AesCmacPrfKeyFormat, HashType, HkdfPrfKeyFormat, HkdfPrfParams, HmacPrfKeyFormat,
    HmacPrfParams, KeyTemplate, OutputPrefixType, encode,
};
use serde::Serialize;

use crate::managers::{AES_CMAC_PRF_TYPE_URL, HKDF_PRF_TYPE_URL, HMAC_PRF_TYPE_URL};

/// HMAC-SHA256 PRF with a 32-byte key.
pub fn hmac_sha256_prf_key_template() -> KeyTemplate {
    hmac_prf_key_template(HashType::Sha256, 32)
}

/// HMAC-SHA512 PRF with a 64-byte key.
pub fn hmac_sha512_prf_key_template() -> KeyTemplate {
    hmac_prf_key_template(HashType::Sha512, 64)
}

/// HKDF-SHA256 PRF with a 32-byte key and no salt.
pub fn hkdf_sha256_prf_key_template() -> KeyTemplate {
    let format = HkdfPrfKeyFormat {
        params: HkdfPrfParams { hash: HashType::Sha256, salt: Vec::new() },
        key_size: 32,
        version: 0,
    };
    raw_template(HKDF_PRF_TYPE_URL, &format)
}

/// AES-CMAC PRF with a 32-byte (AES-256) key.
pub fn aes_cmac_prf_key_template() -> KeyTemplate {
    raw_template(AES_CMAC_PRF_TYPE_URL, &AesCmacPrfKeyFormat { version: 0, key_size: 32 })
}

fn hmac_prf_key_template(hash: HashType, key_size: u32) -> KeyTemplate {
    let format = HmacPrfKeyFormat { params: HmacPrfParams { hash }, key_size, version: 0 };
    raw_template(HMAC_PRF_TYPE_URL, &format)
}

fn raw_template<F: Serialize>(type_url: &str, format: &F) -> KeyTemplate {
    let Ok(value) = encode(format) else {
        unreachable!("key formats always encode to an in-memory buffer");
    };

    KeyTemplate { type_url: type_url.to_string(), value, output_prefix_type: OutputPrefixType::Raw }
}
