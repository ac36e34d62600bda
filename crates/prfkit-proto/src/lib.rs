//! Prfkit Wire Forms
//!
//! Serializable records exchanged between the key management pipeline and
//! storage: key templates, keysets and the primitive-specific key formats
//! carried inside them. Everything here is plain data. Nothing in this crate
//! validates key material beyond what decoding itself requires; callers must
//! treat a successfully decoded key as untrusted until a key manager has
//! checked it.
//!
//! # Encoding
//!
//! All records are CBOR, produced by serde derives. Structs encode as maps
//! keyed by field name in declaration order, enums as their
//! SCREAMING_SNAKE_CASE variant name. The encoding is deterministic: the
//! same value always produces the same bytes, which is what makes key
//! templates comparable against fixed reference encodings.
//!
//! ```text
//! KeyTemplate { type_url, value = CBOR(key format), output_prefix_type }
//!        │
//!        ▼ key manager
//! KeyData { type_url, value = CBOR(key), key_material_type }
//!        │
//!        ▼
//! Keyset { primary_key_id, keys: [KeysetKey { key_data, status, key_id, .. }] }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod formats;
pub mod keyset;

pub use codec::{MAX_ENCODED_SIZE, decode, decode_with_limit, encode};
pub use errors::{ProtocolError, Result};
pub use formats::{
    AesCmacPrfKey, AesCmacPrfKeyFormat, HkdfPrfKey, HkdfPrfKeyFormat, HkdfPrfParams, HmacPrfKey,
    HmacPrfKeyFormat, HmacPrfParams,
};
pub use keyset::{
    HashType, KeyData, KeyInfo, KeyMaterialType, KeyStatus, KeyTemplate, Keyset, KeysetInfo,
    KeysetKey, OutputPrefixType,
};
