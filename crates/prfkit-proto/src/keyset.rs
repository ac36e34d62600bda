//! Key templates, keysets and the enumerations they share.
//!
//! These are the two transport forms of the pipeline. A [`KeyTemplate`]
//! names a key type and carries its generation parameters but no key
//! material. A [`Keyset`] carries one or more keys, each with its serialized
//! key material inside [`KeyData`].
//!
//! # Invariants
//!
//! Decoding does not enforce keyset invariants (unique key ids, an enabled
//! primary). Those belong to the handle that wraps a keyset, so a decoded
//! [`Keyset`] is only structurally well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// How primitive output is tagged with key metadata.
///
/// PRF keys only ever use [`OutputPrefixType::Raw`]: their output must be a
/// pure function of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputPrefixType {
    /// No prefix
    Raw,
    /// Version byte followed by the key id
    Tink,
    /// Legacy prefix format
    Legacy,
    /// Legacy prefix format without the trailing version byte
    Crunchy,
}

/// Lifecycle state of a key inside a keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyStatus {
    /// Usable for computation
    Enabled,
    /// Kept in the keyset but never turned into a primitive
    Disabled,
    /// Key material erased; only the entry remains
    Destroyed,
}

/// Class of key material carried in [`KeyData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMaterialType {
    /// Secret symmetric key
    Symmetric,
    /// Private half of an asymmetric key pair
    AsymmetricPrivate,
    /// Public half of an asymmetric key pair
    AsymmetricPublic,
    /// Key held by a remote key management service
    Remote,
}

/// Hash function named by primitive parameters.
///
/// This is the wire vocabulary. Which hashes a primitive actually accepts is
/// decided by its key manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HashType {
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// Serializable description of a key type and its generation parameters.
///
/// Immutable once built. `value` is the CBOR encoding of the key format of
/// the primitive selected by `type_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTemplate {
    /// Globally unique key type identifier
    pub type_url: String,
    /// Encoded primitive-specific key format
    pub value: Vec<u8>,
    /// Output prefix type for keys generated from this template
    pub output_prefix_type: OutputPrefixType,
}

/// Serialized key material tagged with its key type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyData {
    /// Key type identifier, selects the key manager
    pub type_url: String,
    /// Encoded primitive-specific key, including secret bytes
    pub value: Vec<u8>,
    /// Class of the key material
    pub key_material_type: KeyMaterialType,
}

impl fmt::Debug for KeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<{} bytes redacted>", self.value.len()))
            .field("key_material_type", &self.key_material_type)
            .finish()
    }
}

impl Drop for KeyData {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// One entry of a [`Keyset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetKey {
    /// Key type and serialized key material
    pub key_data: KeyData,
    /// Lifecycle state
    pub status: KeyStatus,
    /// Identifier, unique within the keyset
    pub key_id: u32,
    /// Output prefix type
    pub output_prefix_type: OutputPrefixType,
}

/// Ordered collection of keys with one designated primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyset {
    /// Identifier of the key used for new computations
    pub primary_key_id: u32,
    /// Keys in keyset order
    pub keys: Vec<KeysetKey>,
}

impl Keyset {
    /// Metadata view of this keyset, without key material.
    pub fn info(&self) -> KeysetInfo {
        KeysetInfo {
            primary_key_id: self.primary_key_id,
            key_info: self.keys.iter().map(KeyInfo::from).collect(),
        }
    }
}

/// Key metadata safe to log or display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Key type identifier
    pub type_url: String,
    /// Lifecycle state
    pub status: KeyStatus,
    /// Identifier within the keyset
    pub key_id: u32,
    /// Output prefix type
    pub output_prefix_type: OutputPrefixType,
}

impl From<&KeysetKey> for KeyInfo {
    fn from(key: &KeysetKey) -> Self {
        Self {
            type_url: key.key_data.type_url.clone(),
            status: key.status,
            key_id: key.key_id,
            output_prefix_type: key.output_prefix_type,
        }
    }
}

/// Keyset metadata safe to log or display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetInfo {
    /// Identifier of the primary key
    pub primary_key_id: u32,
    /// Per-key metadata in keyset order
    pub key_info: Vec<KeyInfo>,
}
