//! Prfkit Core
//!
//! Turns key templates into keysets, and keysets into PRF sets.
//!
//! ```text
//! KeyTemplate ──Registry──► KeyData ──► KeysetHandle ──Registry──► PrimitiveSet ──► PrfSet
//!                  │                         ▲                         │
//!             KeyManager                 read/write              compute_primary
//!                                     (SecretKeyAccess)         compute_with_key_id
//! ```
//!
//! # Components
//!
//! - [`templates`]: fixed key templates for the supported PRFs
//! - [`registry`]: frozen type URL → [`KeyManager`] mapping
//! - [`managers`]: per-primitive key generation and validation
//! - [`keyset`]: validated, immutable [`KeysetHandle`] and the
//!   [`KeysetManager`] that derives new handles
//! - [`primitive_set`]: enabled keys resolved to primitives of one capability
//! - [`prf_set`]: the caller-facing [`PrfSet`]
//!
//! # Example
//!
//! ```
//! use prfkit_core::{KeysetHandle, PrfSet, templates};
//!
//! let handle = KeysetHandle::generate_new(&templates::hmac_sha256_prf_key_template())?;
//! let prf_set = PrfSet::new(&handle)?;
//! let output = prf_set.compute_primary(b"This is an ID needs to be redacted", 16)?;
//! assert_eq!(output.len(), 16);
//! # Ok::<(), prfkit_core::KeysetError>(())
//! ```
//!
//! # Security
//!
//! Serialized key material is untrusted until its key manager has validated
//! it. Decoding a keyset only checks structure; no primitive is built from a
//! key that its manager has not accepted.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod keyset;
pub mod managers;
pub mod prf_set;
pub mod primitive;
pub mod primitive_set;
pub mod registry;
pub mod templates;

pub use env::{RandomSource, SeededRandom, SystemRandom};
pub use error::{KeysetError, KeysetViolation, Result};
pub use keyset::{DEFAULT_MAX_KEYS, KeysetHandle, KeysetLimits, KeysetManager, SecretKeyAccess};
pub use managers::{
    AES_CMAC_PRF_TYPE_URL, AesCmacPrfKeyManager, HKDF_PRF_TYPE_URL, HMAC_PRF_TYPE_URL,
    HkdfPrfKeyManager, HmacPrfKeyManager, KeyManager, prf_key_managers,
};
pub use prf_set::PrfSet;
pub use primitive::{Capability, PrfCapability, Primitive};
pub use primitive_set::{PrimitiveEntry, PrimitiveSet, primitives_for};
pub use registry::{Registry, RegistryBuilder};
pub use templates::{
    aes_cmac_prf_key_template, hkdf_sha256_prf_key_template, hmac_sha256_prf_key_template,
    hmac_sha512_prf_key_template,
};
