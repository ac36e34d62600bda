//! Prfkit Cryptographic Primitives
//!
//! Thin, trusted wrappers that turn raw key bytes into a [`Prf`]: a keyed,
//! deterministic function from a message to an output of requested length.
//! The hash, MAC and KDF internals come from the RustCrypto crates; this
//! crate only fixes how each one is keyed and how far its output may be
//! stretched.
//!
//! # Output Bounds
//!
//! | Primitive    | Maximum output                       |
//! |--------------|--------------------------------------|
//! | HMAC-PRF     | digest size (28, 32, 48 or 64 bytes) |
//! | HKDF-PRF     | 255 × digest size                    |
//! | AES-CMAC-PRF | AES block size (16 bytes)            |
//!
//! HMAC and CMAC outputs are truncated tags; neither performs KDF expansion,
//! so requesting more than the tag length is an error rather than a silent
//! repeat or pad. HKDF expands, so its bound is the HKDF-Expand limit.
//!
//! # Security
//!
//! - Key bytes are zeroized when a primitive is dropped
//! - `Debug` output names the algorithm but never the key
//! - Every primitive is immutable after construction and safe to share across
//!   threads
//!
//! Key validation (minimum sizes, supported parameters) is NOT done here.
//! That is the job of the key managers that construct these primitives from
//! untrusted serialized keys.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod prf;

pub use prf::{
    AES_CMAC_KEY_SIZE, AES_CMAC_MAX_OUTPUT, AesCmacPrf, HashFunction, HkdfPrf, HmacPrf, Prf,
    PrfError,
};
