//! Error types for the key management pipeline.
//!
//! One enum covers every stage: registry lookups, key manager validation,
//! keyset structure, primitive set construction and PRF computation. Each
//! variant carries enough context to diagnose the failure (key type, key id,
//! requested length) and never any key material.
//!
//! Nothing here is retried. These are input or configuration errors, not
//! transient faults.

use prfkit_proto::KeyStatus;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, KeysetError>;

/// Errors from key generation, keyset handling and PRF computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeysetError {
    /// No key manager is registered for the type URL
    #[error("unknown key type{}: no key manager registered for {type_url}", for_key(*.key_id))]
    UnknownKeyType {
        /// Unresolved type URL
        type_url: String,
        /// Keyset key carrying the type URL, if the lookup was for one
        key_id: Option<u32>,
    },

    /// A different key manager is already registered for the type URL
    #[error("key manager already registered for {type_url}")]
    AlreadyRegistered {
        /// Contested type URL
        type_url: String,
    },

    /// Key format or template parameters violate the primitive's constraints
    #[error("invalid parameters for {type_url}: {reason}")]
    InvalidParams {
        /// Key type whose parameters were rejected
        type_url: String,
        /// Violated constraint
        reason: String,
    },

    /// Serialized key material violates the primitive's constraints
    #[error("malformed key{} for {type_url}: {reason}", for_key(*.key_id))]
    MalformedKey {
        /// Key type whose key was rejected
        type_url: String,
        /// Keyset key that was rejected, if the key came from a keyset
        key_id: Option<u32>,
        /// Violated constraint
        reason: String,
    },

    /// Key type resolves but cannot provide the requested capability
    #[error("incompatible key type {type_url} for key {key_id}: {reason}")]
    IncompatibleKeyType {
        /// Key type that was resolved
        type_url: String,
        /// Offending key
        key_id: u32,
        /// Why the key cannot be used
        reason: String,
    },

    /// Keyset structure is invalid
    #[error("invalid keyset: {0}")]
    InvalidKeyset(KeysetViolation),

    /// Key id is not part of the set
    #[error("key not found: {key_id}")]
    KeyNotFound {
        /// Requested key id
        key_id: u32,
    },

    /// Requested PRF output exceeds the primitive's maximum
    #[error("output too long for key {key_id}: requested {requested} bytes, maximum is {max}")]
    OutputTooLong {
        /// Key the computation was requested for
        key_id: u32,
        /// Requested output length
        requested: usize,
        /// Maximum output length of the key's primitive
        max: usize,
    },
}

/// Structural keyset invariant that was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeysetViolation {
    /// Bytes could not be decoded as a keyset
    #[error("undecodable keyset: {0}")]
    Undecodable(String),

    /// Keyset has no keys
    #[error("keyset has no keys")]
    Empty,

    /// Keyset has more keys than the configured limit
    #[error("keyset has {count} keys, limit is {max}")]
    TooManyKeys {
        /// Number of keys present
        count: usize,
        /// Configured limit
        max: usize,
    },

    /// Two keys share an id
    #[error("duplicate key id {key_id}")]
    DuplicateKeyId {
        /// Repeated key id
        key_id: u32,
    },

    /// A key that still holds material has no type URL
    #[error("key {key_id} has no key type")]
    MissingKeyType {
        /// Offending key
        key_id: u32,
    },

    /// Primary key id matches no key
    #[error("primary key {primary_key_id} not found")]
    PrimaryNotFound {
        /// Declared primary key id
        primary_key_id: u32,
    },

    /// Primary key exists but is not enabled
    #[error("primary key {key_id} is {status:?}, must be enabled")]
    PrimaryNotEnabled {
        /// Primary key id
        key_id: u32,
        /// Its status
        status: KeyStatus,
    },

    /// Operation would disable, destroy or remove the primary key
    #[error("cannot {operation} primary key {key_id}")]
    PrimaryKeyOperation {
        /// Primary key id
        key_id: u32,
        /// Refused operation
        operation: &'static str,
    },

    /// Key material has been destroyed and cannot be re-enabled
    #[error("key {key_id} is destroyed")]
    KeyDestroyed {
        /// Destroyed key id
        key_id: u32,
    },
}

impl KeysetError {
    /// Shorthand for [`KeysetError::InvalidParams`].
    pub fn invalid_params(type_url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParams { type_url: type_url.to_string(), reason: reason.into() }
    }

    /// Shorthand for [`KeysetError::MalformedKey`].
    pub fn malformed_key(type_url: &str, reason: impl Into<String>) -> Self {
        Self::MalformedKey { type_url: type_url.to_string(), key_id: None, reason: reason.into() }
    }

    /// Shorthand for [`KeysetError::UnknownKeyType`].
    pub fn unknown_key_type(type_url: &str) -> Self {
        Self::UnknownKeyType { type_url: type_url.to_string(), key_id: None }
    }

    /// Attach the keyset key that caused a key type or key material error.
    ///
    /// Other variants either carry their key already or are not about a
    /// single key, and are returned unchanged.
    #[must_use]
    pub fn with_key_id(self, key_id: u32) -> Self {
        match self {
            Self::UnknownKeyType { type_url, .. } => {
                Self::UnknownKeyType { type_url, key_id: Some(key_id) }
            },
            Self::MalformedKey { type_url, reason, .. } => {
                Self::MalformedKey { type_url, key_id: Some(key_id), reason }
            },
            other => other,
        }
    }

    /// Returns true if this error stems from how the process is configured
    /// (registered key managers, requested capability) rather than from the
    /// template, keyset or arguments supplied for this call.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::UnknownKeyType { .. }
            | Self::AlreadyRegistered { .. }
            | Self::IncompatibleKeyType { .. } => true,

            Self::InvalidParams { .. }
            | Self::MalformedKey { .. }
            | Self::InvalidKeyset(_)
            | Self::KeyNotFound { .. }
            | Self::OutputTooLong { .. } => false,
        }
    }
}

fn for_key(key_id: Option<u32>) -> String {
    key_id.map(|id| format!(" (key {id})")).unwrap_or_default()
}

impl From<KeysetViolation> for KeysetError {
    fn from(violation: KeysetViolation) -> Self {
        Self::InvalidKeyset(violation)
    }
}
