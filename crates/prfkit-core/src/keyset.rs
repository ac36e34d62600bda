//! Keyset handles and the keyset manager.
//!
//! A [`KeysetHandle`] wraps a [`Keyset`] that has passed structural
//! validation. Handles are immutable: [`KeysetManager`] edits a private copy
//! and produces a new handle, so primitives built from an existing handle
//! never observe a change.
//!
//! # Invariants
//!
//! Every handle, however constructed, satisfies:
//!
//! - At least one key, and no more than the configured key limit
//! - Key ids are unique
//! - Every key that still holds material names a key type
//! - `primary_key_id` names exactly one key, and that key is enabled
//!
//! # Security
//!
//! Key material only leaves a handle through [`KeysetHandle::write`], which
//! requires a [`SecretKeyAccess`] token. Reading key material from bytes
//! requires the same token. `Debug` output shows key metadata only.

use std::{collections::HashSet, fmt};

use prfkit_proto::{
    KeyStatus, KeyTemplate, Keyset, KeysetInfo, KeysetKey, MAX_ENCODED_SIZE, decode_with_limit,
    encode,
};
use zeroize::Zeroize;

use crate::{
    env::{RandomSource, SystemRandom},
    error::{KeysetError, KeysetViolation, Result},
    primitive::Capability,
    primitive_set::{PrimitiveSet, primitives_for},
    registry::Registry,
};

/// Default upper bound on keys in a keyset read from bytes.
pub const DEFAULT_MAX_KEYS: usize = 10_000;

/// Proof that the caller is allowed to handle raw key material.
///
/// Obtained from [`SecretKeyAccess::insecure`]. Grep for that call to find
/// every place secret keys are read or written in plaintext.
#[derive(Debug, Clone, Copy)]
pub struct SecretKeyAccess {
    _private: (),
}

impl SecretKeyAccess {
    /// Grant access to plaintext key material.
    pub fn insecure() -> Self {
        Self { _private: () }
    }
}

/// Resource limits applied when reading a keyset from untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetLimits {
    /// Largest accepted encoding, in bytes
    pub max_encoded_size: usize,
    /// Largest accepted number of keys
    pub max_keys: usize,
}

impl Default for KeysetLimits {
    fn default() -> Self {
        Self { max_encoded_size: MAX_ENCODED_SIZE, max_keys: DEFAULT_MAX_KEYS }
    }
}

/// Validated, immutable keyset.
#[derive(Clone, PartialEq, Eq)]
pub struct KeysetHandle {
    keyset: Keyset,
}

impl KeysetHandle {
    /// Generate a single-key keyset from `template`.
    ///
    /// Uses [`Registry::global`] and OS randomness.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if no manager handles the template's type URL
    /// - `InvalidParams` if the manager rejects the template
    pub fn generate_new(template: &KeyTemplate) -> Result<Self> {
        Self::generate_with(template, Registry::global(), &SystemRandom)
    }

    /// Generate a single-key keyset from `template` with an explicit
    /// registry and randomness source.
    ///
    /// # Errors
    ///
    /// Same as [`generate_new`](Self::generate_new).
    pub fn generate_with(
        template: &KeyTemplate,
        registry: &Registry,
        rng: &dyn RandomSource,
    ) -> Result<Self> {
        let mut manager = KeysetManager::new();
        let key_id = manager.add(template, registry, rng)?;
        manager.set_primary(key_id)?;
        manager.handle()
    }

    /// Read a keyset holding plaintext key material, with default limits.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyset` if the bytes do not decode or the keyset violates a
    ///   structural invariant
    pub fn read(bytes: &[u8], access: SecretKeyAccess) -> Result<Self> {
        Self::read_with_limits(bytes, access, &KeysetLimits::default())
    }

    /// Read a keyset holding plaintext key material.
    ///
    /// Only structure is checked here. Key material is validated by its key
    /// manager when a primitive set is built.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyset` if the bytes exceed `limits`, do not decode, or the
    ///   keyset violates a structural invariant
    pub fn read_with_limits(
        bytes: &[u8],
        _access: SecretKeyAccess,
        limits: &KeysetLimits,
    ) -> Result<Self> {
        let keyset: Keyset = decode_with_limit(bytes, limits.max_encoded_size).map_err(|e| {
            tracing::warn!(len = bytes.len(), error = %e, "rejected undecodable keyset");
            KeysetViolation::Undecodable(e.to_string())
        })?;

        Self::from_keyset(keyset, limits.max_keys)
    }

    /// Serialize the keyset, including plaintext key material.
    pub fn write(&self, _access: SecretKeyAccess) -> Vec<u8> {
        let Ok(bytes) = encode(&self.keyset) else {
            unreachable!("keysets always encode to an in-memory buffer");
        };
        bytes
    }

    /// Key metadata, without key material.
    pub fn keyset_info(&self) -> KeysetInfo {
        self.keyset.info()
    }

    /// Id of the primary key.
    pub fn primary_key_id(&self) -> u32 {
        self.keyset.primary_key_id
    }

    /// Number of keys, in any status.
    pub fn key_count(&self) -> usize {
        self.keyset.keys.len()
    }

    /// Build the primitive set for capability `C`.
    ///
    /// # Errors
    ///
    /// See [`primitives_for`].
    pub fn primitives<C: Capability>(
        &self,
        registry: &Registry,
    ) -> Result<PrimitiveSet<C::Output>> {
        primitives_for::<C>(self, registry)
    }

    pub(crate) fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    fn from_keyset(keyset: Keyset, max_keys: usize) -> Result<Self> {
        if let Err(violation) = validate_keyset(&keyset, max_keys) {
            tracing::warn!(%violation, primary_key_id = keyset.primary_key_id, "rejected keyset");
            return Err(violation.into());
        }
        Ok(Self { keyset })
    }
}

impl fmt::Debug for KeysetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetHandle").field("info", &self.keyset_info()).finish()
    }
}

/// Check the structural keyset invariants.
fn validate_keyset(keyset: &Keyset, max_keys: usize) -> std::result::Result<(), KeysetViolation> {
    if keyset.keys.is_empty() {
        return Err(KeysetViolation::Empty);
    }

    if keyset.keys.len() > max_keys {
        return Err(KeysetViolation::TooManyKeys { count: keyset.keys.len(), max: max_keys });
    }

    let mut seen = HashSet::with_capacity(keyset.keys.len());
    for key in &keyset.keys {
        if !seen.insert(key.key_id) {
            return Err(KeysetViolation::DuplicateKeyId { key_id: key.key_id });
        }

        if key.status != KeyStatus::Destroyed && key.key_data.type_url.is_empty() {
            return Err(KeysetViolation::MissingKeyType { key_id: key.key_id });
        }
    }

    let primary_key_id = keyset.primary_key_id;
    let Some(primary) = keyset.keys.iter().find(|key| key.key_id == primary_key_id) else {
        return Err(KeysetViolation::PrimaryNotFound { primary_key_id });
    };

    if primary.status != KeyStatus::Enabled {
        return Err(KeysetViolation::PrimaryNotEnabled {
            key_id: primary_key_id,
            status: primary.status,
        });
    }

    Ok(())
}

/// Builds new keysets from old ones.
///
/// Edits are checked one at a time where they can be (the primary key cannot
/// be disabled, destroyed or deleted). The full structural check runs in
/// [`handle`](Self::handle).
#[derive(Clone)]
pub struct KeysetManager {
    keyset: Keyset,
}

impl KeysetManager {
    /// Start from an empty keyset.
    pub fn new() -> Self {
        Self { keyset: Keyset { primary_key_id: 0, keys: Vec::new() } }
    }

    /// Start from a copy of `handle`'s keyset.
    pub fn from_handle(handle: &KeysetHandle) -> Self {
        Self { keyset: handle.keyset.clone() }
    }

    /// Generate a key from `template` and append it, enabled.
    ///
    /// The new key is not made primary. Returns its key id: random,
    /// non-zero, and unique within the keyset.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if no manager handles the template's type URL
    /// - `InvalidParams` if the manager rejects the template
    pub fn add(
        &mut self,
        template: &KeyTemplate,
        registry: &Registry,
        rng: &dyn RandomSource,
    ) -> Result<u32> {
        let key_data = registry.new_key_data(template, rng)?;
        let key_id = self.fresh_key_id(rng);

        self.keyset.keys.push(KeysetKey {
            key_data,
            status: KeyStatus::Enabled,
            key_id,
            output_prefix_type: template.output_prefix_type,
        });

        tracing::debug!(key_id, type_url = %template.type_url, "added key");
        Ok(key_id)
    }

    /// Make `key_id` the primary key.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has `key_id`
    /// - `InvalidKeyset` if the key is not enabled
    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        let status = self.key_mut(key_id)?.status;
        if status != KeyStatus::Enabled {
            return Err(KeysetViolation::PrimaryNotEnabled { key_id, status }.into());
        }

        self.keyset.primary_key_id = key_id;
        Ok(())
    }

    /// Enable a disabled key.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has `key_id`
    /// - `InvalidKeyset` if the key has been destroyed
    pub fn enable(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(KeysetViolation::KeyDestroyed { key_id }.into());
        }

        key.status = KeyStatus::Enabled;
        Ok(())
    }

    /// Disable a key, keeping its material.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has `key_id`
    /// - `InvalidKeyset` if the key is primary or has been destroyed
    pub fn disable(&mut self, key_id: u32) -> Result<()> {
        self.refuse_primary(key_id, "disable")?;

        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(KeysetViolation::KeyDestroyed { key_id }.into());
        }

        key.status = KeyStatus::Disabled;
        Ok(())
    }

    /// Erase a key's material, keeping its entry.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has `key_id`
    /// - `InvalidKeyset` if the key is primary
    pub fn destroy(&mut self, key_id: u32) -> Result<()> {
        self.refuse_primary(key_id, "destroy")?;

        let key = self.key_mut(key_id)?;
        key.key_data.value.zeroize();
        key.key_data.value.clear();
        key.status = KeyStatus::Destroyed;

        tracing::debug!(key_id, "destroyed key material");
        Ok(())
    }

    /// Remove a key entirely.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if no key has `key_id`
    /// - `InvalidKeyset` if the key is primary
    pub fn delete(&mut self, key_id: u32) -> Result<()> {
        self.refuse_primary(key_id, "delete")?;

        let index = self
            .keyset
            .keys
            .iter()
            .position(|key| key.key_id == key_id)
            .ok_or(KeysetError::KeyNotFound { key_id })?;
        self.keyset.keys.remove(index);
        Ok(())
    }

    /// Validate the edited keyset and produce a new handle.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyset` if the keyset violates a structural invariant, for
    ///   example because no primary was set
    pub fn handle(&self) -> Result<KeysetHandle> {
        KeysetHandle::from_keyset(self.keyset.clone(), DEFAULT_MAX_KEYS)
    }

    fn key_mut(&mut self, key_id: u32) -> Result<&mut KeysetKey> {
        self.keyset
            .keys
            .iter_mut()
            .find(|key| key.key_id == key_id)
            .ok_or(KeysetError::KeyNotFound { key_id })
    }

    fn refuse_primary(&self, key_id: u32, operation: &'static str) -> Result<()> {
        let is_primary = self.keyset.primary_key_id == key_id
            && self.keyset.keys.iter().any(|key| key.key_id == key_id);
        if is_primary {
            return Err(KeysetViolation::PrimaryKeyOperation { key_id, operation }.into());
        }
        Ok(())
    }

    fn fresh_key_id(&self, rng: &dyn RandomSource) -> u32 {
        loop {
            let key_id = rng.random_u32();
            if key_id != 0 && self.keyset.keys.iter().all(|key| key.key_id != key_id) {
                return key_id;
            }
        }
    }
}

impl Default for KeysetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeysetManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeysetManager").field("info", &self.keyset.info()).finish()
    }
}
