//! Caller-facing PRF set.
//!
//! Wraps the PRF primitive set of a keyset handle. New computations use the
//! primary key; any other enabled key can be named explicitly by id, which is
//! how callers keep reading values derived before a key rotation.
//!
//! ```text
//! KeysetHandle ──primitives_for::<PrfCapability>──► PrimitiveSet<dyn Prf>
//!                                                         │
//!                                        compute_primary / compute_with_key_id
//! ```

use std::fmt;

use prfkit_crypto::{Prf, PrfError};
use prfkit_proto::OutputPrefixType;

use crate::{
    error::{KeysetError, Result},
    keyset::KeysetHandle,
    primitive::PrfCapability,
    primitive_set::{PrimitiveEntry, PrimitiveSet, primitives_for},
    registry::Registry,
};

/// Set of PRFs keyed by key id, with one primary.
///
/// Immutable and `Send + Sync`; share it behind an `Arc` to compute from
/// several threads.
#[derive(Clone)]
pub struct PrfSet {
    set: PrimitiveSet<dyn Prf>,
}

impl PrfSet {
    /// Build the PRF set of `handle` through [`Registry::global`].
    ///
    /// # Errors
    ///
    /// See [`with_registry`](Self::with_registry).
    pub fn new(handle: &KeysetHandle) -> Result<Self> {
        Self::with_registry(handle, Registry::global())
    }

    /// Build the PRF set of `handle` through `registry`.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if an enabled key's type URL is not registered
    /// - `MalformedKey` if an enabled key's material is rejected
    /// - `IncompatibleKeyType` if an enabled key is not a PRF key or does not
    ///   use RAW output
    pub fn with_registry(handle: &KeysetHandle, registry: &Registry) -> Result<Self> {
        let set = primitives_for::<PrfCapability>(handle, registry)?;

        if let Some(entry) =
            set.entries().iter().find(|entry| entry.output_prefix_type() != OutputPrefixType::Raw)
        {
            return Err(KeysetError::IncompatibleKeyType {
                type_url: entry.type_url().to_string(),
                key_id: entry.key_id(),
                reason: format!(
                    "PRF keys must use RAW output, found {:?}",
                    entry.output_prefix_type()
                ),
            });
        }

        Ok(Self { set })
    }

    /// Compute `output_length` bytes from `input` with the primary key.
    ///
    /// # Errors
    ///
    /// - `OutputTooLong` if `output_length` exceeds the primary PRF's maximum
    pub fn compute_primary(&self, input: &[u8], output_length: usize) -> Result<Vec<u8>> {
        compute(self.set.primary(), input, output_length)
    }

    /// Compute `output_length` bytes from `input` with key `key_id`.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if `key_id` is not an enabled key of this set
    /// - `OutputTooLong` if `output_length` exceeds that PRF's maximum
    pub fn compute_with_key_id(
        &self,
        key_id: u32,
        input: &[u8],
        output_length: usize,
    ) -> Result<Vec<u8>> {
        compute(self.entry(key_id)?, input, output_length)
    }

    /// Id of the primary key.
    pub fn primary_key_id(&self) -> u32 {
        self.set.primary().key_id()
    }

    /// Ids of every key in the set, in keyset order.
    pub fn key_ids(&self) -> Vec<u32> {
        self.set.entries().iter().map(PrimitiveEntry::key_id).collect()
    }

    /// Largest output `key_id` can produce.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if `key_id` is not an enabled key of this set
    pub fn max_output_length(&self, key_id: u32) -> Result<usize> {
        Ok(self.entry(key_id)?.primitive().max_output_length())
    }

    fn entry(&self, key_id: u32) -> Result<&PrimitiveEntry<dyn Prf>> {
        self.set.entry(key_id).ok_or(KeysetError::KeyNotFound { key_id })
    }
}

impl fmt::Debug for PrfSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrfSet")
            .field("primary_key_id", &self.primary_key_id())
            .field("key_ids", &self.key_ids())
            .finish()
    }
}

fn compute(
    entry: &PrimitiveEntry<dyn Prf>,
    input: &[u8],
    output_length: usize,
) -> Result<Vec<u8>> {
    entry.primitive().compute(input, output_length).map_err(|e| match e {
        PrfError::OutputTooLong { requested, max } => {
            KeysetError::OutputTooLong { key_id: entry.key_id(), requested, max }
        },
        other => KeysetError::MalformedKey {
            type_url: entry.type_url().to_string(),
            key_id: Some(entry.key_id()),
            reason: other.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prfkit_proto::{KeyData, KeyMaterialType, KeyStatus, Keyset, KeysetKey, encode};

    use super::*;
    use crate::{
        env::SeededRandom,
        keyset::{KeysetManager, SecretKeyAccess},
        managers::{AES_CMAC_PRF_TYPE_URL, HMAC_PRF_TYPE_URL},
        templates::{aes_cmac_prf_key_template, hmac_sha256_prf_key_template},
    };

    fn handle_for(template: &prfkit_proto::KeyTemplate, seed: u64) -> KeysetHandle {
        KeysetHandle::generate_with(
            template,
            &Registry::with_prf_key_managers(),
            &SeededRandom::new(seed),
        )
        .unwrap()
    }

    #[test]
    fn primary_and_explicit_key_agree() {
        let handle = handle_for(&hmac_sha256_prf_key_template(), 30);
        let prf_set = PrfSet::new(&handle).unwrap();

        let primary = prf_set.compute_primary(b"input", 32).unwrap();
        let explicit = prf_set.compute_with_key_id(handle.primary_key_id(), b"input", 32).unwrap();

        assert_eq!(primary, explicit);
        assert_eq!(prf_set.primary_key_id(), handle.primary_key_id());
        assert_eq!(prf_set.key_ids(), vec![handle.primary_key_id()]);
    }

    #[test]
    fn zero_length_output_is_empty() {
        let prf_set = PrfSet::new(&handle_for(&aes_cmac_prf_key_template(), 31)).unwrap();
        assert_eq!(prf_set.compute_primary(b"input", 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn output_too_long_names_key_and_bounds() {
        let handle = handle_for(&aes_cmac_prf_key_template(), 32);
        let prf_set = PrfSet::new(&handle).unwrap();

        assert_eq!(
            prf_set.compute_primary(b"input", 17),
            Err(KeysetError::OutputTooLong {
                key_id: handle.primary_key_id(),
                requested: 17,
                max: 16,
            })
        );
        assert_eq!(prf_set.max_output_length(handle.primary_key_id()), Ok(16));
    }

    #[test]
    fn unknown_key_id_is_not_found() {
        let handle = handle_for(&hmac_sha256_prf_key_template(), 33);
        let prf_set = PrfSet::new(&handle).unwrap();
        let missing = handle.primary_key_id().wrapping_add(1);

        assert_eq!(
            prf_set.compute_with_key_id(missing, b"input", 16),
            Err(KeysetError::KeyNotFound { key_id: missing })
        );
        assert_eq!(
            prf_set.max_output_length(missing),
            Err(KeysetError::KeyNotFound { key_id: missing })
        );
    }

    #[test]
    fn rotated_set_keeps_old_key_reachable() {
        let registry = Registry::with_prf_key_managers();
        let rng = SeededRandom::new(34);
        let mut manager = KeysetManager::new();

        let old = manager.add(&hmac_sha256_prf_key_template(), &registry, &rng).unwrap();
        manager.set_primary(old).unwrap();
        let before = PrfSet::with_registry(&manager.handle().unwrap(), &registry).unwrap();

        let new = manager.add(&aes_cmac_prf_key_template(), &registry, &rng).unwrap();
        manager.set_primary(new).unwrap();
        let after = PrfSet::with_registry(&manager.handle().unwrap(), &registry).unwrap();

        assert_eq!(after.primary_key_id(), new);
        assert_eq!(
            before.compute_primary(b"input", 16).unwrap(),
            after.compute_with_key_id(old, b"input", 16).unwrap()
        );
        assert_ne!(
            after.compute_primary(b"input", 16).unwrap(),
            after.compute_with_key_id(old, b"input", 16).unwrap()
        );
    }

    #[test]
    fn non_raw_prf_key_is_incompatible() {
        let registry = Registry::with_prf_key_managers();
        let key_data = registry
            .new_key_data(&hmac_sha256_prf_key_template(), &SeededRandom::new(35))
            .unwrap();
        let keyset = Keyset {
            primary_key_id: 5,
            keys: vec![KeysetKey {
                key_data,
                status: KeyStatus::Enabled,
                key_id: 5,
                output_prefix_type: OutputPrefixType::Tink,
            }],
        };
        let handle =
            KeysetHandle::read(&encode(&keyset).unwrap(), SecretKeyAccess::insecure()).unwrap();

        assert!(matches!(
            PrfSet::with_registry(&handle, &registry),
            Err(KeysetError::IncompatibleKeyType { key_id: 5, type_url, .. })
                if type_url == HMAC_PRF_TYPE_URL
        ));
    }

    #[test]
    fn malformed_key_material_fails_construction() {
        let keyset = Keyset {
            primary_key_id: 6,
            keys: vec![KeysetKey {
                key_data: KeyData {
                    type_url: AES_CMAC_PRF_TYPE_URL.to_string(),
                    value: vec![0xA0],
                    key_material_type: KeyMaterialType::Symmetric,
                },
                status: KeyStatus::Enabled,
                key_id: 6,
                output_prefix_type: OutputPrefixType::Raw,
            }],
        };
        let handle =
            KeysetHandle::read(&encode(&keyset).unwrap(), SecretKeyAccess::insecure()).unwrap();

        assert!(matches!(
            PrfSet::new(&handle),
            Err(KeysetError::MalformedKey { key_id: Some(6), .. })
        ));
    }

    #[test]
    fn shared_across_threads() {
        let handle = handle_for(&hmac_sha256_prf_key_template(), 36);
        let prf_set = Arc::new(PrfSet::new(&handle).unwrap());
        let expected = prf_set.compute_primary(b"input", 32).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let prf_set = Arc::clone(&prf_set);
                std::thread::spawn(move || prf_set.compute_primary(b"input", 32).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn debug_shows_ids_only() {
        let handle = handle_for(&hmac_sha256_prf_key_template(), 37);
        let debug = format!("{:?}", PrfSet::new(&handle).unwrap());

        assert!(debug.contains(&handle.primary_key_id().to_string()));
    }
}
