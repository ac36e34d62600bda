//! Property-based tests for keyset handles and PRF sets
//!
//! These tests verify the keyset invariants end to end:
//!
//! 1. **Round-trip**: a written and re-read handle computes identical output
//!    for every key
//! 2. **Structure**: duplicate key ids and dangling primaries never produce a
//!    handle
//! 3. **Status filtering**: disabled keys are absent from the PRF set
//! 4. **Capability**: keys that are not PRFs fail the whole PRF set

use std::sync::Arc;

use prfkit_core::{
    KeyManager, KeysetError, KeysetHandle, KeysetManager, KeysetViolation, PrfSet, Primitive,
    RandomSource, Registry, Result, SecretKeyAccess, SeededRandom, aes_cmac_prf_key_template,
    hkdf_sha256_prf_key_template, hmac_sha256_prf_key_template, hmac_sha512_prf_key_template,
};
use prfkit_proto::{
    KeyData, KeyMaterialType, KeyStatus, KeyTemplate, Keyset, KeysetKey, OutputPrefixType, decode,
    encode,
};
use proptest::prelude::*;

const NOT_A_PRF_TYPE_URL: &str = "type.example/NotAPrf";

/// Key manager whose primitives have no PRF capability.
struct NotAPrfKeyManager;

impl KeyManager for NotAPrfKeyManager {
    fn type_url(&self) -> &'static str {
        NOT_A_PRF_TYPE_URL
    }

    fn key_material_type(&self) -> KeyMaterialType {
        KeyMaterialType::Symmetric
    }

    fn validate_key_format(&self, _serialized_format: &[u8]) -> Result<()> {
        Ok(())
    }

    fn new_key(&self, _serialized_format: &[u8], rng: &dyn RandomSource) -> Result<Vec<u8>> {
        let mut key = vec![0u8; 16];
        rng.fill_bytes(&mut key);
        Ok(key)
    }

    fn validate_key(&self, _serialized_key: &[u8]) -> Result<()> {
        Ok(())
    }

    fn primitive(&self, _serialized_key: &[u8]) -> Result<Primitive> {
        Ok(Primitive::Other { kind: "AEAD", primitive: Arc::new(()) })
    }
}

fn prf_template(choice: u8) -> KeyTemplate {
    match choice % 4 {
        0 => hmac_sha256_prf_key_template(),
        1 => hmac_sha512_prf_key_template(),
        2 => hkdf_sha256_prf_key_template(),
        _ => aes_cmac_prf_key_template(),
    }
}

fn keyset_of(handle: &KeysetHandle) -> Keyset {
    decode(&handle.write(SecretKeyAccess::insecure())).unwrap()
}

fn read(keyset: &Keyset) -> Result<KeysetHandle> {
    KeysetHandle::read(&encode(keyset).unwrap(), SecretKeyAccess::insecure())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_write_read_round_trip_preserves_outputs(
        choices in prop::collection::vec(any::<u8>(), 1..6),
        primary_index in any::<prop::sample::Index>(),
        seed in any::<u64>(),
        input in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let registry = Registry::with_prf_key_managers();
        let rng = SeededRandom::new(seed);
        let mut manager = KeysetManager::new();

        let ids: Vec<u32> = choices
            .iter()
            .map(|&choice| manager.add(&prf_template(choice), &registry, &rng).unwrap())
            .collect();
        manager.set_primary(ids[primary_index.index(ids.len())]).unwrap();

        let original = manager.handle().unwrap();
        let bytes = original.write(SecretKeyAccess::insecure());
        let reread = KeysetHandle::read(&bytes, SecretKeyAccess::insecure()).unwrap();

        prop_assert_eq!(original.keyset_info(), reread.keyset_info());

        let before = PrfSet::with_registry(&original, &registry).unwrap();
        let after = PrfSet::with_registry(&reread, &registry).unwrap();

        prop_assert_eq!(before.primary_key_id(), after.primary_key_id());
        prop_assert_eq!(
            before.compute_primary(&input, 16).unwrap(),
            after.compute_primary(&input, 16).unwrap()
        );
        for key_id in before.key_ids() {
            prop_assert_eq!(
                before.compute_with_key_id(key_id, &input, 16).unwrap(),
                after.compute_with_key_id(key_id, &input, 16).unwrap()
            );
        }
    }

    #[test]
    fn prop_read_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        if let Ok(handle) = KeysetHandle::read(&bytes, SecretKeyAccess::insecure()) {
            // Structure was accepted, so building a set may only fail on key content
            let _ = PrfSet::new(&handle);
        }
    }

    #[test]
    fn prop_generated_key_ids_are_nonzero(seed in any::<u64>(), choice in any::<u8>()) {
        let handle = KeysetHandle::generate_with(
            &prf_template(choice),
            &Registry::with_prf_key_managers(),
            &SeededRandom::new(seed),
        )
        .unwrap();

        prop_assert_ne!(handle.primary_key_id(), 0);
    }
}

#[test]
fn duplicate_key_id_is_invalid_keyset() {
    let handle = KeysetHandle::generate_with(
        &hmac_sha256_prf_key_template(),
        &Registry::with_prf_key_managers(),
        &SeededRandom::new(40),
    )
    .unwrap();
    let mut keyset = keyset_of(&handle);
    let duplicate = keyset.keys[0].clone();
    keyset.keys.push(duplicate);

    assert_eq!(
        read(&keyset),
        Err(KeysetError::InvalidKeyset(KeysetViolation::DuplicateKeyId {
            key_id: handle.primary_key_id(),
        }))
    );
}

#[test]
fn dangling_primary_is_invalid_keyset() {
    let handle = KeysetHandle::generate_with(
        &hmac_sha256_prf_key_template(),
        &Registry::with_prf_key_managers(),
        &SeededRandom::new(41),
    )
    .unwrap();
    let mut keyset = keyset_of(&handle);
    keyset.primary_key_id = handle.primary_key_id().wrapping_add(1);

    assert!(matches!(
        read(&keyset),
        Err(KeysetError::InvalidKeyset(KeysetViolation::PrimaryNotFound { .. }))
    ));
}

#[test]
fn trailing_bytes_are_invalid_keyset() {
    let handle = KeysetHandle::generate_new(&hmac_sha256_prf_key_template()).unwrap();
    let mut bytes = handle.write(SecretKeyAccess::insecure());
    bytes.push(0x00);

    assert!(matches!(
        KeysetHandle::read(&bytes, SecretKeyAccess::insecure()),
        Err(KeysetError::InvalidKeyset(KeysetViolation::Undecodable(_)))
    ));
}

#[test]
fn disabled_key_is_excluded_but_sibling_works() {
    let registry = Registry::with_prf_key_managers();
    let rng = SeededRandom::new(42);
    let mut manager = KeysetManager::new();

    let primary = manager.add(&hmac_sha256_prf_key_template(), &registry, &rng).unwrap();
    let disabled = manager.add(&hkdf_sha256_prf_key_template(), &registry, &rng).unwrap();
    let sibling = manager.add(&aes_cmac_prf_key_template(), &registry, &rng).unwrap();
    manager.set_primary(primary).unwrap();
    manager.disable(disabled).unwrap();

    let prf_set = PrfSet::with_registry(&manager.handle().unwrap(), &registry).unwrap();

    assert_eq!(prf_set.key_ids(), vec![primary, sibling]);
    assert_eq!(
        prf_set.compute_with_key_id(disabled, b"input", 16),
        Err(KeysetError::KeyNotFound { key_id: disabled })
    );
    assert_eq!(prf_set.compute_with_key_id(sibling, b"input", 16).unwrap().len(), 16);
}

#[test]
fn non_prf_key_is_incompatible() {
    let mut builder = Registry::builder();
    builder.register_prf_key_managers().unwrap();
    builder.register(Arc::new(NotAPrfKeyManager)).unwrap();
    let registry = builder.build();

    let not_a_prf = KeyTemplate {
        type_url: NOT_A_PRF_TYPE_URL.to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Raw,
    };
    let rng = SeededRandom::new(43);
    let mut manager = KeysetManager::new();
    let primary = manager.add(&hmac_sha256_prf_key_template(), &registry, &rng).unwrap();
    let other = manager.add(&not_a_prf, &registry, &rng).unwrap();
    manager.set_primary(primary).unwrap();
    let handle = manager.handle().unwrap();

    assert!(matches!(
        PrfSet::with_registry(&handle, &registry),
        Err(KeysetError::IncompatibleKeyType { key_id, .. }) if key_id == other
    ));

    // Disabling the incompatible key leaves a valid PRF set
    manager.disable(other).unwrap();
    let prf_set = PrfSet::with_registry(&manager.handle().unwrap(), &registry).unwrap();
    assert_eq!(prf_set.key_ids(), vec![primary]);
}

#[test]
fn unregistered_key_type_is_unknown() {
    let keyset = Keyset {
        primary_key_id: 1,
        keys: vec![KeysetKey {
            key_data: KeyData {
                type_url: "type.example/Unregistered".to_string(),
                value: vec![0x01; 32],
                key_material_type: KeyMaterialType::Symmetric,
            },
            status: KeyStatus::Enabled,
            key_id: 1,
            output_prefix_type: OutputPrefixType::Raw,
        }],
    };
    let handle = read(&keyset).unwrap();

    let error = PrfSet::new(&handle).unwrap_err();
    assert!(matches!(error, KeysetError::UnknownKeyType { .. }));
    assert!(error.is_configuration_error());
}

#[test]
fn generate_with_unknown_template_fails() {
    let template = KeyTemplate {
        type_url: "type.example/Unregistered".to_string(),
        value: Vec::new(),
        output_prefix_type: OutputPrefixType::Raw,
    };

    assert!(matches!(
        KeysetHandle::generate_new(&template),
        Err(KeysetError::UnknownKeyType { .. })
    ));
}

#[test]
fn template_with_bad_params_fails() {
    let mut template = hmac_sha256_prf_key_template();
    template.value.truncate(3);

    let error = KeysetHandle::generate_new(&template).unwrap_err();
    assert!(matches!(error, KeysetError::InvalidParams { .. }));
    assert!(!error.is_configuration_error());
}
