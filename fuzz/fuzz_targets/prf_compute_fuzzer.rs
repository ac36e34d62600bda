//! Fuzz target for PRF computation through the full pipeline
//!
//! # Strategy
//!
//! - Arbitrary template choice and key generation seed
//! - Arbitrary input messages (empty, small, large)
//! - Output lengths around and far beyond each primitive's maximum
//! - Lookups of key ids that are not in the set
//!
//! # Invariants
//!
//! - Output is exactly the requested length whenever it is within bounds
//! - Lengths past the maximum fail with OutputTooLong, never pad or truncate
//! - Computation is deterministic for a fixed key
//! - Shorter outputs are prefixes of longer ones
//! - Unknown key ids fail with KeyNotFound

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use prfkit_core::{
    aes_cmac_prf_key_template, hkdf_sha256_prf_key_template, hmac_sha256_prf_key_template,
    hmac_sha512_prf_key_template, KeysetError, KeysetHandle, PrfSet, Registry, SeededRandom,
};

#[derive(Debug, Clone, Arbitrary)]
struct PrfScenario {
    template_choice: u8,
    seed: u64,
    input: Vec<u8>,
    output_length: u16,
    other_key_id: u32,
}

fuzz_target!(|scenario: PrfScenario| {
    let template = match scenario.template_choice % 4 {
        0 => hmac_sha256_prf_key_template(),
        1 => hmac_sha512_prf_key_template(),
        2 => hkdf_sha256_prf_key_template(),
        _ => aes_cmac_prf_key_template(),
    };

    let registry = Registry::global();
    let rng = SeededRandom::new(scenario.seed);
    let Ok(handle) = KeysetHandle::generate_with(&template, registry, &rng) else {
        panic!("fixed templates must always generate");
    };
    let Ok(prf_set) = PrfSet::with_registry(&handle, registry) else {
        panic!("generated keysets must always build a PRF set");
    };

    let primary = prf_set.primary_key_id();
    let Ok(max) = prf_set.max_output_length(primary) else {
        panic!("primary key must be in the set");
    };
    let length = scenario.output_length as usize;

    match prf_set.compute_primary(&scenario.input, length) {
        Ok(output) => {
            assert!(length <= max);
            assert_eq!(output.len(), length);

            let again = prf_set.compute_primary(&scenario.input, length);
            assert_eq!(again.as_ref(), Ok(&output), "PRF must be deterministic");

            let half = prf_set.compute_primary(&scenario.input, length / 2);
            assert_eq!(half.as_deref(), Ok(&output[..length / 2]), "prefix property");
        }
        Err(KeysetError::OutputTooLong { requested, max: reported, key_id }) => {
            assert!(length > max);
            assert_eq!((requested, reported, key_id), (length, max, primary));
        }
        Err(other) => panic!("unexpected error: {other}"),
    }

    if scenario.other_key_id != primary {
        assert_eq!(
            prf_set.compute_with_key_id(scenario.other_key_id, &scenario.input, 1),
            Err(KeysetError::KeyNotFound { key_id: scenario.other_key_id })
        );
    }
});
