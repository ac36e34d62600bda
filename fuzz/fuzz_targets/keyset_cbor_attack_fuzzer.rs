//! Fuzz target for CBOR deserialization attacks on keysets
//!
//! Harden keyset and key record decoding against hostile storage.
//!
//! # Strategy
//!
//! - Deeply nested: Arrays/maps nested to arbitrary depth (stack overflow)
//! - Huge lengths: CBOR claiming massive byte/string/array lengths (memory)
//! - Random bytes: Completely arbitrary CBOR data (general malformation)
//! - Type confusion: Valid key records of one type under another type URL
//! - Duplicate keys: CBOR maps with repeated field names
//!
//! # Invariants
//!
//! - Deserialization completes quickly (no infinite loops)
//! - Huge claimed lengths rejected (not allocated)
//! - A keyset that reads successfully satisfies the handle invariants
//! - NEVER panic on malformed CBOR

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use prfkit_core::{
    KeysetHandle, PrfSet, SecretKeyAccess, AES_CMAC_PRF_TYPE_URL, HKDF_PRF_TYPE_URL,
    HMAC_PRF_TYPE_URL,
};
use prfkit_proto::{
    decode, encode, KeyData, KeyMaterialType, KeyStatus, Keyset, KeysetKey, OutputPrefixType,
};

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8, payload_type: PayloadType },
    HugeLength { claimed_len_exponent: u8 },
    RandomBytes { bytes: Vec<u8> },
    TypeConfusion { type_choice: u8, key_bytes: Vec<u8> },
    DuplicateKeys { count: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
enum PayloadType {
    Array,
    Map,
    Bytes,
    String,
}

fuzz_target!(|attack: CborAttack| {
    match attack {
        CborAttack::DeeplyNested { depth, payload_type } => {
            let actual_depth = (depth % 50) as usize;
            read_keyset(&create_nested_cbor(actual_depth, &payload_type));
        }

        CborAttack::HugeLength { claimed_len_exponent } => {
            let exponent = (claimed_len_exponent % 21) as u32;
            let claimed_length = if exponent < 20 { 1u32 << exponent } else { u32::MAX };

            for cbor_bytes in [
                create_huge_byte_string(claimed_length),
                create_huge_text_string(claimed_length),
                create_huge_array(claimed_length),
            ] {
                read_keyset(&cbor_bytes);
            }
        }

        CborAttack::RandomBytes { bytes } => {
            read_keyset(&bytes);
            let _ = decode::<prfkit_proto::KeyTemplate>(&bytes);
        }

        CborAttack::TypeConfusion { type_choice, key_bytes } => {
            let type_url = match type_choice % 3 {
                0 => HMAC_PRF_TYPE_URL,
                1 => HKDF_PRF_TYPE_URL,
                _ => AES_CMAC_PRF_TYPE_URL,
            };
            let keyset = Keyset {
                primary_key_id: 1,
                keys: vec![KeysetKey {
                    key_data: KeyData {
                        type_url: type_url.to_string(),
                        value: key_bytes,
                        key_material_type: KeyMaterialType::Symmetric,
                    },
                    status: KeyStatus::Enabled,
                    key_id: 1,
                    output_prefix_type: OutputPrefixType::Raw,
                }],
            };
            let Ok(bytes) = encode(&keyset) else {
                return;
            };
            read_keyset(&bytes);
        }

        CborAttack::DuplicateKeys { count } => {
            let actual_count = (count % 10).max(2);
            let mut cbor_bytes = vec![0xA0 | actual_count];

            for _ in 0..actual_count {
                cbor_bytes.push(0x6E);
                cbor_bytes.extend_from_slice(b"primary_key_id");
                cbor_bytes.push(0x01);
            }

            read_keyset(&cbor_bytes);
        }
    }
});

fn read_keyset(bytes: &[u8]) {
    let Ok(handle) = KeysetHandle::read(bytes, SecretKeyAccess::insecure()) else {
        return;
    };

    let info = handle.keyset_info();
    let primary = info
        .key_info
        .iter()
        .filter(|key| key.key_id == info.primary_key_id)
        .collect::<Vec<_>>();
    assert_eq!(primary.len(), 1, "accepted keyset must have exactly one primary");
    assert_eq!(primary[0].status, KeyStatus::Enabled, "accepted primary must be enabled");

    if let Ok(prf_set) = PrfSet::new(&handle) {
        assert_eq!(prf_set.primary_key_id(), handle.primary_key_id());
    }
}

fn create_nested_cbor(depth: usize, payload_type: &PayloadType) -> Vec<u8> {
    let mut bytes = Vec::new();

    match payload_type {
        PayloadType::Array => {
            for _ in 0..depth {
                bytes.push(0x81);
            }
            bytes.push(0x01);
        }
        PayloadType::Map => {
            for _ in 0..depth {
                bytes.push(0xA1);
                bytes.push(0x64);
                bytes.extend_from_slice(b"keys");
            }
            bytes.push(0x01);
        }
        PayloadType::Bytes => {
            for _ in 0..depth {
                bytes.push(0x81);
            }
            bytes.push(0x41);
            bytes.push(0x00);
        }
        PayloadType::String => {
            for _ in 0..depth {
                bytes.push(0x81);
            }
            bytes.push(0x61);
            bytes.push(b'x');
        }
    }

    bytes
}

fn create_huge_byte_string(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x5A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    bytes.extend(vec![0xAA; (claimed_length as usize).min(10)]);
    bytes
}

fn create_huge_text_string(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x7A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    bytes.extend(vec![b'x'; (claimed_length as usize).min(10)]);
    bytes
}

fn create_huge_array(claimed_length: u32) -> Vec<u8> {
    let mut bytes = vec![0x9A];
    bytes.extend_from_slice(&claimed_length.to_be_bytes());
    for _ in 0..(claimed_length as usize).min(5) {
        bytes.push(0x01);
    }
    bytes
}
