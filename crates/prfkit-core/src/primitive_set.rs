//! Primitive sets: the live primitives behind a keyset handle.
//!
//! [`primitives_for`] resolves every enabled key of a handle through the
//! registry and keeps those that provide the requested capability. It is
//! all or nothing: one unknown, malformed or incompatible enabled key fails
//! the whole construction, and no partial set is ever returned.

use std::{collections::HashMap, fmt, sync::Arc};

use prfkit_proto::{KeyStatus, OutputPrefixType};

use crate::{
    error::{KeysetError, KeysetViolation, Result},
    keyset::KeysetHandle,
    primitive::Capability,
    registry::Registry,
};

/// One enabled key and its primitive.
pub struct PrimitiveEntry<P: ?Sized> {
    key_id: u32,
    type_url: String,
    output_prefix_type: OutputPrefixType,
    primitive: Arc<P>,
}

impl<P: ?Sized> PrimitiveEntry<P> {
    /// Key id within the keyset.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Key type the primitive was built from.
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    /// Output prefix type of the key.
    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.output_prefix_type
    }

    /// The primitive.
    pub fn primitive(&self) -> &Arc<P> {
        &self.primitive
    }
}

impl<P: ?Sized> Clone for PrimitiveEntry<P> {
    fn clone(&self) -> Self {
        Self {
            key_id: self.key_id,
            type_url: self.type_url.clone(),
            output_prefix_type: self.output_prefix_type,
            primitive: Arc::clone(&self.primitive),
        }
    }
}

impl<P: ?Sized> fmt::Debug for PrimitiveEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveEntry")
            .field("key_id", &self.key_id)
            .field("type_url", &self.type_url)
            .field("output_prefix_type", &self.output_prefix_type)
            .finish_non_exhaustive()
    }
}

/// Enabled keys of a keyset, resolved to primitives of one capability.
///
/// # Invariants
///
/// - Holds exactly the enabled keys of the source keyset, in keyset order
/// - The primary key is always present
pub struct PrimitiveSet<P: ?Sized> {
    entries: Vec<PrimitiveEntry<P>>,
    /// Key id → index into `entries`
    index: HashMap<u32, usize>,
    primary: usize,
}

impl<P: ?Sized> PrimitiveSet<P> {
    /// The primary key's entry.
    pub fn primary(&self) -> &PrimitiveEntry<P> {
        &self.entries[self.primary]
    }

    /// Entry for `key_id`. `None` if the key is absent or not enabled.
    pub fn entry(&self, key_id: u32) -> Option<&PrimitiveEntry<P>> {
        self.index.get(&key_id).map(|&i| &self.entries[i])
    }

    /// All entries, in keyset order.
    pub fn entries(&self) -> &[PrimitiveEntry<P>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a set holds at least its primary.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized> Clone for PrimitiveSet<P> {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone(), index: self.index.clone(), primary: self.primary }
    }
}

impl<P: ?Sized> fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("primary_key_id", &self.primary().key_id)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Build the primitive set of capability `C` for `handle`.
///
/// Disabled and destroyed keys are skipped. Every enabled key must resolve.
///
/// # Errors
///
/// - `UnknownKeyType` if an enabled key's type URL is not registered
/// - `MalformedKey` if a manager rejects an enabled key's material
/// - `IncompatibleKeyType` if an enabled key's primitive lacks capability `C`
///
/// Key type and key material errors name the offending key id.
pub fn primitives_for<C: Capability>(
    handle: &KeysetHandle,
    registry: &Registry,
) -> Result<PrimitiveSet<C::Output>> {
    let keyset = handle.keyset();
    let mut entries = Vec::with_capacity(keyset.keys.len());
    let mut index = HashMap::with_capacity(keyset.keys.len());

    for key in &keyset.keys {
        if key.status != KeyStatus::Enabled {
            tracing::debug!(key_id = key.key_id, status = ?key.status, "skipping key");
            continue;
        }

        let type_url = &key.key_data.type_url;
        let primitive =
            registry.primitive(&key.key_data).map_err(|e| e.with_key_id(key.key_id))?;
        let kind = primitive.kind();

        let Some(primitive) = C::from_primitive(primitive) else {
            return Err(KeysetError::IncompatibleKeyType {
                type_url: type_url.clone(),
                key_id: key.key_id,
                reason: format!("{kind} primitive does not provide {}", C::NAME),
            });
        };

        index.insert(key.key_id, entries.len());
        entries.push(PrimitiveEntry {
            key_id: key.key_id,
            type_url: type_url.clone(),
            output_prefix_type: key.output_prefix_type,
            primitive,
        });
    }

    let primary_key_id = keyset.primary_key_id;
    let Some(&primary) = index.get(&primary_key_id) else {
        return Err(KeysetViolation::PrimaryNotFound { primary_key_id }.into());
    };

    tracing::debug!(
        capability = C::NAME,
        keys = entries.len(),
        primary_key_id,
        "built primitive set"
    );

    Ok(PrimitiveSet { entries, index, primary })
}
