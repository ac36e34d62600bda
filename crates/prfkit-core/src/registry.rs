//! Key manager registry: type URL → key manager.
//!
//! Registration happens on a [`RegistryBuilder`] during startup. `build()`
//! freezes the result into a [`Registry`], which has no mutation API and can
//! be shared across threads without locking. [`Registry::global`] is the
//! process-wide instance holding the PRF key managers.
//!
//! # Invariants
//!
//! - A type URL maps to at most one key manager
//! - Registering the same manager implementation twice is a no-op
//! - A frozen registry never changes

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock},
};

use prfkit_proto::{KeyData, KeyTemplate};

use crate::{
    env::RandomSource,
    error::{KeysetError, Result},
    managers::{KeyManager, prf_key_managers},
    primitive::Primitive,
};

/// Collects key managers before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    managers: HashMap<&'static str, Arc<dyn KeyManager>>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key manager under its type URL.
    ///
    /// Re-registering the same manager implementation is accepted and leaves
    /// the existing entry in place.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if a different implementation owns the type URL
    pub fn register(&mut self, manager: Arc<dyn KeyManager>) -> Result<&mut Self> {
        let type_url = manager.type_url();

        if let Some(existing) = self.managers.get(type_url) {
            if same_implementation(existing.as_ref(), manager.as_ref()) {
                tracing::debug!(type_url, "key manager already registered");
                return Ok(self);
            }

            tracing::warn!(type_url, "refusing to replace registered key manager");
            return Err(KeysetError::AlreadyRegistered { type_url: type_url.to_string() });
        }

        tracing::debug!(type_url, "registered key manager");
        self.managers.insert(type_url, manager);
        Ok(self)
    }

    /// Register the HMAC, HKDF and AES-CMAC PRF key managers.
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if another implementation already owns one of
    ///   their type URLs
    pub fn register_prf_key_managers(&mut self) -> Result<&mut Self> {
        for manager in prf_key_managers() {
            self.register(manager)?;
        }
        Ok(self)
    }

    /// Freeze the registered managers.
    pub fn build(self) -> Registry {
        Registry { managers: Arc::new(self.managers) }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder").field("type_urls", &sorted_urls(&self.managers)).finish()
    }
}

/// Frozen mapping from type URL to key manager.
///
/// Cloning is cheap and shares the underlying map.
#[derive(Clone)]
pub struct Registry {
    managers: Arc<HashMap<&'static str, Arc<dyn KeyManager>>>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A new registry holding only the PRF key managers.
    pub fn with_prf_key_managers() -> Self {
        let mut builder = RegistryBuilder::new();
        let Ok(_) = builder.register_prf_key_managers() else {
            unreachable!("PRF key managers have distinct type URLs");
        };
        builder.build()
    }

    /// Process-wide registry holding the PRF key managers.
    ///
    /// Built on first use and frozen afterwards.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_prf_key_managers)
    }

    /// Key manager for `type_url`.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if nothing is registered for `type_url`
    pub fn key_manager(&self, type_url: &str) -> Result<&dyn KeyManager> {
        self.managers
            .get(type_url)
            .map(|manager| &**manager)
            .ok_or_else(|| KeysetError::unknown_key_type(type_url))
    }

    /// Returns true if a manager is registered for `type_url`.
    pub fn contains(&self, type_url: &str) -> bool {
        self.managers.contains_key(type_url)
    }

    /// Registered type URLs, sorted.
    pub fn type_urls(&self) -> Vec<&'static str> {
        sorted_urls(&self.managers)
    }

    /// Number of registered managers.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Returns true if no managers are registered.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Generate fresh key material for `template`.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if the template's type URL is not registered
    /// - `InvalidParams` if the manager rejects the template's key format
    pub fn new_key_data(&self, template: &KeyTemplate, rng: &dyn RandomSource) -> Result<KeyData> {
        self.key_manager(&template.type_url)?.new_key_data(&template.value, rng)
    }

    /// Build the primitive for `key_data` through its manager.
    ///
    /// # Errors
    ///
    /// - `UnknownKeyType` if the key's type URL is not registered
    /// - `MalformedKey` if the manager rejects the key material
    pub fn primitive(&self, key_data: &KeyData) -> Result<Primitive> {
        self.key_manager(&key_data.type_url)?.primitive(&key_data.value)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("type_urls", &self.type_urls()).finish()
    }
}

fn same_implementation(a: &dyn KeyManager, b: &dyn KeyManager) -> bool {
    let a: &dyn Any = a;
    let b: &dyn Any = b;
    Any::type_id(a) == Any::type_id(b)
}

fn sorted_urls(managers: &HashMap<&'static str, Arc<dyn KeyManager>>) -> Vec<&'static str> {
    let mut urls: Vec<_> = managers.keys().copied().collect();
    urls.sort_unstable();
    urls
}

#[cfg(test)]
mod tests {
    use prfkit_proto::KeyMaterialType;

    use super::*;
    use crate::{
        env::SeededRandom,
        managers::{
            AES_CMAC_PRF_TYPE_URL, HKDF_PRF_TYPE_URL, HMAC_PRF_TYPE_URL, HmacPrfKeyManager,
        },
        templates::hmac_sha256_prf_key_template,
    };

    /// Claims the HMAC-PRF type URL without being the HMAC-PRF manager.
    #[derive(Debug)]
    struct Impostor;

    impl KeyManager for Impostor {
        fn type_url(&self) -> &'static str {
            HMAC_PRF_TYPE_URL
        }

        fn key_material_type(&self) -> KeyMaterialType {
            KeyMaterialType::Symmetric
        }

        fn validate_key_format(&self, _: &[u8]) -> Result<()> {
            Ok(())
        }

        fn new_key(&self, _: &[u8], _: &dyn RandomSource) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn validate_key(&self, _: &[u8]) -> Result<()> {
            Ok(())
        }

        fn primitive(&self, _: &[u8]) -> Result<Primitive> {
            Ok(Primitive::Other { kind: "NOTHING", primitive: Arc::new(()) })
        }
    }

    #[test]
    fn reregistering_same_manager_is_idempotent() {
        let mut builder = Registry::builder();
        builder.register(Arc::new(HmacPrfKeyManager)).unwrap();
        builder.register(Arc::new(HmacPrfKeyManager)).unwrap();

        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn different_manager_for_same_url_is_rejected() {
        let mut builder = Registry::builder();
        builder.register(Arc::new(HmacPrfKeyManager)).unwrap();

        let result = builder.register(Arc::new(Impostor));
        assert!(matches!(
            result,
            Err(KeysetError::AlreadyRegistered { type_url }) if type_url == HMAC_PRF_TYPE_URL
        ));
    }

    #[test]
    fn prf_managers_fail_over_impostor() {
        let mut builder = Registry::builder();
        builder.register(Arc::new(Impostor)).unwrap();

        assert!(builder.register_prf_key_managers().is_err());
    }

    #[test]
    fn unknown_type_url_is_reported() {
        let registry = Registry::builder().build();
        let result = registry.key_manager(HMAC_PRF_TYPE_URL);

        assert!(matches!(result, Err(KeysetError::UnknownKeyType { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn global_registry_holds_prf_managers() {
        let registry = Registry::global();

        assert_eq!(
            registry.type_urls(),
            vec![AES_CMAC_PRF_TYPE_URL, HKDF_PRF_TYPE_URL, HMAC_PRF_TYPE_URL]
        );
        assert!(std::ptr::eq(registry, Registry::global()));
    }

    #[test]
    fn new_key_data_goes_through_manager() {
        let registry = Registry::with_prf_key_managers();
        let key_data =
            registry.new_key_data(&hmac_sha256_prf_key_template(), &SeededRandom::new(5)).unwrap();

        assert_eq!(key_data.type_url, HMAC_PRF_TYPE_URL);
        assert_eq!(key_data.key_material_type, KeyMaterialType::Symmetric);
        assert!(matches!(registry.primitive(&key_data), Ok(Primitive::Prf(_))));
    }

    #[test]
    fn template_for_unregistered_type_fails() {
        let registry = Registry::builder().build();
        let result = registry.new_key_data(&hmac_sha256_prf_key_template(), &SeededRandom::new(5));

        assert!(matches!(result, Err(KeysetError::UnknownKeyType { .. })));
    }

    #[test]
    fn debug_lists_type_urls() {
        let debug = format!("{:?}", Registry::with_prf_key_managers());
        assert!(debug.contains(HKDF_PRF_TYPE_URL));
    }
}
