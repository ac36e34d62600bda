//! Runtime primitives produced by key managers, and capability filters.
//!
//! A key manager hands back a [`Primitive`]: a tagged value naming what the
//! key can do. Consumers ask for a specific [`Capability`] and get either the
//! typed primitive or nothing, which the primitive set turns into an
//! `IncompatibleKeyType` error.

use std::{any::Any, fmt, sync::Arc};

use prfkit_crypto::Prf;

/// A live primitive built from validated key material.
#[derive(Clone)]
pub enum Primitive {
    /// Pseudo-random function
    Prf(Arc<dyn Prf>),
    /// Primitive of a kind this crate does not consume
    Other {
        /// Human-readable primitive kind
        kind: &'static str,
        /// Type-erased primitive
        primitive: Arc<dyn Any + Send + Sync>,
    },
}

impl Primitive {
    /// Name of the primitive kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prf(_) => PrfCapability::NAME,
            Self::Other { kind, .. } => *kind,
        }
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prf(prf) => f.debug_tuple("Prf").field(prf).finish(),
            Self::Other { kind, .. } => f.debug_struct("Other").field("kind", kind).finish(),
        }
    }
}

/// Capability filter applied while building a primitive set.
pub trait Capability {
    /// Typed primitive handed to callers.
    type Output: ?Sized + Send + Sync;

    /// Capability name, for diagnostics.
    const NAME: &'static str;

    /// Extract the typed primitive, or `None` if `primitive` lacks this
    /// capability.
    fn from_primitive(primitive: Primitive) -> Option<Arc<Self::Output>>;
}

/// The PRF capability.
#[derive(Debug, Clone, Copy)]
pub struct PrfCapability;

impl Capability for PrfCapability {
    type Output = dyn Prf;

    const NAME: &'static str = "PRF";

    fn from_primitive(primitive: Primitive) -> Option<Arc<dyn Prf>> {
        match primitive {
            Primitive::Prf(prf) => Some(prf),
            Primitive::Other { .. } => None,
        }
    }
}
