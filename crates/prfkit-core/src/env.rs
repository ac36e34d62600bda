//! Randomness abstraction for key generation.
//!
//! Decouples key generation from the system entropy source. Production code
//! uses [`SystemRandom`] (OS RNG); tests and simulations use
//! [`SeededRandom`] so that generated keys and key ids are reproducible.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of random bytes for key material and key ids.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `fill_bytes()` uses cryptographically secure entropy in production
/// - `fill_bytes()` fills the entire buffer
pub trait RandomSource: Send + Sync {
    /// Fills the provided buffer with random bytes.
    fn fill_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u32`.
    ///
    /// Used for key ids.
    fn random_u32(&self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }
}

/// Production randomness from the operating system.
///
/// # Panics
///
/// Panics if the OS RNG fails. Key generation without functioning
/// cryptographic randomness would produce predictable keys, so there is no
/// safe way to continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    #[allow(clippy::expect_used)]
    fn fill_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - keys cannot be generated securely");
    }
}

/// Deterministic ChaCha20 randomness for tests and simulation.
///
/// Two sources built from the same seed produce the same byte sequence. Never
/// use this for keys that protect real data.
pub struct SeededRandom {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededRandom {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, buffer: &mut [u8]) {
        // A panic mid-fill cannot leave the generator in a state we care about
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.fill_bytes(buffer);
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}
