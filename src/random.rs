//! Secure random providers.
//!
//! Every operation in the vault draws its randomness from a [`RandomProvider`]
//! handed to it explicitly, never from ambient global state. Production code
//! uses [`OsRandom`]; tests can substitute [`SeededRandom`] to get
//! reproducible key pairs, passwords, nonces and filenames.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::CryptoResult;
use crate::secure_memory::SecureBytes;

/// Source of cryptographically secure random number generators.
///
/// `rng` is called once per vault operation; each call hands out an
/// independent generator so concurrent operations never share RNG state.
pub trait RandomProvider: Send + Sync {
    type Rng: RngCore + CryptoRng;

    fn rng(&self) -> Self::Rng;
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomProvider for OsRandom {
    type Rng = OsRng;

    fn rng(&self) -> OsRng {
        OsRng
    }
}

/// Deterministic ChaCha20 generators derived from a fixed seed.
///
/// Each call to [`RandomProvider::rng`] selects a fresh ChaCha20 stream, so
/// successive operations see different (but reproducible) output.
/// Only suitable for tests and benchmarks.
#[derive(Debug)]
pub struct SeededRandom {
    seed: u64,
    next_stream: AtomicU64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            next_stream: AtomicU64::new(0),
        }
    }
}

impl RandomProvider for SeededRandom {
    type Rng = ChaCha20Rng;

    fn rng(&self) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        rng.set_stream(self.next_stream.fetch_add(1, Ordering::Relaxed));
        rng
    }
}

/// Generate `length` random bytes into a zeroizing buffer
pub fn random_bytes<R: RngCore + CryptoRng>(rng: &mut R, length: usize) -> CryptoResult<SecureBytes> {
    let mut bytes = SecureBytes::zeroed(length);
    rng.try_fill_bytes(bytes.as_bytes_mut())?;
    Ok(bytes)
}
