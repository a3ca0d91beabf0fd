/*!
 * RSA key pair generation
 *
 * Thin wrapper around `rsa::RsaPrivateKey::new` that enforces the modulus
 * bounds configured for the vault and keeps the two halves of a key pair
 * together.
 */

use rand::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::{error_codes, CryptoError, CryptoResult};

/// Smallest modulus accepted by default. Functionally valid, not secure.
pub const DEFAULT_MIN_MODULUS_BITS: usize = 512;

/// Largest modulus accepted by default
pub const DEFAULT_MAX_MODULUS_BITS: usize = 16384;

/// Modulus size recommended for production keys
pub const RECOMMENDED_MODULUS_BITS: usize = 2048;

/// An RSA public/private key pair sharing one modulus.
///
/// Only [`KeyPairGenerator::generate`] creates these, so the halves are
/// always mathematically paired.
pub struct RsaKeyPair {
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("modulus_bits", &self.modulus_bits())
            .field("public_exponent", &self.public_key.e())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl RsaKeyPair {
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn modulus(&self) -> &BigUint {
        self.public_key.n()
    }

    pub fn modulus_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    /// Split the pair so the private half can be dropped as early as possible.
    ///
    /// `RsaPrivateKey` zeroizes its components when dropped.
    pub fn into_parts(self) -> (RsaPublicKey, RsaPrivateKey) {
        (self.public_key, self.private_key)
    }
}

/// Generates RSA key pairs within a configured modulus range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPairGenerator {
    min_modulus_bits: usize,
    max_modulus_bits: usize,
}

impl Default for KeyPairGenerator {
    fn default() -> Self {
        Self {
            min_modulus_bits: DEFAULT_MIN_MODULUS_BITS,
            max_modulus_bits: DEFAULT_MAX_MODULUS_BITS,
        }
    }
}

impl KeyPairGenerator {
    pub fn new(min_modulus_bits: usize, max_modulus_bits: usize) -> Self {
        Self {
            min_modulus_bits,
            max_modulus_bits,
        }
    }

    /// Check a requested modulus size against the configured bounds
    pub fn check_modulus_bits(&self, modulus_bits: usize) -> CryptoResult<()> {
        if modulus_bits == 0 || modulus_bits < self.min_modulus_bits {
            return Err(CryptoError::generation_error(
                "validate modulus size",
                &format!(
                    "{} bits requested, minimum is {}",
                    modulus_bits, self.min_modulus_bits
                ),
                error_codes::MODULUS_TOO_SMALL,
            ));
        }
        if modulus_bits > self.max_modulus_bits {
            return Err(CryptoError::generation_error(
                "validate modulus size",
                &format!(
                    "{} bits requested, maximum is {}",
                    modulus_bits, self.max_modulus_bits
                ),
                error_codes::MODULUS_TOO_LARGE,
            ));
        }
        Ok(())
    }

    /// Generate a fresh key pair whose modulus is `modulus_bits` long
    ///
    /// # Errors
    ///
    /// `GenerationError` if the size is outside the configured bounds, if
    /// the underlying primitive fails, or if the produced modulus differs
    /// from the request by more than one bit.
    pub fn generate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        modulus_bits: usize,
    ) -> CryptoResult<RsaKeyPair> {
        self.check_modulus_bits(modulus_bits)?;

        let private_key = RsaPrivateKey::new(rng, modulus_bits).map_err(|e| {
            CryptoError::generation_error(
                "RSA key generation",
                &format!("Failed to generate RSA key: {}", e),
                error_codes::GENERATION_FAILED,
            )
        })?;
        let public_key = RsaPublicKey::from(&private_key);

        let actual_bits = public_key.n().bits();
        if actual_bits.abs_diff(modulus_bits) > 1 {
            return Err(CryptoError::generation_error(
                "RSA key generation",
                &format!(
                    "modulus has {} bits, {} were requested",
                    actual_bits, modulus_bits
                ),
                error_codes::GENERATION_FAILED,
            ));
        }

        Ok(RsaKeyPair {
            public_key,
            private_key,
        })
    }
}
