/*!
 * keyvault
 *
 * Generates RSA key pairs and protects the private half at rest: the private
 * key is serialized as PKCS#1, encrypted with AES-128-GCM under a fresh
 * random password and nonce, and written as base64 to a file with a random,
 * collision-resistant name. The caller keeps the public key, the filename,
 * the password and the nonce.
 *
 * The building blocks are:
 *
 * - RSA key pair generation (`keypair`)
 * - AES-GCM authenticated encryption with a detached tag (`aes`)
 * - PKCS#1 and base64 encoding of key material (`encoding`)
 * - A filesystem record store (`key_management`)
 * - The orchestrating service (`vault`)
 */

/// AES-GCM implementation for symmetric encryption
pub mod aes;

/// PKCS#1 and base64 encoding of key material
pub mod encoding;

/// Common error types
pub mod error;

/// On-disk storage of encrypted private keys
pub mod key_management;

/// RSA key pair generation
pub mod keypair;

/// Injectable secure random providers
pub mod random;

/// Secure memory handling utilities
pub mod secure_memory;

/// Key generation, protection and verification service
pub mod vault;

pub use error::{CryptoError, CryptoResult};
pub use keypair::{KeyPairGenerator, RsaKeyPair};
pub use vault::{ProtectedKey, VaultConfig, VaultService};

/// Generate a key pair of `modulus_bits` and protect it under `storage_root`
/// with the default configuration and the operating system's CSPRNG.
///
/// # Example
///
/// ```no_run
/// use keyvault::protect_new_key;
///
/// let protected = protect_new_key(2048, "keys").unwrap();
/// println!("stored private key in {}", protected.filename);
/// ```
pub fn protect_new_key<P: AsRef<std::path::Path>>(
    modulus_bits: usize,
    storage_root: P,
) -> CryptoResult<ProtectedKey> {
    VaultService::new(VaultConfig::new(storage_root))?.protect_new_key(modulus_bits)
}

/// The most commonly used types and functions.
pub mod prelude {
    pub use crate::aes::{decrypt, encrypt, generate_key, AesGcm, EncryptedBlob};
    pub use crate::encoding::{
        decode_from_storage, deserialize_private_key, encode_for_storage, serialize_private_key,
        PrivateKeyEncoding,
    };
    pub use crate::key_management::SecureKeyStore;
    pub use crate::protect_new_key;
    pub use crate::random::{OsRandom, RandomProvider, SeededRandom};
    pub use crate::secure_memory::SecureBytes;
    pub use crate::CryptoError;
    pub use crate::CryptoResult;
    pub use crate::KeyPairGenerator;
    pub use crate::ProtectedKey;
    pub use crate::RsaKeyPair;
    pub use crate::VaultConfig;
    pub use crate::VaultService;
}
