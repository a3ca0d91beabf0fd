use ::aes::Aes128;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Nonce, Tag};
use rand::{CryptoRng, RngCore};
use std::sync::Arc;

use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::random::random_bytes;
use crate::secure_memory::SecureBytes;

/// Symmetric key size in bytes (AES-128)
pub const KEY_SIZE: usize = 16;

/// Nonce size in bytes
pub const NONCE_SIZE: usize = 16;

/// Authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// AES-128 in GCM mode with a 128-bit nonce and a 128-bit tag
type Aes128Gcm16 = aes_gcm::AesGcm<Aes128, U16>;

/// Output of a detached authenticated encryption.
///
/// The tag binds exactly this ciphertext under this nonce; all three are
/// needed to decrypt.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("nonce", &hex::encode(self.nonce))
            .field("ciphertext_len", &self.ciphertext.len())
            .field("tag", &hex::encode(self.tag))
            .finish()
    }
}

/// AES-128-GCM cipher for authenticated encryption with a detached tag
///
/// Confidentiality comes from AES-128 in counter mode, integrity from the
/// GHASH-based tag. Decryption verifies the tag in constant time and
/// releases no plaintext when verification fails.
///
/// # Examples
///
/// ```
/// use keyvault::aes::AesGcm;
///
/// let key = [0x42; 16];
/// let cipher = AesGcm::new(&key).unwrap();
///
/// let nonce = [0x24; 16];
/// let (ciphertext, tag) = cipher.encrypt_detached(b"Secret message", &nonce).unwrap();
///
/// let decrypted = cipher.decrypt_detached(&ciphertext, &nonce, &tag).unwrap();
/// assert_eq!(decrypted.as_bytes(), b"Secret message");
/// ```
#[derive(Clone)]
pub struct AesGcm {
    cipher: Arc<Aes128Gcm16>,
}

impl std::fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcm")
            .field("cipher", &"[AES-128-GCM Cipher]")
            .finish()
    }
}

impl AesGcm {
    /// Create a new AES-GCM cipher with the given key
    ///
    /// # Errors
    ///
    /// Returns `KeySizeError` if the key is not exactly 16 bytes long. The
    /// key is never truncated or padded.
    pub fn new(key: &[u8]) -> CryptoResult<Self> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::key_size_error(KEY_SIZE, key.len()));
        }

        let cipher = Aes128Gcm16::new_from_slice(key)
            .map_err(|_| CryptoError::key_size_error(KEY_SIZE, key.len()))?;

        Ok(Self {
            cipher: Arc::new(cipher),
        })
    }

    /// Generate a random 16-byte nonce
    pub fn generate_nonce<R: RngCore + CryptoRng>(rng: &mut R) -> CryptoResult<[u8; NONCE_SIZE]> {
        let mut nonce = [0u8; NONCE_SIZE];
        rng.try_fill_bytes(&mut nonce)?;
        Ok(nonce)
    }

    /// Encrypt plaintext, returning the ciphertext and the detached tag
    ///
    /// The nonce must never be reused under the same key.
    pub fn encrypt_detached(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
    ) -> CryptoResult<(Vec<u8>, [u8; TAG_SIZE])> {
        check_nonce(nonce)?;

        let nonce = Nonce::<U16>::from_slice(nonce);
        let mut buffer = plaintext.to_vec();

        let tag = self
            .cipher
            .encrypt_in_place_detached(nonce, b"", &mut buffer)
            .map_err(|e| {
                CryptoError::integrity_error(
                    "encrypt",
                    &format!("AES-GCM encryption failed: {}", e),
                    error_codes::ENCRYPTION_FAILED,
                )
            })?;

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(tag.as_slice());
        Ok((buffer, tag_bytes))
    }

    /// Decrypt and authenticate a ciphertext with its detached tag
    ///
    /// The working buffer is a `SecureBytes`, so when the tag does not match
    /// the partially processed data is zeroed on drop and never returned.
    ///
    /// # Errors
    ///
    /// * `FormatError` if the nonce or tag has the wrong length
    /// * `IntegrityError` if the ciphertext, tag, nonce or key do not match
    pub fn decrypt_detached(
        &self,
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
    ) -> CryptoResult<SecureBytes> {
        check_nonce(nonce)?;
        if tag.len() != TAG_SIZE {
            return Err(CryptoError::format_error(
                "decrypt",
                &format!("tag must be {} bytes, got {}", TAG_SIZE, tag.len()),
                error_codes::INVALID_TAG_SIZE,
            ));
        }

        let nonce = Nonce::<U16>::from_slice(nonce);
        let tag = Tag::<U16>::from_slice(tag);
        let mut buffer = SecureBytes::new(ciphertext);

        match self
            .cipher
            .decrypt_in_place_detached(nonce, b"", buffer.as_bytes_mut(), tag)
        {
            Ok(()) => Ok(buffer),
            Err(_) => {
                log::warn!("AES-GCM tag verification failed; discarding output");
                Err(CryptoError::integrity_error(
                    "decrypt",
                    "authentication tag mismatch",
                    error_codes::AUTHENTICATION_FAILED,
                ))
            }
        }
    }
}

fn check_nonce(nonce: &[u8]) -> CryptoResult<()> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::format_error(
            "nonce",
            &format!("nonce must be {} bytes, got {}", NONCE_SIZE, nonce.len()),
            error_codes::INVALID_NONCE_SIZE,
        ));
    }
    Ok(())
}

/// Generate a fresh symmetric key of `size_bytes` from a secure RNG
///
/// # Errors
///
/// Returns `GenerationError` with `EMPTY_KEY_REQUEST` for a zero-length
/// request.
pub fn generate_key<R: RngCore + CryptoRng>(rng: &mut R, size_bytes: usize) -> CryptoResult<SecureBytes> {
    if size_bytes == 0 {
        return Err(CryptoError::generation_error(
            "generate symmetric key",
            "requested key length is zero",
            error_codes::EMPTY_KEY_REQUEST,
        ));
    }
    random_bytes(rng, size_bytes)
}

/// Encrypt `plaintext` under `key` with a nonce drawn from `rng`
///
/// The nonce is generated here and returned in the blob; callers cannot
/// supply their own, so every call uses a fresh one.
///
/// # Examples
///
/// ```
/// use keyvault::aes::{decrypt, encrypt};
/// use keyvault::random::{OsRandom, RandomProvider};
///
/// let key = [0x42; 16];
/// let blob = encrypt(&mut OsRandom.rng(), &key, b"Top secret information").unwrap();
///
/// let decrypted = decrypt(&key, &blob.nonce, &blob.ciphertext, &blob.tag).unwrap();
/// assert_eq!(decrypted.as_bytes(), b"Top secret information");
/// ```
pub fn encrypt<R: RngCore + CryptoRng>(
    rng: &mut R,
    key: &[u8],
    plaintext: &[u8],
) -> CryptoResult<EncryptedBlob> {
    let cipher = AesGcm::new(key)?;
    let nonce = AesGcm::generate_nonce(rng)?;
    let (ciphertext, tag) = cipher.encrypt_detached(plaintext, &nonce)?;
    Ok(EncryptedBlob {
        nonce,
        ciphertext,
        tag,
    })
}

/// Decrypt and verify; fails closed with `IntegrityError` on any mismatch
pub fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> CryptoResult<SecureBytes> {
    let cipher = AesGcm::new(key)?;
    cipher.decrypt_detached(ciphertext, nonce, tag)
}
