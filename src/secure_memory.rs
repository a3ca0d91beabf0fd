//! Secure Memory Handling Utilities
//!
//! Containers for secret byte material (symmetric passwords, serialized
//! private keys, decrypted plaintext) that are zeroed when dropped and never
//! print their contents.

use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A container for sensitive byte data that is zeroed when dropped.
///
/// `SecureBytes` holds secrets such as the vault password or the PKCS#1
/// encoding of a private key while they are in memory.
///
/// # Security Properties
///
/// 1. Automatically zeroes memory when dropped
/// 2. `Debug` output is redacted
/// 3. Equality is evaluated in constant time
///
/// # Example
///
/// ```
/// use keyvault::secure_memory::SecureBytes;
///
/// let password = SecureBytes::new(&[0x01, 0x02, 0x03, 0x04]);
/// assert_eq!(password.len(), 4);
/// assert_eq!(format!("{:?}", password), "SecureBytes([REDACTED; 4])");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureBytes {
    bytes: Vec<u8>,
}

impl SecureBytes {
    /// Create a new SecureBytes holding a copy of `data`
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: data.to_vec(),
        }
    }

    /// Create a zero-filled SecureBytes of the given length
    ///
    /// Used as a destination buffer for random or decrypted bytes so the
    /// secret never lives in an unprotected allocation.
    pub fn zeroed(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len],
        }
    }

    /// Get a reference to the underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get a mutable reference to the underlying bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Encode the bytes as lowercase hex.
    ///
    /// The returned string is not protected; callers that print a password
    /// for the user take responsibility for it.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Get the current length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBytes([REDACTED; {}])", self.bytes.len())
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        if self.bytes.len() != other.bytes.len() {
            return false;
        }
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for SecureBytes {}

impl From<Vec<u8>> for SecureBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
