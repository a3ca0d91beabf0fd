/*!
 * Key Management System for encrypted private keys
 *
 * This module implements the on-disk record store used by the vault:
 * collision-resistant filenames, create-new writes, reads for the
 * verification path, and listing.
 */

pub mod storage;

#[cfg(test)]
mod tests;

pub use storage::SecureKeyStore;
pub use storage::DEFAULT_EXTENSION;
pub use storage::FILENAME_PREFIX;
pub use storage::SUFFIX_BYTES;
