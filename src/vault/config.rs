//! Vault configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoding::PrivateKeyEncoding;
use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::key_management::DEFAULT_EXTENSION;
use crate::keypair::{
    KeyPairGenerator, DEFAULT_MAX_MODULUS_BITS, DEFAULT_MIN_MODULUS_BITS, RECOMMENDED_MODULUS_BITS,
};

/// Parameters for a [`VaultService`](super::VaultService)
///
/// Missing fields fall back to their defaults when deserialized, so a JSON
/// document only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Directory that receives the encrypted key records
    pub storage_root: PathBuf,
    /// Extension of record files, without the leading dot
    pub file_extension: String,
    /// Encoding of the private key before encryption
    pub key_encoding: PrivateKeyEncoding,
    /// Smallest modulus a caller may request
    pub min_modulus_bits: usize,
    /// Largest modulus a caller may request
    pub max_modulus_bits: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("."),
            file_extension: DEFAULT_EXTENSION.to_string(),
            key_encoding: PrivateKeyEncoding::default(),
            min_modulus_bits: DEFAULT_MIN_MODULUS_BITS,
            max_modulus_bits: DEFAULT_MAX_MODULUS_BITS,
        }
    }
}

impl VaultConfig {
    /// Default configuration storing records under `storage_root`
    pub fn new<P: AsRef<Path>>(storage_root: P) -> Self {
        Self {
            storage_root: storage_root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Configuration that refuses moduli below 2048 bits
    pub fn high_security<P: AsRef<Path>>(storage_root: P) -> Self {
        Self {
            min_modulus_bits: RECOMMENDED_MODULUS_BITS,
            ..Self::new(storage_root)
        }
    }

    /// Parse a JSON configuration document and validate it
    pub fn from_json_str(json: &str) -> CryptoResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            CryptoError::config_error("json", &e.to_string(), error_codes::CONFIG_LOAD_FAILED)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> CryptoResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            CryptoError::config_error(
                &path.display().to_string(),
                &e.to_string(),
                error_codes::CONFIG_LOAD_FAILED,
            )
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> CryptoResult<()> {
        if self.file_extension.is_empty()
            || self
                .file_extension
                .contains(&['.', '/', '\\', '\0'][..])
        {
            return Err(CryptoError::config_error(
                "file_extension",
                &format!("'{}' is not a bare extension", self.file_extension),
                error_codes::INVALID_CONFIG,
            ));
        }
        if self.min_modulus_bits == 0 {
            return Err(CryptoError::config_error(
                "min_modulus_bits",
                "must be positive",
                error_codes::INVALID_CONFIG,
            ));
        }
        if self.min_modulus_bits > self.max_modulus_bits {
            return Err(CryptoError::config_error(
                "min_modulus_bits",
                &format!(
                    "minimum {} exceeds maximum {}",
                    self.min_modulus_bits, self.max_modulus_bits
                ),
                error_codes::INVALID_CONFIG,
            ));
        }
        Ok(())
    }

    pub fn key_pair_generator(&self) -> KeyPairGenerator {
        KeyPairGenerator::new(self.min_modulus_bits, self.max_modulus_bits)
    }
}
