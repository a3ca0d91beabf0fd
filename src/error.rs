/*!
 * Error Handling for the keyvault crate
 *
 * Every stage of the generate → encrypt → persist → verify workflow reports
 * its own error variant, so callers can tell a usage error (bad size, bad
 * path) apart from a security event (integrity failure during verification).
 */

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Error type for all key vault operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key pair generation failed: {operation} - {cause}")]
    GenerationError {
        operation: String,
        cause: String,
        error_code: u32,
    },

    #[error("Invalid symmetric key size: expected {expected} bytes, got {actual}")]
    KeySizeError {
        expected: usize,
        actual: usize,
        error_code: u32,
    },

    #[error("Integrity check failed: {operation} - {cause}")]
    IntegrityError {
        operation: String,
        cause: String,
        error_code: u32,
    },

    #[error("Malformed data: {operation} - {cause}")]
    FormatError {
        operation: String,
        cause: String,
        error_code: u32,
    },

    #[error("Storage operation failed: {operation} on {path} - {cause}")]
    StorageError {
        operation: String,
        path: String,
        cause: String,
        error_code: u32,
    },

    #[error("Random number generation failed: {cause}")]
    RandomGenerationError { cause: String, error_code: u32 },

    #[error("Invalid configuration: {parameter} - {cause}")]
    ConfigError {
        parameter: String,
        cause: String,
        error_code: u32,
    },
}

/// Error code constants for different error categories
pub mod error_codes {
    // Key pair generation errors: 1000-1999
    pub const GENERATION_FAILED: u32 = 1001;
    pub const MODULUS_TOO_SMALL: u32 = 1002;
    pub const MODULUS_TOO_LARGE: u32 = 1003;
    pub const EMPTY_KEY_REQUEST: u32 = 1004;

    // Symmetric cipher errors: 2000-2999
    pub const INVALID_KEY_SIZE: u32 = 2001;
    pub const ENCRYPTION_FAILED: u32 = 2002;
    pub const AUTHENTICATION_FAILED: u32 = 2003;
    pub const KEY_PAIR_MISMATCH: u32 = 2004;

    // Format errors: 3000-3999
    pub const INVALID_BASE64: u32 = 3001;
    pub const INVALID_PRIVATE_KEY: u32 = 3002;
    pub const PRIVATE_KEY_ENCODING_FAILED: u32 = 3003;
    pub const INVALID_NONCE_SIZE: u32 = 3004;
    pub const INVALID_TAG_SIZE: u32 = 3005;
    pub const TRUNCATED_BLOB: u32 = 3006;

    // Storage errors: 4000-4999
    pub const STORAGE_CREATE_FAILED: u32 = 4001;
    pub const STORAGE_WRITE_FAILED: u32 = 4002;
    pub const STORAGE_READ_FAILED: u32 = 4003;
    pub const STORAGE_FILE_EXISTS: u32 = 4004;
    pub const STORAGE_INVALID_NAME: u32 = 4005;
    pub const STORAGE_LIST_FAILED: u32 = 4006;

    // Randomness and configuration errors: 5000-5999
    pub const INSUFFICIENT_ENTROPY: u32 = 5001;
    pub const INVALID_CONFIG: u32 = 5002;
    pub const CONFIG_LOAD_FAILED: u32 = 5003;
}

impl CryptoError {
    /// Get the numeric error code for this error
    pub fn error_code(&self) -> u32 {
        match self {
            CryptoError::GenerationError { error_code, .. } => *error_code,
            CryptoError::KeySizeError { error_code, .. } => *error_code,
            CryptoError::IntegrityError { error_code, .. } => *error_code,
            CryptoError::FormatError { error_code, .. } => *error_code,
            CryptoError::StorageError { error_code, .. } => *error_code,
            CryptoError::RandomGenerationError { error_code, .. } => *error_code,
            CryptoError::ConfigError { error_code, .. } => *error_code,
        }
    }

    /// Get the error category/type as a string
    pub fn error_type(&self) -> &'static str {
        match self {
            CryptoError::GenerationError { .. } => "GenerationError",
            CryptoError::KeySizeError { .. } => "KeySizeError",
            CryptoError::IntegrityError { .. } => "IntegrityError",
            CryptoError::FormatError { .. } => "FormatError",
            CryptoError::StorageError { .. } => "StorageError",
            CryptoError::RandomGenerationError { .. } => "RandomGenerationError",
            CryptoError::ConfigError { .. } => "ConfigError",
        }
    }

    /// Whether this error indicates tampering, a wrong password/nonce, or a
    /// corrupted record rather than a caller mistake.
    pub fn is_security_event(&self) -> bool {
        matches!(self, CryptoError::IntegrityError { .. })
    }

    /// Whether the caller can fix this error by changing its inputs
    pub fn is_usage_error(&self) -> bool {
        match self {
            CryptoError::KeySizeError { .. } | CryptoError::ConfigError { .. } => true,
            CryptoError::GenerationError { error_code, .. } => matches!(
                *error_code,
                error_codes::MODULUS_TOO_SMALL
                    | error_codes::MODULUS_TOO_LARGE
                    | error_codes::EMPTY_KEY_REQUEST
            ),
            CryptoError::StorageError { error_code, .. } => matches!(
                *error_code,
                error_codes::STORAGE_INVALID_NAME | error_codes::STORAGE_CREATE_FAILED
            ),
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_friendly_message(&self) -> String {
        match self {
            CryptoError::GenerationError { operation, error_code, .. } => match *error_code {
                error_codes::EMPTY_KEY_REQUEST => {
                    format!("Key generation step '{}' was asked for a zero-length key.", operation)
                }
                _ => format!(
                    "Key pair generation step '{}' failed. Check the requested modulus size.",
                    operation
                ),
            },
            CryptoError::KeySizeError { expected, actual, .. } => {
                format!(
                    "The symmetric key must be {} bytes long, but {} bytes were supplied.",
                    expected, actual
                )
            }
            CryptoError::IntegrityError { .. } => {
                "The stored key could not be authenticated. It may have been tampered with, or the password or nonce is wrong."
                    .to_string()
            }
            CryptoError::FormatError { operation, .. } => {
                format!("Data for '{}' is malformed. The record may be corrupted.", operation)
            }
            CryptoError::StorageError { operation, path, .. } => {
                format!(
                    "Storage operation '{}' on '{}' failed. Check file permissions and disk space.",
                    operation, path
                )
            }
            CryptoError::RandomGenerationError { .. } => {
                "Random number generation failed. Cryptographic operations may be insecure."
                    .to_string()
            }
            CryptoError::ConfigError { parameter, .. } => {
                format!("Configuration parameter '{}' is invalid.", parameter)
            }
        }
    }

    /// Get technical details for debugging
    pub fn technical_details(&self) -> HashMap<String, String> {
        let mut details = HashMap::new();

        details.insert("error_code".to_string(), self.error_code().to_string());
        details.insert("error_type".to_string(), self.error_type().to_string());
        details.insert("timestamp".to_string(), chrono::Utc::now().to_rfc3339());

        match self {
            CryptoError::GenerationError {
                operation, cause, ..
            }
            | CryptoError::IntegrityError {
                operation, cause, ..
            }
            | CryptoError::FormatError {
                operation, cause, ..
            } => {
                details.insert("operation".to_string(), operation.clone());
                details.insert("cause".to_string(), cause.clone());
            }
            CryptoError::StorageError {
                operation,
                path,
                cause,
                ..
            } => {
                details.insert("operation".to_string(), operation.clone());
                details.insert("path".to_string(), path.clone());
                details.insert("cause".to_string(), cause.clone());
            }
            CryptoError::KeySizeError {
                expected, actual, ..
            } => {
                details.insert("expected".to_string(), expected.to_string());
                details.insert("actual".to_string(), actual.to_string());
            }
            CryptoError::RandomGenerationError { cause, .. } => {
                details.insert("cause".to_string(), cause.clone());
            }
            CryptoError::ConfigError {
                parameter, cause, ..
            } => {
                details.insert("parameter".to_string(), parameter.clone());
                details.insert("cause".to_string(), cause.clone());
            }
        }

        details
    }

    /// Get suggested remediation steps
    pub fn suggested_remediation(&self) -> Option<String> {
        match self {
            CryptoError::GenerationError { error_code, .. } => match *error_code {
                error_codes::MODULUS_TOO_SMALL | error_codes::MODULUS_TOO_LARGE => Some(
                    "Request a modulus size within the configured bounds (2048 or more for production use)."
                        .to_string(),
                ),
                error_codes::EMPTY_KEY_REQUEST => {
                    Some("Request a key length of at least one byte.".to_string())
                }
                _ => Some(
                    "Ensure sufficient entropy is available. Check system random number generator."
                        .to_string(),
                ),
            },
            CryptoError::KeySizeError { expected, .. } => {
                Some(format!("Supply a key of exactly {} bytes.", expected))
            }
            CryptoError::IntegrityError { .. } => Some(
                "Treat this as a security alert. Verify the password, nonce and file belong together."
                    .to_string(),
            ),
            CryptoError::StorageError { error_code, .. } => match *error_code {
                error_codes::STORAGE_FILE_EXISTS => {
                    Some("Retry the operation; a fresh filename will be derived.".to_string())
                }
                error_codes::STORAGE_INVALID_NAME => {
                    Some("Use a bare filename without path separators.".to_string())
                }
                _ => Some("Check that the storage root exists and is writable.".to_string()),
            },
            CryptoError::RandomGenerationError { .. } => Some(
                "Check system entropy sources. Consider using hardware RNG if available."
                    .to_string(),
            ),
            CryptoError::ConfigError { .. } => {
                Some("Review the vault configuration values.".to_string())
            }
            CryptoError::FormatError { .. } => None,
        }
    }
}

/// Convenience constructors for common error types
impl CryptoError {
    pub fn generation_error(operation: &str, cause: &str, error_code: u32) -> Self {
        CryptoError::GenerationError {
            operation: operation.to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }

    pub fn key_size_error(expected: usize, actual: usize) -> Self {
        CryptoError::KeySizeError {
            expected,
            actual,
            error_code: error_codes::INVALID_KEY_SIZE,
        }
    }

    pub fn integrity_error(operation: &str, cause: &str, error_code: u32) -> Self {
        CryptoError::IntegrityError {
            operation: operation.to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }

    pub fn format_error(operation: &str, cause: &str, error_code: u32) -> Self {
        CryptoError::FormatError {
            operation: operation.to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }

    pub fn storage_error(operation: &str, path: &Path, cause: &str, error_code: u32) -> Self {
        CryptoError::StorageError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }

    pub fn config_error(parameter: &str, cause: &str, error_code: u32) -> Self {
        CryptoError::ConfigError {
            parameter: parameter.to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::RandomGenerationError {
            cause: err.to_string(),
            error_code: error_codes::INSUFFICIENT_ENTROPY,
        }
    }
}

/// Result type alias for key vault operations
pub type CryptoResult<T> = Result<T, CryptoError>;
