use std::path::PathBuf;

use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::aes::{self, KEY_SIZE, NONCE_SIZE};
use crate::encoding;
use crate::error::{error_codes, CryptoError, CryptoResult};
use crate::key_management::SecureKeyStore;
use crate::keypair::KeyPairGenerator;
use crate::random::{OsRandom, RandomProvider};
use crate::secure_memory::SecureBytes;

use super::config::VaultConfig;

/// Everything a caller needs after a private key has been protected.
///
/// The password and nonce are never written to storage; the caller is the
/// only keeper of record for them.
pub struct ProtectedKey {
    pub public_key: RsaPublicKey,
    pub filename: String,
    pub path: PathBuf,
    pub password: SecureBytes,
    pub nonce: [u8; NONCE_SIZE],
}

impl std::fmt::Debug for ProtectedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedKey")
            .field("modulus_bits", &self.modulus_bits())
            .field("public_exponent", self.public_exponent())
            .field("filename", &self.filename)
            .field("password", &self.password)
            .field("nonce", &"[REDACTED]")
            .finish()
    }
}

impl ProtectedKey {
    pub fn modulus(&self) -> &BigUint {
        self.public_key.n()
    }

    pub fn public_exponent(&self) -> &BigUint {
        self.public_key.e()
    }

    pub fn modulus_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    pub fn nonce_hex(&self) -> String {
        hex::encode(self.nonce)
    }
}

/// Generates RSA key pairs and stores their private halves encrypted at rest
///
/// Randomness and the storage root are injected, so a service can be run
/// against a temporary directory with a seeded generator in tests. The
/// service holds no mutable state and can be shared between threads.
///
/// # Example
///
/// ```no_run
/// use keyvault::vault::{VaultConfig, VaultService};
///
/// let vault = VaultService::new(VaultConfig::new("/var/lib/keyvault")).unwrap();
/// let protected = vault.protect_new_key(2048).unwrap();
/// vault.verify(&protected).unwrap();
/// ```
#[derive(Debug)]
pub struct VaultService<P: RandomProvider = OsRandom> {
    config: VaultConfig,
    generator: KeyPairGenerator,
    store: SecureKeyStore,
    random: P,
}

impl VaultService<OsRandom> {
    /// Create a service backed by the operating system's CSPRNG
    pub fn new(config: VaultConfig) -> CryptoResult<Self> {
        Self::with_random(config, OsRandom)
    }
}

impl<P: RandomProvider> VaultService<P> {
    /// Create a service with an explicit random provider
    ///
    /// Validates the configuration and creates the storage root.
    pub fn with_random(config: VaultConfig, random: P) -> CryptoResult<Self> {
        config.validate()?;

        let store = SecureKeyStore::new(&config.storage_root, &config.file_extension);
        store.ensure_root()?;

        Ok(Self {
            generator: config.key_pair_generator(),
            store,
            config,
            random,
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn store(&self) -> &SecureKeyStore {
        &self.store
    }

    /// Generate a key pair, encrypt the private key and persist it
    ///
    /// The stored file holds `base64(ciphertext || tag)`. No file is created
    /// unless every earlier step succeeded, and a failed write leaves nothing
    /// behind. Nothing is retried.
    pub fn protect_new_key(&self, modulus_bits: usize) -> CryptoResult<ProtectedKey> {
        log::info!("Protecting new {}-bit RSA key", modulus_bits);
        let mut rng = self.random.rng();

        let key_pair = self.generator.generate(&mut rng, modulus_bits)?;
        let password = aes::generate_key(&mut rng, KEY_SIZE)?;

        let (public_key, private_key) = key_pair.into_parts();
        let serialized = encoding::serialize_private_key(&private_key, self.config.key_encoding)?;
        drop(private_key);
        log::debug!(
            "Serialized private key as {} ({} bytes)",
            self.config.key_encoding,
            serialized.len()
        );

        let blob = aes::encrypt(&mut rng, password.as_bytes(), serialized.as_bytes())?;
        drop(serialized);

        let payload = encoding::encode_for_storage(&encoding::pack_blob(&blob.ciphertext, &blob.tag));
        let filename = self.store.derive_filename(&mut rng)?;
        let path = self.store.write(&filename, &payload)?;

        log::info!("Stored encrypted private key in {}", path.display());

        Ok(ProtectedKey {
            public_key,
            filename,
            path,
            password,
            nonce: blob.nonce,
        })
    }

    /// Read, authenticate and decode a stored private key
    ///
    /// # Errors
    ///
    /// * `StorageError` if the record cannot be read
    /// * `FormatError` if the record is not valid base64 or too short
    /// * `KeySizeError` if the password has the wrong length
    /// * `IntegrityError` if the record was altered or the password or nonce
    ///   do not belong to it
    pub fn recover_private_key(
        &self,
        filename: &str,
        password: &[u8],
        nonce: &[u8],
    ) -> CryptoResult<RsaPrivateKey> {
        let payload = self.store.read(filename)?;
        let packed = encoding::decode_from_storage(&payload)?;
        let (ciphertext, tag) = encoding::unpack_blob(&packed)?;

        let plaintext = aes::decrypt(password, nonce, ciphertext, tag).map_err(|e| {
            if e.is_security_event() {
                log::warn!("Record {} failed authentication", filename);
            }
            e
        })?;

        encoding::deserialize_private_key(plaintext.as_bytes(), self.config.key_encoding)
    }

    /// Check that a protected key decrypts and pairs with its public key
    pub fn verify(&self, protected: &ProtectedKey) -> CryptoResult<()> {
        let private_key = self.recover_private_key(
            &protected.filename,
            protected.password.as_bytes(),
            &protected.nonce,
        )?;

        if private_key.n() != protected.public_key.n() || private_key.e() != protected.public_key.e() {
            log::warn!(
                "Record {} does not match its public key",
                protected.filename
            );
            return Err(CryptoError::integrity_error(
                "verify key pair",
                "recovered private key does not match the public key",
                error_codes::KEY_PAIR_MISMATCH,
            ));
        }

        log::debug!("Verified record {}", protected.filename);
        Ok(())
    }

    /// Filenames of all records under the storage root
    pub fn list_records(&self) -> CryptoResult<Vec<String>> {
        self.store.list_records()
    }
}
