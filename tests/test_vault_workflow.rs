//! End-to-end tests for the protect → persist → recover workflow
//!
//! These exercise the public API the way an external caller would: protect a
//! key, then read the stored file by hand and walk the verification path.

use std::collections::HashSet;
use std::fs;

use keyvault::aes;
use keyvault::encoding::{self, PrivateKeyEncoding};
use keyvault::error::CryptoError;
use keyvault::prelude::*;
use rsa::traits::PublicKeyParts;
use tempfile::tempdir;

/// Protect a 512-bit key, then decrypt the stored file manually
#[test]
fn test_protect_512_and_decrypt_stored_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let vault = VaultService::new(VaultConfig::new(dir.path())).expect("Failed to create vault");

    let protected = vault.protect_new_key(512).expect("Failed to protect key");
    assert_eq!(protected.public_key.n().bits(), 512);
    assert!(protected.path.exists());

    let stored = fs::read_to_string(&protected.path).expect("Failed to read record");
    let packed = decode_from_storage(&stored).expect("Stored payload is not base64");
    let (ciphertext, tag) = encoding::unpack_blob(&packed).expect("Stored payload too short");
    let plaintext = aes::decrypt(protected.password.as_bytes(), &protected.nonce, ciphertext, tag)
        .expect("Failed to decrypt record");

    let private_key = deserialize_private_key(plaintext.as_bytes(), PrivateKeyEncoding::Pkcs1Pem)
        .expect("Decrypted bytes are not a PKCS#1 key");
    assert_eq!(private_key.n(), protected.public_key.n());
}

/// Two calls produce different filenames and passwords
#[test]
fn test_two_calls_are_independent() {
    let dir = tempdir().unwrap();
    let vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();

    let first = vault.protect_new_key(512).unwrap();
    let second = vault.protect_new_key(512).unwrap();

    assert_ne!(first.filename, second.filename);
    assert_ne!(first.password, second.password);
    assert_ne!(first.nonce, second.nonce);
    assert_ne!(first.modulus(), second.modulus());
}

/// Repeated calls never reuse a filename
#[test]
fn test_filenames_distinct_over_many_calls() {
    let dir = tempdir().unwrap();
    let vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();

    let filenames: HashSet<String> = (0..20)
        .map(|_| vault.protect_new_key(512).unwrap().filename)
        .collect();

    assert_eq!(filenames.len(), 20);
    assert_eq!(vault.list_records().unwrap().len(), 20);
}

/// Flipping one byte of the stored ciphertext is detected
#[test]
fn test_tampered_ciphertext_is_integrity_error() {
    let dir = tempdir().unwrap();
    let vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();
    let protected = vault.protect_new_key(512).unwrap();

    let mut packed = decode_from_storage(&fs::read_to_string(&protected.path).unwrap()).unwrap();
    let middle = packed.len() / 2;
    packed[middle] ^= 0x01;
    fs::write(&protected.path, encode_for_storage(&packed)).unwrap();

    match vault.recover_private_key(&protected.filename, protected.password.as_bytes(), &protected.nonce) {
        Err(CryptoError::IntegrityError { .. }) => {}
        other => panic!("expected IntegrityError, got {:?}", other.map(|_| "a private key")),
    }
}

/// The convenience entry point stores under the given root
#[test]
fn test_top_level_protect_new_key() {
    let dir = tempdir().unwrap();
    let protected = keyvault::protect_new_key(512, dir.path()).unwrap();

    assert!(protected.path.starts_with(dir.path()));
    assert!(protected.filename.starts_with("private_key_"));
    assert!(protected.filename.ends_with(".txt"));

    let vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();
    vault.verify(&protected).unwrap();
}

/// A vault reopened on the same root can still recover earlier records
#[test]
fn test_recover_after_reopen() {
    let dir = tempdir().unwrap();
    let protected = {
        let vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();
        vault.protect_new_key(512).unwrap()
    };

    let reopened = VaultService::new(VaultConfig::new(dir.path())).unwrap();
    assert_eq!(reopened.list_records().unwrap(), vec![protected.filename.clone()]);
    reopened.verify(&protected).unwrap();
}

/// Records written with one encoding cannot be decoded as the other
#[test]
fn test_encoding_must_match_on_recover() {
    let dir = tempdir().unwrap();
    let der_config = VaultConfig {
        key_encoding: PrivateKeyEncoding::Pkcs1Der,
        ..VaultConfig::new(dir.path())
    };
    let der_vault = VaultService::new(der_config).unwrap();
    let protected = der_vault.protect_new_key(512).unwrap();
    der_vault.verify(&protected).unwrap();

    let pem_vault = VaultService::new(VaultConfig::new(dir.path())).unwrap();
    let err = pem_vault.verify(&protected).unwrap_err();
    assert!(matches!(err, CryptoError::FormatError { .. }));
}

/// High security preset rejects small moduli before touching the disk
#[test]
fn test_high_security_preset_rejects_small_modulus() {
    let dir = tempdir().unwrap();
    let vault = VaultService::new(VaultConfig::high_security(dir.path())).unwrap();

    let err = vault.protect_new_key(512).unwrap_err();
    assert!(matches!(err, CryptoError::GenerationError { .. }));
    assert!(err.is_usage_error());
    assert!(vault.list_records().unwrap().is_empty());
}
