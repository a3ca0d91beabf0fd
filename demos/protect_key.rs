//! Example: Protect a freshly generated RSA key and recover it later
//!
//! Run with `cargo run --example protect_key [STORAGE_DIR]`. Without a
//! directory the record is written to a temporary one that is removed on exit.
use keyvault::prelude::*;
use rsa::traits::PublicKeyParts;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let root = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| scratch.path().to_path_buf());

    let vault = VaultService::new(VaultConfig::new(&root))?;

    // Generate and store; only the public key and the secrets to reopen the
    // record come back
    let protected = vault.protect_new_key(1024)?;
    println!("Stored {} ({} bit modulus)", protected.filename, protected.modulus_bits());

    // Recover the private key with the password and nonce
    let private_key = vault.recover_private_key(
        &protected.filename,
        protected.password.as_bytes(),
        &protected.nonce,
    )?;
    assert_eq!(private_key.n(), protected.public_key.n());
    println!("Recovered private key matches the public key.");

    // A wrong password is rejected without yielding any key material
    let wrong = SecureBytes::zeroed(protected.password.len());
    match vault.recover_private_key(&protected.filename, wrong.as_bytes(), &protected.nonce) {
        Err(e) if e.is_security_event() => println!("Wrong password rejected: {}", e),
        Err(e) => return Err(e.into()),
        Ok(_) => return Err("wrong password unexpectedly accepted".into()),
    }

    println!(
        "Records under {}: {:?}",
        vault.store().root().display(),
        vault.list_records()?
    );
    Ok(())
}
