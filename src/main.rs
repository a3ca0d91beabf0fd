use keyvault::error::{error_codes, CryptoError, CryptoResult};
use keyvault::{VaultConfig, VaultService};

const DEFAULT_MODULUS_BITS: usize = 512;

fn main() -> CryptoResult<()> {
    let mut args = std::env::args().skip(1);

    let modulus_bits = match args.next() {
        Some(arg) => arg.parse::<usize>().map_err(|e| {
            CryptoError::config_error("modulus_bits", &format!("'{}': {}", arg, e), error_codes::INVALID_CONFIG)
        })?,
        None => DEFAULT_MODULUS_BITS,
    };
    let config = match args.next() {
        Some(root) => VaultConfig::new(root),
        None => VaultConfig::default(),
    };

    let vault = VaultService::new(config)?;
    let protected = match vault.protect_new_key(modulus_bits) {
        Ok(protected) => protected,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            if let Some(remediation) = e.suggested_remediation() {
                eprintln!("{}", remediation);
            }
            return Err(e);
        }
    };

    println!("Public key:");
    println!("  modulus bits: {}", protected.modulus_bits());
    println!("  exponent:     {}", protected.public_exponent());
    println!("Stored private key: {}", protected.path.display());
    println!("Password (hex):     {}", protected.password.to_hex());
    println!("Nonce (hex):        {}", protected.nonce_hex());

    vault.verify(&protected)?;
    println!("✓ Stored key decrypts and matches the public key");

    Ok(())
}
