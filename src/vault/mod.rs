/*!
 * Key vault orchestration
 *
 * Ties key pair generation, private key serialization, authenticated
 * encryption and record storage into a single protect operation, plus the
 * matching recover/verify path.
 */

pub mod config;
mod service;

pub use config::VaultConfig;
pub use service::ProtectedKey;
pub use service::VaultService;
