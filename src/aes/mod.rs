/*!
 * AES-GCM implementation for symmetric encryption
 *
 * This module implements AES-128-GCM with a detached authentication tag,
 * used to protect serialized private keys at rest.
 */

mod aes;

pub use self::aes::*;
