use std::str::FromStr;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{Result, SwapError};

/// Builds a signer from a hex private key, with or without `0x`.
///
/// The signer lives only as long as the caller keeps it; nothing is cached.
///
/// # Errors
/// * `InvalidKey` if the key is not 32 bytes of hex or not a valid scalar
pub fn signer_from_key(private_key: &str) -> Result<PrivateKeySigner> {
    PrivateKeySigner::from_str(private_key.trim()).map_err(|e| SwapError::InvalidKey(e.to_string()))
}

/// Address controlled by `private_key`.
///
/// # Errors
/// * `InvalidKey` if the key cannot be parsed
pub fn wallet_address(private_key: &str) -> Result<Address> {
    Ok(signer_from_key(private_key)?.address())
}
