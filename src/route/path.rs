use alloy::primitives::{Address, Bytes};

use crate::error::{Result, SwapError};

/// Largest fee representable in a path segment
const MAX_PATH_FEE: u32 = 0x00FF_FFFF;

/// Encodes a multi-hop path for the router's `exactInput`.
///
/// The layout is `token0 | fee0 | token1 | fee1 | ... | tokenN`, with each
/// token as its 20 address bytes and each fee as 3 big-endian bytes.
///
/// # Arguments
/// * `tokens` - Tokens visited, input first
/// * `fees` - Fee tier of the pool between each consecutive pair of tokens
///
/// # Returns
/// `20 * tokens.len() + 3 * fees.len()` bytes
///
/// # Errors
/// * `Encoding` if `tokens.len() != fees.len() + 1` or a fee exceeds 24 bits
pub fn encode_path(tokens: &[Address], fees: &[u32]) -> Result<Bytes> {
    if tokens.len() != fees.len() + 1 {
        return Err(SwapError::Encoding(format!(
            "path and fees length mismatch: {} tokens, {} fees",
            tokens.len(),
            fees.len()
        )));
    }
    if let Some(fee) = fees.iter().find(|fee| **fee > MAX_PATH_FEE) {
        return Err(SwapError::Encoding(format!("fee {fee} exceeds 24 bits")));
    }

    let mut out = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    out.extend_from_slice(tokens[0].as_slice());
    for (fee, token) in fees.iter().zip(&tokens[1..]) {
        out.extend_from_slice(&fee.to_be_bytes()[1..]);
        out.extend_from_slice(token.as_slice());
    }
    Ok(out.into())
}
