//! Error taxonomy shared by route discovery, quoting and swap execution.
//!
//! Every failure surfaced by the library is a [`SwapError`]. Route and quote
//! failures always propagate to the caller; nothing is retried.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

/// Errors raised while finding routes, quoting or executing swaps.
#[derive(Debug, Error)]
pub enum SwapError {
    /// The pool data source was unreachable or answered with a malformed payload
    #[error("pool data unavailable: {0}")]
    NoData(String),

    /// No pool path connects the two tokens
    #[error("no route found between {token_in} and {token_out}")]
    NoRoute {
        /// Input token
        token_in: String,
        /// Output token
        token_out: String,
    },

    /// The on-chain quote simulation reverted or could not be decoded
    #[error("quote failed: {0}")]
    Quote(String),

    /// Path encoding rejected its inputs
    #[error("path encoding failed: {0}")]
    Encoding(String),

    /// Wallet balance is below the requested amount
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Raw amount requested
        required: U256,
        /// Raw amount held
        available: U256,
    },

    /// A submitted transaction was dropped or reverted
    #[error("transaction {hash:?} failed: {reason}")]
    TransactionFailed {
        /// Hash of the failed transaction, when one was assigned
        hash: Option<TxHash>,
        /// Human-readable failure reason
        reason: String,
    },

    /// Amount string could not be scaled to token units
    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount {
        /// The amount as given
        amount: String,
        /// Why it was rejected
        reason: String,
    },

    /// Slippage tolerance outside the accepted range
    #[error("invalid slippage {0}%: outside the accepted range")]
    InvalidSlippage(f64),

    /// Native input above the hard ceiling
    #[error("amount {amount} exceeds the maximum of {max} native units")]
    AmountTooLarge {
        /// Requested amount
        amount: String,
        /// Ceiling in whole native units
        max: u64,
    },

    /// Private key could not be parsed
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// A configuration value could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport or contract failure outside quoting
    #[error("rpc error: {0}")]
    Rpc(String),
}

impl From<alloy::contract::Error> for SwapError {
    fn from(err: alloy::contract::Error) -> Self {
        Self::Rpc(err.to_string())
    }
}

impl From<alloy::transports::TransportError> for SwapError {
    fn from(err: alloy::transports::TransportError) -> Self {
        Self::Rpc(err.to_string())
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        Self::NoData(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = SwapError> = std::result::Result<T, E>;
