//! # Route Module
//!
//! Route discovery, quoting and swap execution over a concentrated-liquidity
//! exchange. The finder searches the pool index for one- and two-hop paths,
//! the calculator prices the best one against the on-chain quoter, and the
//! executor turns a quote into approval, swap and unwrap transactions.

/// Swap submission
pub mod executor;
/// Route discovery
pub mod finder;
/// Multi-hop path encoding
pub mod path;
/// Quoting, slippage and price impact
pub mod quote;
/// Test helpers and in-memory sources
#[cfg(test)]
pub(crate) mod test_helpers;
/// Tokens, pools and routes
pub mod types;

pub use executor::{SwapExecutor, SwapReceipt, TransferReceipt, WrapReceipt};
pub use finder::RouteFinder;
pub use path::encode_path;
pub use quote::{Quote, QuoteCalculator};
pub use types::{PoolRef, Route, RouteKind, RouteSet, TokenRef};
