/*!
 * # Sailroute - Route Discovery and Swap Execution
 *
 * Sailroute finds trading routes between two tokens on a concentrated-liquidity
 * exchange, prices them against the on-chain quoter and executes the swap with
 * slippage protection. It targets the SailFish deployment on EDU Chain by
 * default and works against any Uniswap-V3-style router, quoter and subgraph.
 *
 * ## Core Features
 *
 * - **Route Discovery**: Direct pools first, otherwise every two-hop path through a shared token
 * - **Quoting**: Exact fixed-point amounts, slippage-bounded minimum output and price impact
 * - **Path Encoding**: Packed multi-hop paths for the router's `exactInput`
 * - **Execution**: Approval, swap, transfer and wrap/unwrap transactions, each awaited until mined
 *
 * ## Module Structure
 *
 * - `config`: Endpoints and contract addresses
 * - `error`: Error taxonomy
 * - `route`: Route finder, quote calculator, path encoder and swap executor
 * - `sources`: Pool index and chain access
 * - `utils`: Logging, constants, unit conversions and wallet keys
 */

/// Endpoints and contract addresses
pub mod config;
/// Error taxonomy
pub mod error;
/// Route discovery, quoting and execution
pub mod route;
/// Pool index and chain access
pub mod sources;
/// Utility functions and helpers
pub mod utils;

pub use config::Config;
pub use error::{Result, SwapError};
