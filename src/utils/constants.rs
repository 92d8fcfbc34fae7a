use alloy::primitives::{address, Address};

/// EDU Chain mainnet chain id
pub const DEFAULT_CHAIN_ID: u64 = 41923;
/// Public EDU Chain RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://rpc.edu-chain.raas.gelato.cloud";
/// SailFish V3 subgraph
pub const DEFAULT_SUBGRAPH_URL: &str = "https://api.goldsky.com/api/public/project_cm5nst0b7iiqy01t6hxww7gao/subgraphs/sailfish-v3-occ-mainnet/1.0.0/gn";

/// SailFish swap router
pub const SWAP_ROUTER: Address = address!("0x1a1e967e523435CeF20642e3D7811F7d0da9a704");
/// SailFish `QuoterV2`
pub const QUOTER_V2: Address = address!("0x83EE12582E3448Ab69E664A2ba69b6AedE112205");
/// WEDU, the wrapped native token
pub const WRAPPED_NATIVE: Address = address!("0xd02E8c38a8E3db71f8b2ae30B8186d7874934e12");

/// Fee tiers offered by the exchange, in parts per million
pub const FEE_TIERS: [u32; 4] = [100, 500, 3000, 10_000];
/// Denominator of a fee tier
pub const FEE_DENOMINATOR: f64 = 1_000_000.0;

/// Slippage applied when the caller does not give one
pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 0.5;
/// Seconds a submitted swap stays valid
pub const DEADLINE_SECS: i64 = 1200;
/// Gas limit for swaps paying in the native asset
pub const NATIVE_SWAP_GAS_LIMIT: u64 = 500_000;
/// Largest native input accepted, in whole units
pub const MAX_NATIVE_AMOUNT_IN: u64 = 1_000_000;
/// Decimals of the native asset
pub const NATIVE_DECIMALS: u8 = 18;
