//! Runtime configuration: chain endpoint, subgraph endpoint and contract addresses.
//!
//! Every value has a default pointing at the SailFish deployment on EDU Chain and
//! can be overridden through `SAILROUTE_*` environment variables (a `.env` file is
//! honored by the binary).

use std::env;
use std::str::FromStr;

use alloy::primitives::Address;
use url::Url;

use crate::error::{Result, SwapError};
use crate::utils::constants::{
    DEFAULT_CHAIN_ID, DEFAULT_RPC_URL, DEFAULT_SUBGRAPH_URL, QUOTER_V2, SWAP_ROUTER, WRAPPED_NATIVE,
};

/// Endpoints and contract addresses used by every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the chain
    rpc_url: Url,
    /// Chain id transactions are signed for
    pub chain_id: u64,
    /// GraphQL endpoint of the pool index
    pub subgraph_url: Url,
    /// Swap router contract
    pub swap_router: Address,
    /// `QuoterV2` contract
    pub quoter: Address,
    /// Wrapped native token (WEDU)
    pub wrapped_native: Address,
}

impl Config {
    /// Loads the configuration from the environment, falling back to defaults.
    ///
    /// # Environment Variables
    /// * `SAILROUTE_RPC_URL`
    /// * `SAILROUTE_CHAIN_ID`
    /// * `SAILROUTE_SUBGRAPH_URL`
    /// * `SAILROUTE_SWAP_ROUTER`
    /// * `SAILROUTE_QUOTER`
    /// * `SAILROUTE_WRAPPED_NATIVE`
    ///
    /// # Errors
    /// * If a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rpc_url: var_or("SAILROUTE_RPC_URL", DEFAULT_RPC_URL)?,
            chain_id: var_or("SAILROUTE_CHAIN_ID", &DEFAULT_CHAIN_ID.to_string())?,
            subgraph_url: var_or("SAILROUTE_SUBGRAPH_URL", DEFAULT_SUBGRAPH_URL)?,
            swap_router: var_or("SAILROUTE_SWAP_ROUTER", &SWAP_ROUTER.to_string())?,
            quoter: var_or("SAILROUTE_QUOTER", &QUOTER_V2.to_string())?,
            wrapped_native: var_or("SAILROUTE_WRAPPED_NATIVE", &WRAPPED_NATIVE.to_string())?,
        })
    }

    /// Current RPC endpoint
    #[must_use]
    pub const fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Points the configuration at another RPC endpoint.
    ///
    /// # Errors
    /// * If `url` is not a valid URL
    pub fn set_rpc_url(&mut self, url: &str) -> Result<()> {
        self.rpc_url =
            Url::parse(url).map_err(|e| SwapError::Config(format!("RPC URL {url}: {e}")))?;
        log::info!("config: RPC endpoint set to {}", self.rpc_url);
        Ok(())
    }
}

impl Default for Config {
    // Both URLs are valid literals.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self {
            rpc_url: Url::parse(DEFAULT_RPC_URL).unwrap(),
            chain_id: DEFAULT_CHAIN_ID,
            subgraph_url: Url::parse(DEFAULT_SUBGRAPH_URL).unwrap(),
            swap_router: SWAP_ROUTER,
            quoter: QUOTER_V2,
            wrapped_native: WRAPPED_NATIVE,
        }
    }
}

/// Reads `key` from the environment, parsing `default` when it is unset.
fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_or(key, env::var(key).ok(), default)
}

/// Parses `value`, or `default` when it is absent
fn parse_or<T>(key: &str, value: Option<String>, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| SwapError::Config(format!("{key}={raw} is invalid: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_edu_chain() {
        let config = Config::default();
        assert_eq!(config.chain_id, 41923);
        assert_eq!(config.rpc_url().as_str(), "https://rpc.edu-chain.raas.gelato.cloud/");
        assert_eq!(config.wrapped_native, WRAPPED_NATIVE);
    }

    #[test]
    fn test_parse_or_falls_back_to_default() {
        for (value, expected) in &[(Some("41923"), 41923_u64), (None, 7)] {
            let parsed = parse_or::<u64>("SAILROUTE_CHAIN_ID", value.map(str::to_string), "7");
            assert_eq!(parsed.unwrap(), *expected);
        }
    }

    #[test]
    fn test_unparseable_values_are_config_errors() {
        let parsed = parse_or::<u64>("SAILROUTE_CHAIN_ID", Some("edu".to_string()), "7");
        assert!(matches!(parsed, Err(SwapError::Config(msg)) if msg.contains("SAILROUTE_CHAIN_ID=edu")));

        let parsed = parse_or::<Url>("SAILROUTE_SUBGRAPH_URL", Some("no scheme".to_string()), "");
        assert!(matches!(parsed, Err(SwapError::Config(_))));
    }

    #[test]
    fn test_set_rpc_url() {
        let mut config = Config::default();
        config.set_rpc_url("http://localhost:8545").unwrap();
        assert_eq!(config.rpc_url().as_str(), "http://localhost:8545/");

        assert!(matches!(
            config.set_rpc_url("not a url"),
            Err(SwapError::Config(_))
        ));
        assert_eq!(config.rpc_url().as_str(), "http://localhost:8545/");
    }
}
