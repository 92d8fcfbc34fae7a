//! Application context wiring the pool index, the chain client and the engine.
//!
//! Built once per process from a [`Config`]; every command borrows the pieces
//! it needs from here instead of reaching for globals.

use crate::config::Config;
use crate::route::{QuoteCalculator, RouteFinder, SwapExecutor};
use crate::sources::{EvmClient, SubgraphClient};

/// Engine running against the live subgraph and chain
pub type LiveExecutor = SwapExecutor<SubgraphClient, EvmClient>;

/// Application context holding the configured engine.
pub struct AppContext {
    /// Active configuration
    pub config: Config,
    /// Direct chain access for reads outside the engine
    pub chain: EvmClient,
    /// Pool index lookups outside route discovery
    pub subgraph: SubgraphClient,
    /// Route finder, quote calculator and swap executor
    pub executor: LiveExecutor,
}

impl AppContext {
    /// Creates a context from `config`. Providers connect lazily on first request.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let chain = EvmClient::new(&config);
        let subgraph = SubgraphClient::new(config.subgraph_url.clone());
        let finder = RouteFinder::new(subgraph.clone());
        let executor = SwapExecutor::new(QuoteCalculator::new(finder, chain.clone()), &config);

        log::info!(
            "utils::app_context: chain {} at {}, pool index at {}",
            config.chain_id,
            config.rpc_url(),
            config.subgraph_url
        );

        Self {
            config,
            chain,
            subgraph,
            executor,
        }
    }
}
