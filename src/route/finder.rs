use alloy::primitives::Address;
use itertools::Itertools;

use crate::error::{Result, SwapError};
use crate::route::types::{PoolRef, Route, RouteKind, RouteSet, TokenRef};
use crate::sources::PoolSource;

/// Finds one- and two-hop routes between tokens over a pool index.
///
/// The finder holds no mutable state; one instance serves any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct RouteFinder<S> {
    /// Pool index searched for routes
    source: S,
}

impl<S: PoolSource> RouteFinder<S> {
    /// Creates a finder over `source`
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Finds every route from `token_in` to `token_out`.
    ///
    /// Direct pools win outright: when at least one exists the indirect search
    /// is never issued. Otherwise every pairing of a pool touching `token_in`
    /// and a pool touching `token_out` that share a token becomes a route.
    ///
    /// # Returns
    /// Routes of a single kind, best first. An empty indirect set is not an error.
    ///
    /// # Errors
    /// * `NoData` if the index is unreachable or answers with a malformed payload
    pub async fn find_all_routes(&self, token_in: Address, token_out: Address) -> Result<RouteSet> {
        let direct = self.source.direct_pools(token_in, token_out).await?;
        let routes = direct_routes(direct);
        if !routes.is_empty() {
            log::info!(
                "route::finder: {} direct route(s) for {token_in} -> {token_out}",
                routes.len()
            );
            return Ok(RouteSet {
                kind: RouteKind::Direct,
                routes,
            });
        }

        let (pools0, pools1) = self.source.pools_touching(token_in, token_out).await?;
        let intermediaries = intermediary_tokens(&pools0, &pools1);
        let routes = indirect_routes(&pools0, &pools1, &intermediaries);
        log::info!(
            "route::finder: {} indirect route(s) through {} intermediary token(s) for {token_in} -> {token_out}",
            routes.len(),
            intermediaries.len()
        );

        Ok(RouteSet {
            kind: RouteKind::Indirect,
            routes,
        })
    }

    /// Highest ranked route from `token_in` to `token_out`.
    ///
    /// # Errors
    /// * `NoRoute` if no route exists
    /// * `NoData` if the index is unreachable
    pub async fn best_route(&self, token_in: Address, token_out: Address) -> Result<Route> {
        self.find_all_routes(token_in, token_out)
            .await?
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| SwapError::NoRoute {
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
            })
    }
}

/// One route per pool holding liquidity, ranked by descending TVL.
///
/// Ties keep the order the index returned them in.
#[must_use]
pub fn direct_routes(pools: Vec<PoolRef>) -> Vec<Route> {
    let mut routes: Vec<Route> = pools
        .into_iter()
        .filter(PoolRef::has_liquidity)
        .map(Route::direct)
        .collect();
    rank(&mut routes);
    routes
}

/// Tokens present in both pool sets, in first-seen order of `pools0`.
#[must_use]
pub fn intermediary_tokens(pools0: &[PoolRef], pools1: &[PoolRef]) -> Vec<TokenRef> {
    pools0
        .iter()
        .flat_map(|pool| [&pool.token0, &pool.token1])
        .unique_by(|token| token.address)
        .filter(|token| pools1.iter().any(|pool| pool.contains(token.address)))
        .cloned()
        .collect()
}

/// Every two-hop route joining `pools0` to `pools1` through one of `intermediaries`,
/// ranked by descending combined TVL.
///
/// The intermediary's metadata is read from the first hop.
#[must_use]
pub fn indirect_routes(
    pools0: &[PoolRef],
    pools1: &[PoolRef],
    intermediaries: &[TokenRef],
) -> Vec<Route> {
    let mut routes = Vec::new();
    for intermediary in intermediaries {
        let first_hops = pools0
            .iter()
            .filter(|pool| pool.has_liquidity() && pool.contains(intermediary.address));
        for first in first_hops {
            let token = first.side(intermediary.address).unwrap_or(intermediary);
            let second_hops = pools1
                .iter()
                .filter(|pool| pool.has_liquidity() && pool.contains(intermediary.address));
            for second in second_hops {
                routes.push(Route::indirect(first.clone(), second.clone(), token.clone()));
            }
        }
    }
    rank(&mut routes);
    routes
}

/// Stable sort by descending TVL
fn rank(routes: &mut [Route]) {
    routes.sort_by_cached_key(|route| std::cmp::Reverse(route.total_value_locked_usd()));
}
