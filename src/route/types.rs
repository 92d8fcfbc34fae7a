use alloy::primitives::Address;
use bigdecimal::{BigDecimal, Zero};
use derive_more::Display;
use serde::Serialize;

use crate::utils::constants::FEE_DENOMINATOR;

/// An ERC20 token as indexed by the pool data source.
///
/// Addresses compare byte-wise, so two references to the same token match no
/// matter how their hex was cased by the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TokenRef {
    /// Token contract
    pub address: Address,
    /// Ticker symbol
    pub symbol: String,
    /// Full name
    pub name: String,
    /// Decimals used for every fixed-point conversion of this token
    pub decimals: u8,
}

impl TokenRef {
    /// Creates a new token reference
    #[must_use]
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
        }
    }
}

/// A concentrated-liquidity pool between two tokens.
///
/// Nothing is assumed about which side a token sits on; lookups go by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRef {
    /// Pool contract
    pub id: Address,
    /// First token of the pool
    pub token0: TokenRef,
    /// Second token of the pool
    pub token1: TokenRef,
    /// Fee in parts per million (500 = 0.05%)
    pub fee_tier: u32,
    /// Active liquidity
    pub liquidity: u128,
    /// Recorded price of token0 in units of token1
    pub token0_price: Option<BigDecimal>,
    /// Recorded price of token1 in units of token0
    pub token1_price: Option<BigDecimal>,
    /// Total value locked in USD, used to rank routes
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: BigDecimal,
}

impl PoolRef {
    /// Whether `token` is one of the pool's two tokens
    #[must_use]
    pub fn contains(&self, token: Address) -> bool {
        self.token0.address == token || self.token1.address == token
    }

    /// The side of the pool holding `token`, if any
    #[must_use]
    pub fn side(&self, token: Address) -> Option<&TokenRef> {
        if self.token0.address == token {
            Some(&self.token0)
        } else if self.token1.address == token {
            Some(&self.token1)
        } else {
            None
        }
    }

    /// Whether the pool is eligible for routing
    #[must_use]
    pub const fn has_liquidity(&self) -> bool {
        self.liquidity > 0
    }

    /// Recorded mid price for a trade entering the pool with `token_in`.
    ///
    /// Picks `token1_price` when `token_in` is token0 and `token0_price`
    /// otherwise; a price the source did not record reads as zero.
    #[must_use]
    pub fn mid_price(&self, token_in: Address) -> BigDecimal {
        let price = if self.token0.address == token_in {
            &self.token1_price
        } else {
            &self.token0_price
        };
        price.clone().unwrap_or_else(BigDecimal::zero)
    }
}

/// Whether a route trades through one pool or through an intermediary token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// One pool holds both tokens
    #[display("direct")]
    Direct,
    /// Two pools joined by an intermediary token
    #[display("indirect")]
    Indirect,
}

/// An ordered path of one or two pools from the input token to the output token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Route kind
    #[serde(rename = "type")]
    pub kind: RouteKind,
    /// Hops, input side first
    #[serde(rename = "path")]
    pub hops: Vec<PoolRef>,
    /// Token joining the two hops of an indirect route
    #[serde(rename = "intermediaryToken", skip_serializing_if = "Option::is_none")]
    pub intermediary: Option<TokenRef>,
    /// Sum of hop fees as a fraction (0.003 = 0.3%)
    pub total_fee: f64,
}

impl Route {
    /// Single-pool route
    #[must_use]
    pub fn direct(pool: PoolRef) -> Self {
        Self {
            kind: RouteKind::Direct,
            total_fee: f64::from(pool.fee_tier) / FEE_DENOMINATOR,
            hops: vec![pool],
            intermediary: None,
        }
    }

    /// Two-pool route through `intermediary`.
    ///
    /// The fee is the plain sum of both tiers, not the compounded rate.
    #[must_use]
    pub fn indirect(first: PoolRef, second: PoolRef, intermediary: TokenRef) -> Self {
        Self {
            kind: RouteKind::Indirect,
            total_fee: (f64::from(first.fee_tier) + f64::from(second.fee_tier)) / FEE_DENOMINATOR,
            hops: vec![first, second],
            intermediary: Some(intermediary),
        }
    }

    /// Tokens visited from `token_in` to `token_out`
    #[must_use]
    pub fn token_path(&self, token_in: Address, token_out: Address) -> Vec<Address> {
        match &self.intermediary {
            Some(intermediary) => vec![token_in, intermediary.address, token_out],
            None => vec![token_in, token_out],
        }
    }

    /// Fee tier of every hop, in order
    #[must_use]
    pub fn fees(&self) -> Vec<u32> {
        self.hops.iter().map(|pool| pool.fee_tier).collect()
    }

    /// Combined TVL of every hop, the ranking key of a route
    #[must_use]
    pub fn total_value_locked_usd(&self) -> BigDecimal {
        self.hops
            .iter()
            .map(|pool| &pool.total_value_locked_usd)
            .fold(BigDecimal::zero(), |acc, tvl| acc + tvl)
    }
}

/// Routes of a single kind, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSet {
    /// Kind shared by every route
    #[serde(rename = "type")]
    pub kind: RouteKind,
    /// Routes ranked by descending TVL
    pub routes: Vec<Route>,
}

impl RouteSet {
    /// Highest ranked route
    #[must_use]
    pub fn best(&self) -> Option<&Route> {
        self.routes.first()
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
