use std::str::FromStr;

use alloy::primitives::Address;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::PoolSource;
use crate::error::{Result, SwapError};
use crate::route::types::{PoolRef, TokenRef};

/// Fields requested for every pool
const POOL_FIELDS: &str = r"
      id
      token0 { id symbol decimals name }
      token1 { id symbol decimals name }
      feeTier
      liquidity
      token0Price
      token1Price
      totalValueLockedUSD";

/// Pools whose two tokens both belong to the given pair
fn direct_pools_query() -> String {
    format!(
        r"query findDirectPools($token0: String!, $token1: String!) {{
    pools(where: {{ token0_in: [$token0, $token1], token1_in: [$token0, $token1], liquidity_gt: 0 }}) {{{POOL_FIELDS}
    }}
}}"
    )
}

/// Pools touching the input token and pools touching the output token
fn indirect_pools_query() -> String {
    format!(
        r"query findIndirectPools($tokenIn: String!, $tokenOut: String!) {{
    pools0: pools(where: {{ or: [{{ token0: $tokenIn, liquidity_gt: 0 }}, {{ token1: $tokenIn, liquidity_gt: 0 }}] }}) {{{POOL_FIELDS}
    }}
    pools1: pools(where: {{ or: [{{ token0: $tokenOut, liquidity_gt: 0 }}, {{ token1: $tokenOut, liquidity_gt: 0 }}] }}) {{{POOL_FIELDS}
    }}
}}"
    )
}

/// A single token with its index statistics
const TOKEN_QUERY: &str = r"query getToken($id: String!) {
    tokens(where: { id: $id }) {
      id symbol name decimals derivedETH volumeUSD totalValueLockedUSD txCount
    }
}";

/// The token's price in the native asset and the native asset's USD price
const TOKEN_PRICE_QUERY: &str = r"query getTokenPrice($id: String!) {
    tokens(where: { id: $id }) { derivedETH }
    bundles(first: 1) { ethPriceUSD }
}";

/// A single pool by id
fn pool_query() -> String {
    format!(
        r"query getPool($id: String!) {{
    pools(where: {{ id: $id }}) {{{POOL_FIELDS}
    }}
}}"
    )
}

/// Entity id of an address in the index: lower-case hex with a `0x` prefix
fn entity_id(address: Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    /// Query result
    data: Option<T>,
    /// Errors reported by the server
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

/// A single GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQlError {
    /// Server message
    message: String,
}

/// The index serializes big numbers as strings, some deployments use JSON numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    /// `"3000"`
    Text(String),
    /// `3000`
    Number(serde_json::Number),
}

impl Numeric {
    /// Parses the value, failing closed
    fn parse<T: FromStr>(&self, field: &str) -> Result<T> {
        let text = match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        };
        text.parse()
            .map_err(|_| SwapError::NoData(format!("{field}: unparseable value {text:?}")))
    }
}

/// Token entity as returned by the index
#[derive(Debug, Deserialize)]
struct RawToken {
    id: String,
    symbol: String,
    name: String,
    decimals: Numeric,
}

/// Pool entity as returned by the index
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    id: String,
    token0: RawToken,
    token1: RawToken,
    fee_tier: Numeric,
    liquidity: Numeric,
    token0_price: Option<Numeric>,
    token1_price: Option<Numeric>,
    #[serde(rename = "totalValueLockedUSD")]
    total_value_locked_usd: Numeric,
}

/// `findDirectPools` result
#[derive(Debug, Deserialize)]
struct DirectPools {
    pools: Vec<RawPool>,
}

/// `findIndirectPools` result
#[derive(Debug, Deserialize)]
struct IndirectPools {
    pools0: Vec<RawPool>,
    pools1: Vec<RawPool>,
}

/// Token entity with statistics, as returned by the index
#[derive(Debug, Deserialize)]
struct RawIndexedToken {
    id: String,
    symbol: String,
    name: String,
    decimals: Numeric,
    #[serde(rename = "derivedETH")]
    derived_eth: Numeric,
    #[serde(rename = "volumeUSD")]
    volume_usd: Numeric,
    #[serde(rename = "totalValueLockedUSD")]
    total_value_locked_usd: Numeric,
    #[serde(rename = "txCount")]
    tx_count: Numeric,
}

/// `getToken` result
#[derive(Debug, Deserialize)]
struct TokenLookup {
    tokens: Vec<RawIndexedToken>,
}

/// `getPool` result
#[derive(Debug, Deserialize)]
struct PoolLookup {
    pools: Vec<RawPool>,
}

/// Token price in the native asset
#[derive(Debug, Deserialize)]
struct RawDerivedPrice {
    #[serde(rename = "derivedETH")]
    derived_eth: Numeric,
}

/// USD price of the native asset
#[derive(Debug, Deserialize)]
struct RawBundle {
    #[serde(rename = "ethPriceUSD")]
    eth_price_usd: Numeric,
}

/// `getTokenPrice` result
#[derive(Debug, Deserialize)]
struct PriceLookup {
    tokens: Vec<RawDerivedPrice>,
    bundles: Vec<RawBundle>,
}

/// A token as tracked by the pool index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedToken {
    /// Address and metadata
    #[serde(flatten)]
    pub token: TokenRef,
    /// Price in the native asset
    #[serde(rename = "derivedETH")]
    pub derived_eth: BigDecimal,
    /// Lifetime traded volume in USD
    #[serde(rename = "volumeUSD")]
    pub volume_usd: BigDecimal,
    /// Value locked across all pools in USD
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: BigDecimal,
    /// Number of transactions touching the token
    pub tx_count: u64,
}

/// Parses an entity id
fn parse_address(id: &str) -> Result<Address> {
    Address::from_str(id).map_err(|_| SwapError::NoData(format!("invalid address {id:?}")))
}

impl TryFrom<RawToken> for TokenRef {
    type Error = SwapError;

    fn try_from(raw: RawToken) -> Result<Self> {
        Ok(Self {
            address: parse_address(&raw.id)?,
            decimals: raw.decimals.parse("decimals")?,
            symbol: raw.symbol,
            name: raw.name,
        })
    }
}

impl TryFrom<RawPool> for PoolRef {
    type Error = SwapError;

    fn try_from(raw: RawPool) -> Result<Self> {
        Ok(Self {
            id: parse_address(&raw.id)?,
            token0: raw.token0.try_into()?,
            token1: raw.token1.try_into()?,
            fee_tier: raw.fee_tier.parse("feeTier")?,
            liquidity: raw.liquidity.parse("liquidity")?,
            token0_price: raw
                .token0_price
                .map(|price| price.parse::<BigDecimal>("token0Price"))
                .transpose()?,
            token1_price: raw
                .token1_price
                .map(|price| price.parse::<BigDecimal>("token1Price"))
                .transpose()?,
            total_value_locked_usd: raw.total_value_locked_usd.parse("totalValueLockedUSD")?,
        })
    }
}

impl TryFrom<RawIndexedToken> for IndexedToken {
    type Error = SwapError;

    fn try_from(raw: RawIndexedToken) -> Result<Self> {
        Ok(Self {
            token: TokenRef {
                address: parse_address(&raw.id)?,
                decimals: raw.decimals.parse("decimals")?,
                symbol: raw.symbol,
                name: raw.name,
            },
            derived_eth: raw.derived_eth.parse("derivedETH")?,
            volume_usd: raw.volume_usd.parse("volumeUSD")?,
            total_value_locked_usd: raw.total_value_locked_usd.parse("totalValueLockedUSD")?,
            tx_count: raw.tx_count.parse("txCount")?,
        })
    }
}

/// First entity of a lookup, if the index knows it
fn first<R, T>(entities: Vec<R>) -> Result<Option<T>>
where
    T: TryFrom<R, Error = SwapError>,
{
    entities.into_iter().next().map(T::try_from).transpose()
}

/// USD price as `derivedETH * ethPriceUSD`, `None` when either side is missing
fn usd_price(lookup: PriceLookup) -> Result<Option<BigDecimal>> {
    let (Some(token), Some(bundle)) = (lookup.tokens.first(), lookup.bundles.first()) else {
        return Ok(None);
    };
    let derived: BigDecimal = token.derived_eth.parse("derivedETH")?;
    let native: BigDecimal = bundle.eth_price_usd.parse("ethPriceUSD")?;
    Ok(Some(derived * native))
}

/// Converts a batch of raw pools, rejecting the whole batch on any bad entry
fn convert(pools: Vec<RawPool>) -> Result<Vec<PoolRef>> {
    pools.into_iter().map(PoolRef::try_from).collect()
}

/// Unwraps a GraphQL envelope into its data
fn into_data<T>(response: GraphQlResponse<T>) -> Result<T> {
    if let Some(error) = response.errors.first() {
        return Err(SwapError::NoData(error.message.clone()));
    }
    response
        .data
        .ok_or_else(|| SwapError::NoData("response carried no data".to_string()))
}

/// Pool index served by a GraphQL subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    /// HTTP client
    http: reqwest::Client,
    /// GraphQL endpoint
    url: Url,
}

impl SubgraphClient {
    /// Creates a client for the subgraph at `url`
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    /// Posts `query` and decodes the typed result.
    ///
    /// # Errors
    /// * `NoData` on transport failure, non-success status, GraphQL errors or
    ///   a payload that does not match `T`
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response: GraphQlResponse<T> = self
            .http
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        into_data(response)
    }
}

impl SubgraphClient {
    /// Looks up a token and its statistics.
    ///
    /// # Returns
    /// `None` if the index does not track `token`
    ///
    /// # Errors
    /// * `NoData` if the index is unreachable or the entity is malformed
    pub async fn token(&self, token: Address) -> Result<Option<IndexedToken>> {
        log::debug!("sources::subgraph: token {token}");
        let data: TokenLookup = self
            .query(TOKEN_QUERY, json!({ "id": entity_id(token) }))
            .await?;
        first(data.tokens)
    }

    /// Looks up a pool by its contract address.
    ///
    /// # Errors
    /// * `NoData` if the index is unreachable or the entity is malformed
    pub async fn pool(&self, pool: Address) -> Result<Option<PoolRef>> {
        log::debug!("sources::subgraph: pool {pool}");
        let data: PoolLookup = self
            .query(&pool_query(), json!({ "id": entity_id(pool) }))
            .await?;
        first(data.pools)
    }

    /// USD price of `token` derived from its native-asset price.
    ///
    /// # Errors
    /// * `NoData` if the index is unreachable or a price is malformed
    pub async fn token_price_usd(&self, token: Address) -> Result<Option<BigDecimal>> {
        let data: PriceLookup = self
            .query(TOKEN_PRICE_QUERY, json!({ "id": entity_id(token) }))
            .await?;
        usd_price(data)
    }
}

#[async_trait]
impl PoolSource for SubgraphClient {
    async fn direct_pools(&self, token_a: Address, token_b: Address) -> Result<Vec<PoolRef>> {
        log::debug!("sources::subgraph: direct pools for {token_a} / {token_b}");
        let data: DirectPools = self
            .query(
                &direct_pools_query(),
                json!({ "token0": entity_id(token_a), "token1": entity_id(token_b) }),
            )
            .await?;
        convert(data.pools)
    }

    async fn pools_touching(
        &self,
        token_in: Address,
        token_out: Address,
    ) -> Result<(Vec<PoolRef>, Vec<PoolRef>)> {
        log::debug!("sources::subgraph: pools touching {token_in} and {token_out}");
        let data: IndirectPools = self
            .query(
                &indirect_pools_query(),
                json!({ "tokenIn": entity_id(token_in), "tokenOut": entity_id(token_out) }),
            )
            .await?;
        Ok((convert(data.pools0)?, convert(data.pools1)?))
    }
}
