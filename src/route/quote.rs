use std::str::FromStr;

use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::Serialize;

use crate::error::{Result, SwapError};
use crate::route::finder::RouteFinder;
use crate::route::types::{Route, TokenRef};
use crate::sources::{ChainClient, PoolSource};
use crate::utils::units::{format_units, parse_units, to_decimal, truncate_to_raw};

/// Priced trade along the best route, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Raw input
    pub amount_in: U256,
    /// Raw output expected from the simulation
    pub amount_out: U256,
    /// Raw output guaranteed after slippage
    pub minimum_amount_out: U256,
    /// `amount_out` in token units
    pub formatted_amount_out: String,
    /// `minimum_amount_out` in token units
    pub formatted_minimum_amount_out: String,
    /// Input token metadata read from chain
    pub token_in: TokenRef,
    /// Output token metadata read from chain
    pub token_out: TokenRef,
    /// Route the quote was simulated along
    pub route: Route,
    /// Price impact in percent, never negative
    pub price_impact: f64,
    /// Recorded mid price of the route, output per input
    pub mid_price: BigDecimal,
    /// Slippage tolerance applied, in percent
    pub slippage_percent: f64,
}

/// Prices trades by simulating them against the on-chain quoter.
#[derive(Debug, Clone)]
pub struct QuoteCalculator<S, C> {
    /// Route discovery
    finder: RouteFinder<S>,
    /// Chain access
    chain: C,
}

impl<S: PoolSource, C: ChainClient> QuoteCalculator<S, C> {
    /// Creates a calculator over a pool index and a chain
    #[must_use]
    pub const fn new(finder: RouteFinder<S>, chain: C) -> Self {
        Self { finder, chain }
    }

    /// Route finder used for every quote
    #[must_use]
    pub const fn finder(&self) -> &RouteFinder<S> {
        &self.finder
    }

    /// Chain the quotes are simulated on
    #[must_use]
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Quotes swapping `amount_in` of `token_in` for `token_out` along the best route.
    ///
    /// Both tokens' metadata are read concurrently. On an indirect route the
    /// second hop is simulated with the first hop's output, so the two quoter
    /// calls run one after the other.
    ///
    /// # Arguments
    /// * `amount_in` - Human-readable input amount, e.g. `"1.5"`
    /// * `slippage_percent` - Tolerance in percent, e.g. `0.5`
    ///
    /// # Errors
    /// * `InvalidSlippage` if the tolerance is outside `[0, 100]`
    /// * `NoRoute` / `NoData` from route discovery
    /// * `InvalidAmount` if `amount_in` does not fit the input token's decimals
    /// * `Quote` if a simulation reverts
    pub async fn get_swap_quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &str,
        slippage_percent: f64,
    ) -> Result<Quote> {
        let factor = slippage_factor(slippage_percent)?;
        let route = self.finder.best_route(token_in, token_out).await?;
        let (info_in, info_out) = tokio::try_join!(
            self.chain.token_info(token_in),
            self.chain.token_info(token_out)
        )?;
        let amount_in_raw = parse_units(amount_in, info_in.decimals)?;

        let (amount_out, mid_price) = match (route.hops.as_slice(), &route.intermediary) {
            ([pool], None) => {
                let out = self
                    .chain
                    .quote_exact_input_single(token_in, token_out, amount_in_raw, pool.fee_tier)
                    .await?;
                (out, pool.mid_price(token_in))
            }
            ([first, second], Some(intermediary)) => {
                let middle = self
                    .chain
                    .quote_exact_input_single(
                        token_in,
                        intermediary.address,
                        amount_in_raw,
                        first.fee_tier,
                    )
                    .await?;
                let out = self
                    .chain
                    .quote_exact_input_single(
                        intermediary.address,
                        token_out,
                        middle,
                        second.fee_tier,
                    )
                    .await?;
                log::debug!(
                    "route::quote: first hop yields {middle} {}",
                    intermediary.symbol
                );
                (
                    out,
                    first.mid_price(token_in) * second.mid_price(intermediary.address),
                )
            }
            _ => return Err(SwapError::Quote("route has an unexpected shape".to_string())),
        };

        let minimum_amount_out = apply_factor(amount_out, &factor)?;
        let price_impact = price_impact_percent(
            &to_decimal(amount_in_raw, info_in.decimals),
            &to_decimal(amount_out, info_out.decimals),
            &mid_price,
        );

        let quote = Quote {
            amount_in: amount_in_raw,
            amount_out,
            minimum_amount_out,
            formatted_amount_out: format_units(amount_out, info_out.decimals),
            formatted_minimum_amount_out: format_units(minimum_amount_out, info_out.decimals),
            token_in: info_in,
            token_out: info_out,
            route,
            price_impact,
            mid_price,
            slippage_percent,
        };
        log::info!(
            "route::quote: {amount_in} {} -> {} {} (min {}) via {} route, impact {:.4}%",
            quote.token_in.symbol,
            quote.formatted_amount_out,
            quote.token_out.symbol,
            quote.formatted_minimum_amount_out,
            quote.route.kind,
            quote.price_impact
        );
        Ok(quote)
    }
}

/// `(1000 - slippage * 10) / 1000` kept exact in decimal
fn slippage_factor(slippage_percent: f64) -> Result<BigDecimal> {
    if !slippage_percent.is_finite() || !(0.0..=100.0).contains(&slippage_percent) {
        return Err(SwapError::InvalidSlippage(slippage_percent));
    }
    let slippage = BigDecimal::from_str(&slippage_percent.to_string())
        .map_err(|_| SwapError::InvalidSlippage(slippage_percent))?;
    Ok((BigDecimal::from(1000) - slippage * BigDecimal::from(10)) / BigDecimal::from(1000))
}

/// `floor(amount * factor)`
fn apply_factor(amount: U256, factor: &BigDecimal) -> Result<U256> {
    truncate_to_raw(&(to_decimal(amount, 0) * factor))
        .ok_or_else(|| SwapError::Quote(format!("{amount} scaled by {factor} overflows")))
}

/// Lowest raw output accepted for `amount_out` under `slippage_percent`.
///
/// Computes `floor(amount_out * (1000 - slippage * 10) / 1000)`, so the result
/// never exceeds `amount_out`.
///
/// # Errors
/// * `InvalidSlippage` if the tolerance is outside `[0, 100]`
pub fn minimum_amount_out(amount_out: U256, slippage_percent: f64) -> Result<U256> {
    apply_factor(amount_out, &slippage_factor(slippage_percent)?)
}

/// Highest raw input accepted for `amount_in` under `slippage_percent`.
///
/// Computes `floor(amount_in * 1000 / (1000 - slippage * 10))`.
///
/// # Errors
/// * `InvalidSlippage` if the tolerance is outside `[0, 100)`
pub fn maximum_amount_in(amount_in: U256, slippage_percent: f64) -> Result<U256> {
    let factor = slippage_factor(slippage_percent)?;
    if factor.is_zero() {
        return Err(SwapError::InvalidSlippage(slippage_percent));
    }
    let scaled = to_decimal(amount_in, 0) / factor;
    truncate_to_raw(&scaled)
        .ok_or_else(|| SwapError::Quote(format!("{amount_in} at {slippage_percent}% overflows")))
}

/// Shortfall of `amount_out` against `amount_in * mid_price`, in percent.
///
/// Amounts are in token units. Returns 0 when the output beats the mid price
/// or when no mid price is recorded.
#[must_use]
pub fn price_impact_percent(
    amount_in: &BigDecimal,
    amount_out: &BigDecimal,
    mid_price: &BigDecimal,
) -> f64 {
    let expected = amount_in * mid_price;
    if expected <= BigDecimal::zero() {
        return 0.0;
    }
    let impact = (&expected - amount_out) / &expected * BigDecimal::from(100);
    impact.to_f64().unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::route::test_helpers::*;
    use crate::route::types::RouteKind;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_minimum_amount_out() {
        for (amount, slippage, expected) in &[
            (1000_u64, 0.5, 995_u64),
            (1000, 0.0, 1000),
            (1000, 1.0, 990),
            (1001, 0.5, 995),
            (1, 0.5, 0),
            (123_456_789, 0.3, 123_086_418),
            (1000, 100.0, 0),
        ] {
            assert_eq!(
                minimum_amount_out(U256::from(*amount), *slippage).unwrap(),
                U256::from(*expected)
            );
        }
    }

    #[test]
    fn test_minimum_never_exceeds_output() {
        for _ in 0..200 {
            let amount = U256::from(fastrand::u64(..));
            let slippage = f64::from(fastrand::u32(0..10_000)) / 100.0;
            let minimum = minimum_amount_out(amount, slippage).unwrap();
            assert!(minimum <= amount);

            if amount > U256::from(1_000_000_000_u64) {
                let ratio = to_decimal(minimum, 0) / to_decimal(amount, 0);
                let expected = (1000.0 - slippage * 10.0) / 1000.0;
                assert!((ratio.to_f64().unwrap() - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_invalid_slippage() {
        for slippage in [-0.1, 100.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                minimum_amount_out(U256::from(1000), slippage),
                Err(SwapError::InvalidSlippage(_))
            ));
        }
        assert!(matches!(
            maximum_amount_in(U256::from(1000), 100.0),
            Err(SwapError::InvalidSlippage(_))
        ));
    }

    #[test]
    fn test_maximum_amount_in() {
        for (amount, slippage, expected) in &[
            (995_u64, 0.5, 1000_u64),
            (1000, 0.0, 1000),
            (990, 1.0, 1000),
            (1000, 50.0, 2000),
        ] {
            assert_eq!(
                maximum_amount_in(U256::from(*amount), *slippage).unwrap(),
                U256::from(*expected)
            );
        }
    }

    #[test]
    fn test_price_impact() {
        for (amount_in, amount_out, mid, expected) in &[
            ("10", "19", "2", 5.0),
            ("10", "20", "2", 0.0),
            ("10", "25", "2", 0.0),
            ("1", "0.5", "1", 50.0),
            ("10", "19", "0", 0.0),
        ] {
            let impact = price_impact_percent(&dec(amount_in), &dec(amount_out), &dec(mid));
            assert!((impact - expected).abs() < 1e-9, "{amount_in} {amount_out} {mid}");
        }
    }

    #[tokio::test]
    async fn test_direct_quote() {
        let mut pool = pool("P", "WETH", "USDC", 3000, 100);
        pool.token1_price = Some(dec("2000"));
        let calculator = calculator(
            MockPools::with_direct(vec![pool]),
            MockChain::new()
                .with_token("WETH", 18)
                .with_token("USDC", 6)
                .with_rate("WETH", "USDC", 1990, 1_000_000_000_000),
        );

        let quote = calculator
            .get_swap_quote(addr("WETH"), addr("USDC"), "1", 0.5)
            .await
            .unwrap();

        assert_eq!(quote.route.kind, RouteKind::Direct);
        assert_eq!(quote.amount_in, U256::from(10_u64.pow(18)));
        assert_eq!(quote.amount_out, U256::from(1_990_000_000_u64));
        assert_eq!(quote.formatted_amount_out, "1990.0");
        assert_eq!(quote.minimum_amount_out, U256::from(1_980_050_000_u64));
        assert_eq!(quote.formatted_minimum_amount_out, "1980.05");
        assert_eq!(quote.mid_price, dec("2000"));
        assert!((quote.price_impact - 0.5).abs() < 1e-9);
        assert_eq!(quote.token_out.symbol, "USDC");
    }

    #[tokio::test]
    async fn test_indirect_quote_chains_hops() {
        let mut first = pool("P0", "A", "M", 500, 10);
        first.token1_price = Some(dec("2"));
        let mut second = pool("P1", "B", "M", 3000, 20);
        second.token0_price = Some(dec("3"));
        let chain = MockChain::new()
            .with_token("A", 18)
            .with_token("B", 18)
            .with_rate("A", "M", 2, 1)
            .with_rate("M", "B", 3, 1);
        let calculator = calculator(MockPools::new_indirect(vec![first], vec![second]), chain.clone());

        let quote = calculator
            .get_swap_quote(addr("A"), addr("B"), "10", 1.0)
            .await
            .unwrap();

        assert_eq!(quote.route.kind, RouteKind::Indirect);
        assert_eq!(quote.amount_out, U256::from(60_u64) * U256::from(10_u64.pow(18)));
        assert_eq!(quote.mid_price, dec("6"));
        assert!(quote.price_impact.abs() < 1e-9);
        assert_eq!(
            chain.calls(),
            vec![
                "token_info A",
                "token_info B",
                "quote A->M 10000000000000000000 fee 500",
                "quote M->B 20000000000000000000 fee 3000",
            ]
        );
    }

    #[tokio::test]
    async fn test_quote_errors_propagate() {
        let no_route = calculator(MockPools::new(&[], &[], &[]), MockChain::new());
        assert!(matches!(
            no_route.get_swap_quote(addr("A"), addr("B"), "1", 0.5).await,
            Err(SwapError::NoRoute { .. })
        ));

        let reverting = calculator(
            MockPools::new(&[("P", "A", "B", 500, 1)], &[], &[]),
            MockChain::new()
                .with_token("A", 18)
                .with_token("B", 18)
                .with_revert("A", "B", "SPL"),
        );
        assert!(matches!(
            reverting.get_swap_quote(addr("A"), addr("B"), "1", 0.5).await,
            Err(SwapError::Quote(reason)) if reason.contains("SPL")
        ));

        let precise = calculator(
            MockPools::new(&[("P", "A", "B", 500, 1)], &[], &[]),
            MockChain::new().with_token("A", 2).with_token("B", 18),
        );
        assert!(matches!(
            precise.get_swap_quote(addr("A"), addr("B"), "1.001", 0.5).await,
            Err(SwapError::InvalidAmount { .. })
        ));

        assert!(matches!(
            precise.get_swap_quote(addr("A"), addr("B"), "1", 101.0).await,
            Err(SwapError::InvalidSlippage(_))
        ));
    }
}
