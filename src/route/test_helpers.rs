#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

use super::finder::RouteFinder;
use super::quote::QuoteCalculator;
use super::types::{PoolRef, TokenRef};
use crate::error::{Result, SwapError};
use crate::sources::{ChainClient, ContractCall, PoolSource, TxOverrides, TxReceipt};

/// Well-known development key
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address of [`TEST_KEY`]
pub const TEST_ADDRESS: Address = alloy::primitives::address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Deterministic address for a short label
#[allow(dead_code)]
pub fn addr(label: &str) -> Address {
    Address::left_padding_from(label.as_bytes())
}

/// Label an address was built from, or its hex form
#[allow(dead_code)]
pub fn label(address: Address) -> String {
    let bytes: Vec<u8> = address.iter().copied().skip_while(|byte| *byte == 0).collect();
    match String::from_utf8(bytes) {
        Ok(text) if text.chars().all(|c| c.is_ascii_alphanumeric()) => text,
        _ => address.to_string(),
    }
}

#[allow(dead_code)]
pub fn token(label: &str) -> TokenRef {
    TokenRef::new(addr(label), label, label, 18)
}

/// Pool with liquidity between two labelled tokens
#[allow(dead_code)]
pub fn pool(id: &str, token0: &str, token1: &str, fee_tier: u32, tvl: u64) -> PoolRef {
    PoolRef {
        id: addr(id),
        token0: token(token0),
        token1: token(token1),
        fee_tier,
        liquidity: 1_000_000,
        token0_price: None,
        token1_price: None,
        total_value_locked_usd: BigDecimal::from(tvl),
    }
}

#[allow(dead_code)]
pub fn pools(args: &[(&str, &str, &str, u32, u64)]) -> Vec<PoolRef> {
    args.iter()
        .map(|(id, token0, token1, fee, tvl)| pool(id, token0, token1, *fee, *tvl))
        .collect()
}

#[allow(dead_code)]
pub fn calculator(source: MockPools, chain: MockChain) -> QuoteCalculator<MockPools, MockChain> {
    QuoteCalculator::new(RouteFinder::new(source), chain)
}

/// In-memory pool index counting the queries it answers
#[derive(Debug, Clone, Default)]
pub struct MockPools {
    direct: Vec<PoolRef>,
    pools0: Vec<PoolRef>,
    pools1: Vec<PoolRef>,
    unavailable: bool,
    direct_calls: Arc<AtomicUsize>,
    indirect_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockPools {
    pub fn new(
        direct: &[(&str, &str, &str, u32, u64)],
        pools0: &[(&str, &str, &str, u32, u64)],
        pools1: &[(&str, &str, &str, u32, u64)],
    ) -> Self {
        Self {
            direct: pools(direct),
            pools0: pools(pools0),
            pools1: pools(pools1),
            ..Self::default()
        }
    }

    pub fn with_direct(direct: Vec<PoolRef>) -> Self {
        Self {
            direct,
            ..Self::default()
        }
    }

    pub fn new_indirect(pools0: Vec<PoolRef>, pools1: Vec<PoolRef>) -> Self {
        Self {
            pools0,
            pools1,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn direct_calls(&self) -> usize {
        self.direct_calls.load(Ordering::SeqCst)
    }

    pub fn indirect_calls(&self) -> usize {
        self.indirect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolSource for MockPools {
    async fn direct_pools(&self, _token_a: Address, _token_b: Address) -> Result<Vec<PoolRef>> {
        self.direct_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SwapError::NoData("connection refused".to_string()));
        }
        Ok(self.direct.clone())
    }

    async fn pools_touching(
        &self,
        _token_in: Address,
        _token_out: Address,
    ) -> Result<(Vec<PoolRef>, Vec<PoolRef>)> {
        self.indirect_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SwapError::NoData("connection refused".to_string()));
        }
        Ok((self.pools0.clone(), self.pools1.clone()))
    }
}

/// Outcome of a simulated quote
#[derive(Debug, Clone)]
enum QuoteRule {
    /// `amount_out = amount_in * numerator / denominator`
    Rate(u64, u64),
    /// Simulation reverts with this reason
    Revert(String),
}

/// In-memory chain recording every call in order
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    tokens: HashMap<Address, TokenRef>,
    quotes: HashMap<(Address, Address), QuoteRule>,
    balances: HashMap<(Address, Address), U256>,
    reverting: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<(Address, ContractCall, TxOverrides)>>>,
}

#[allow(dead_code)]
impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, label: &str, decimals: u8) -> Self {
        let mut token = token(label);
        token.decimals = decimals;
        self.tokens.insert(token.address, token);
        self
    }

    pub fn with_token_at(mut self, address: Address, symbol: &str, decimals: u8) -> Self {
        self.tokens
            .insert(address, TokenRef::new(address, symbol, symbol, decimals));
        self
    }

    pub fn with_rate(mut self, token_in: &str, token_out: &str, numerator: u64, denominator: u64) -> Self {
        self.quotes.insert(
            (addr(token_in), addr(token_out)),
            QuoteRule::Rate(numerator, denominator),
        );
        self
    }

    pub fn with_rate_at(mut self, token_in: Address, token_out: Address, numerator: u64, denominator: u64) -> Self {
        self.quotes
            .insert((token_in, token_out), QuoteRule::Rate(numerator, denominator));
        self
    }

    pub fn with_revert(mut self, token_in: &str, token_out: &str, reason: &str) -> Self {
        self.quotes.insert(
            (addr(token_in), addr(token_out)),
            QuoteRule::Revert(reason.to_string()),
        );
        self
    }

    pub fn with_balance(mut self, token: Address, owner: Address, amount: U256) -> Self {
        self.balances.insert((token, owner), amount);
        self
    }

    /// Every transaction whose label matches mines with a failed status
    pub fn reverting(mut self, call_label: &str) -> Self {
        self.reverting = Some(call_label.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(Address, ContractCall, TxOverrides)> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

/// Short name of a contract call
pub fn call_label(call: &ContractCall) -> &'static str {
    match call {
        ContractCall::Approve { .. } => "approve",
        ContractCall::ExactInputSingle { .. } => "exactInputSingle",
        ContractCall::ExactInput { .. } => "exactInput",
        ContractCall::UnwrapWeth9 { .. } => "unwrapWETH9",
        ContractCall::Deposit { .. } => "deposit",
        ContractCall::Withdraw { .. } => "withdraw",
        ContractCall::Transfer { .. } => "transfer",
        ContractCall::NativeTransfer { .. } => "nativeTransfer",
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn token_info(&self, token: Address) -> Result<TokenRef> {
        self.record(format!("token_info {}", label(token)));
        self.tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| SwapError::Rpc(format!("no token at {token}")))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.record(format!("balance_of {}", label(token)));
        Ok(self.balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        fee: u32,
    ) -> Result<U256> {
        self.record(format!(
            "quote {}->{} {amount_in} fee {fee}",
            label(token_in),
            label(token_out)
        ));
        match self.quotes.get(&(token_in, token_out)) {
            Some(QuoteRule::Rate(numerator, denominator)) => {
                Ok(amount_in * U256::from(*numerator) / U256::from(*denominator))
            }
            Some(QuoteRule::Revert(reason)) => {
                Err(SwapError::Quote(format!("execution reverted: {reason}")))
            }
            None => Err(SwapError::Quote("execution reverted: no pool".to_string())),
        }
    }

    async fn send(
        &self,
        signer: &PrivateKeySigner,
        call: ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxReceipt> {
        let name = call_label(&call);
        self.record(format!("send {name}"));
        let nonce = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((signer.address(), call, overrides));
            sent.len()
        };
        let success = self.reverting.as_deref() != Some(name);
        self.record(format!("mined {name}"));
        #[allow(clippy::cast_possible_truncation)]
        let hash = TxHash::with_last_byte(nonce as u8);
        Ok(TxReceipt { hash, success })
    }
}
