//! JSON-RPC chain access.
//!
//! Reads go through one shared provider. Writes build a wallet provider around
//! the caller's signer for the duration of a single call, so no key material
//! outlives the operation that needed it.

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;
use url::Url;

use super::contracts::{IQuoterV2, ISwapRouter, IUniswapV3Pool, IERC20, IWETH9};
use super::{ChainClient, ContractCall, TxOverrides, TxReceipt};
use crate::config::Config;
use crate::error::{Result, SwapError};
use crate::route::types::TokenRef;

/// On-chain state of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    /// Pool contract
    pub address: Address,
    /// First token
    pub token0: Address,
    /// Second token
    pub token1: Address,
    /// Fee tier in parts per million
    pub fee: u32,
    /// Active liquidity
    pub liquidity: u128,
    /// Current sqrt price as Q64.96
    pub sqrt_price_x96: U160,
    /// Current tick
    pub tick: i32,
    /// Pool balance of token0
    pub reserve0: U256,
    /// Pool balance of token1
    pub reserve1: U256,
}

/// Contract addresses a call may target
#[derive(Debug, Clone, Copy)]
struct Targets {
    /// Swap router
    swap_router: Address,
    /// Wrapped native token
    wrapped_native: Address,
}

/// Chain client backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct EvmClient {
    /// Read-only provider
    provider: DynProvider,
    /// Endpoint wallet providers connect to
    rpc_url: Url,
    /// Chain id transactions are signed for
    chain_id: u64,
    /// `QuoterV2` contract
    quoter: Address,
    /// Write targets
    targets: Targets,
}

impl EvmClient {
    /// Connects to the endpoint in `config`
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let provider = ProviderBuilder::new()
            .connect_http(config.rpc_url().clone())
            .erased();
        Self {
            provider,
            rpc_url: config.rpc_url().clone(),
            chain_id: config.chain_id,
            quoter: config.quoter,
            targets: Targets {
                swap_router: config.swap_router,
                wrapped_native: config.wrapped_native,
            },
        }
    }

    /// Reads the live state of a pool together with its token balances.
    ///
    /// # Errors
    /// * `Rpc` if any of the reads fail
    pub async fn pool_state(&self, pool: Address) -> Result<PoolState> {
        let contract = IUniswapV3Pool::new(pool, self.provider.clone());
        let (token0, token1, fee, liquidity, slot0) = tokio::try_join!(
            async { contract.token0().call().await },
            async { contract.token1().call().await },
            async { contract.fee().call().await },
            async { contract.liquidity().call().await },
            async { contract.slot0().call().await },
        )?;

        let reserves = try_join_all([token0, token1].map(|token| self.balance_of(token, pool))).await?;

        Ok(PoolState {
            address: pool,
            token0,
            token1,
            fee: fee.to::<u32>(),
            liquidity,
            sqrt_price_x96: slot0.sqrtPriceX96,
            tick: i32::try_from(slot0.tick).map_err(|e| SwapError::Rpc(e.to_string()))?,
            reserve0: reserves[0],
            reserve1: reserves[1],
        })
    }
}

/// 24-bit fee argument
fn fee_arg(fee: u32) -> Result<U24> {
    U24::try_from(fee).map_err(|_| SwapError::Encoding(format!("fee {fee} exceeds 24 bits")))
}

/// Target contract and calldata of `call`
fn encode_call(call: &ContractCall, targets: Targets) -> Result<(Address, Bytes)> {
    let encoded = match call {
        ContractCall::Approve {
            token,
            spender,
            amount,
        } => (
            *token,
            IERC20::approveCall {
                spender: *spender,
                amount: *amount,
            }
            .abi_encode(),
        ),
        ContractCall::ExactInputSingle {
            token_in,
            token_out,
            fee,
            recipient,
            deadline,
            amount_in,
            amount_out_minimum,
        } => (
            targets.swap_router,
            ISwapRouter::exactInputSingleCall {
                params: ISwapRouter::ExactInputSingleParams {
                    tokenIn: *token_in,
                    tokenOut: *token_out,
                    fee: fee_arg(*fee)?,
                    recipient: *recipient,
                    deadline: U256::from(*deadline),
                    amountIn: *amount_in,
                    amountOutMinimum: *amount_out_minimum,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode(),
        ),
        ContractCall::ExactInput {
            path,
            recipient,
            deadline,
            amount_in,
            amount_out_minimum,
        } => (
            targets.swap_router,
            ISwapRouter::exactInputCall {
                params: ISwapRouter::ExactInputParams {
                    path: path.clone(),
                    recipient: *recipient,
                    deadline: U256::from(*deadline),
                    amountIn: *amount_in,
                    amountOutMinimum: *amount_out_minimum,
                },
            }
            .abi_encode(),
        ),
        ContractCall::UnwrapWeth9 {
            amount_minimum,
            recipient,
        } => (
            targets.swap_router,
            ISwapRouter::unwrapWETH9Call {
                amountMinimum: *amount_minimum,
                recipient: *recipient,
            }
            .abi_encode(),
        ),
        ContractCall::Deposit { .. } => (targets.wrapped_native, IWETH9::depositCall {}.abi_encode()),
        ContractCall::Withdraw { amount } => (
            targets.wrapped_native,
            IWETH9::withdrawCall { wad: *amount }.abi_encode(),
        ),
        ContractCall::Transfer { token, to, amount } => (
            *token,
            IERC20::transferCall {
                to: *to,
                amount: *amount,
            }
            .abi_encode(),
        ),
        ContractCall::NativeTransfer { to, .. } => (*to, Vec::new()),
    };
    Ok((encoded.0, encoded.1.into()))
}

#[async_trait]
impl ChainClient for EvmClient {
    async fn token_info(&self, token: Address) -> Result<TokenRef> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let (name, symbol, decimals) = tokio::try_join!(
            async { erc20.name().call().await },
            async { erc20.symbol().call().await },
            async { erc20.decimals().call().await },
        )?;
        Ok(TokenRef {
            address: token,
            symbol,
            name,
            decimals,
        })
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await?)
    }

    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        fee: u32,
    ) -> Result<U256> {
        let quoter = IQuoterV2::new(self.quoter, self.provider.clone());
        let quote = quoter
            .quoteExactInputSingle(IQuoterV2::QuoteExactInputSingleParams {
                tokenIn: token_in,
                tokenOut: token_out,
                amountIn: amount_in,
                fee: fee_arg(fee)?,
                sqrtPriceLimitX96: U160::ZERO,
            })
            .call()
            .await
            .map_err(|e| SwapError::Quote(e.to_string()))?;
        Ok(quote.amountOut)
    }

    async fn send(
        &self,
        signer: &PrivateKeySigner,
        call: ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxReceipt> {
        let (to, input) = encode_call(&call, self.targets)?;
        let value = match call {
            ContractCall::Deposit { amount } | ContractCall::NativeTransfer { amount, .. } => {
                Some(amount)
            }
            _ => overrides.value,
        };

        let mut tx = TransactionRequest::default()
            .with_from(signer.address())
            .with_to(to)
            .with_input(input)
            .with_chain_id(self.chain_id);
        if let Some(value) = value {
            tx = tx.with_value(value);
        }
        if let Some(gas_limit) = overrides.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(self.rpc_url.clone());
        let pending = provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        log::info!("sources::chain: submitted {hash} to {to}");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| SwapError::TransactionFailed {
                hash: Some(hash),
                reason: e.to_string(),
            })?;

        Ok(TxReceipt {
            hash,
            success: receipt.status(),
        })
    }
}
