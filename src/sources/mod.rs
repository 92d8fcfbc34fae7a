//! # Sources
//!
//! The two collaborators the engine talks to: the pool index it searches for
//! routes and the chain it quotes against and submits transactions to. Both are
//! traits so route discovery, quoting and execution can run against in-memory
//! doubles.

/// Contract bindings
pub mod contracts;
/// Chain access over JSON-RPC
pub mod chain;
/// Pool index over GraphQL
pub mod subgraph;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::error::Result;
use crate::route::types::{PoolRef, TokenRef};

pub use chain::{EvmClient, PoolState};
pub use subgraph::{IndexedToken, SubgraphClient};

/// Searchable index of pools.
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Pools whose two tokens are both in `{token_a, token_b}`, with liquidity.
    async fn direct_pools(&self, token_a: Address, token_b: Address) -> Result<Vec<PoolRef>>;

    /// Pools holding `token_in` and pools holding `token_out`, with liquidity.
    async fn pools_touching(
        &self,
        token_in: Address,
        token_out: Address,
    ) -> Result<(Vec<PoolRef>, Vec<PoolRef>)>;
}

/// A state-changing contract call, described by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// `IERC20.approve`
    Approve {
        /// Token being approved
        token: Address,
        /// Allowed spender
        spender: Address,
        /// Allowance in raw units
        amount: U256,
    },
    /// `ISwapRouter.exactInputSingle`
    ExactInputSingle {
        /// Input token
        token_in: Address,
        /// Output token
        token_out: Address,
        /// Pool fee tier
        fee: u32,
        /// Receiver of the output
        recipient: Address,
        /// Unix time after which the swap reverts
        deadline: u64,
        /// Raw input
        amount_in: U256,
        /// Raw minimum output
        amount_out_minimum: U256,
    },
    /// `ISwapRouter.exactInput`
    ExactInput {
        /// Packed path from `encode_path`
        path: Bytes,
        /// Receiver of the output
        recipient: Address,
        /// Unix time after which the swap reverts
        deadline: u64,
        /// Raw input
        amount_in: U256,
        /// Raw minimum output
        amount_out_minimum: U256,
    },
    /// `ISwapRouter.unwrapWETH9`
    UnwrapWeth9 {
        /// Raw minimum to unwrap
        amount_minimum: U256,
        /// Receiver of the native asset
        recipient: Address,
    },
    /// `IWETH9.deposit`, paying `amount` as value
    Deposit {
        /// Raw amount to wrap
        amount: U256,
    },
    /// `IWETH9.withdraw`
    Withdraw {
        /// Raw amount to unwrap
        amount: U256,
    },
    /// `IERC20.transfer`
    Transfer {
        /// Token being sent
        token: Address,
        /// Receiver
        to: Address,
        /// Raw amount
        amount: U256,
    },
    /// Plain transfer of the native asset, paying `amount` as value
    NativeTransfer {
        /// Receiver
        to: Address,
        /// Raw amount in wei
        amount: U256,
    },
}

/// Value and gas settings attached to a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOverrides {
    /// Native value sent with the call
    pub value: Option<U256>,
    /// Fixed gas limit instead of an estimate
    pub gas_limit: Option<u64>,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub hash: TxHash,
    /// Whether execution succeeded
    pub success: bool,
}

/// Reads and writes against the chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// ERC20 metadata of `token`
    async fn token_info(&self, token: Address) -> Result<TokenRef>;

    /// ERC20 balance of `owner`
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    /// Simulated single-pool trade, returning the raw output.
    ///
    /// A revert surfaces as `SwapError::Quote` with its reason.
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        fee: u32,
    ) -> Result<U256>;

    /// Signs and submits `call`, waiting for it to be mined.
    ///
    /// A transaction that never produces a receipt surfaces as
    /// `SwapError::TransactionFailed`.
    async fn send(
        &self,
        signer: &PrivateKeySigner,
        call: ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxReceipt>;
}
