use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, SwapError};
use crate::route::path::encode_path;
use crate::route::quote::{Quote, QuoteCalculator};
use crate::route::types::{Route, TokenRef};
use crate::sources::{ChainClient, ContractCall, PoolSource, TxOverrides};
use crate::utils::constants::{
    DEADLINE_SECS, MAX_NATIVE_AMOUNT_IN, NATIVE_DECIMALS, NATIVE_SWAP_GAS_LIMIT,
};
use crate::utils::units::parse_units;
use crate::utils::wallet::signer_from_key;

/// Result of an executed swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
    /// Hash of the swap transaction
    pub transaction_hash: TxHash,
    /// Sender
    pub from: Address,
    /// Input as given by the caller
    pub amount_in: String,
    /// Minimum output guaranteed by the swap, in token units
    pub amount_out: String,
    /// Input token
    pub token_in: TokenRef,
    /// Output token
    pub token_out: TokenRef,
    /// Route the swap was sent along
    pub route: Route,
    /// Hash of the follow-up unwrap, for swaps paying out the native asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unwrap_transaction_hash: Option<TxHash>,
}

/// Result of wrapping or unwrapping the native asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapReceipt {
    /// Transaction hash
    pub transaction_hash: TxHash,
    /// Sender
    pub from: Address,
    /// Amount as given by the caller
    pub amount: String,
    /// Whether the transaction succeeded
    pub success: bool,
}

/// Result of a transfer of the native asset or an ERC20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    /// Transaction hash
    pub transaction_hash: TxHash,
    /// Sender
    pub from: Address,
    /// Receiver
    pub to: Address,
    /// Token sent, absent for the native asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_address: Option<Address>,
    /// Amount as given by the caller
    pub amount: String,
}

/// Submits swaps priced by a [`QuoteCalculator`].
///
/// Every transaction is awaited until mined before the next one is sent, and a
/// private key only lives for the call that received it.
#[derive(Debug, Clone)]
pub struct SwapExecutor<S, C> {
    /// Quote source
    quotes: QuoteCalculator<S, C>,
    /// Router receiving approvals and swaps
    swap_router: Address,
    /// Wrapped native token
    wrapped_native: Address,
}

impl<S: PoolSource, C: ChainClient> SwapExecutor<S, C> {
    /// Creates an executor using the router and wrapped native token in `config`
    #[must_use]
    pub const fn new(quotes: QuoteCalculator<S, C>, config: &Config) -> Self {
        Self {
            quotes,
            swap_router: config.swap_router,
            wrapped_native: config.wrapped_native,
        }
    }

    /// Quote calculator behind the executor
    #[must_use]
    pub const fn quotes(&self) -> &QuoteCalculator<S, C> {
        &self.quotes
    }

    /// Swaps an exact amount of one ERC20 token for another.
    ///
    /// Quotes the best route, approves the router for the exact input, waits
    /// for the approval to be mined, then swaps with the quoted minimum output.
    ///
    /// # Errors
    /// * Any quote error
    /// * `InvalidKey` if the key cannot be parsed
    /// * `TransactionFailed` if the approval or the swap fails
    pub async fn swap_exact_tokens_for_tokens(
        &self,
        private_key: &str,
        token_in: Address,
        token_out: Address,
        amount_in: &str,
        slippage_percent: f64,
    ) -> Result<SwapReceipt> {
        let signer = signer_from_key(private_key)?;
        let quote = self
            .quotes
            .get_swap_quote(token_in, token_out, amount_in, slippage_percent)
            .await?;

        self.approve(&signer, &quote).await?;
        let call = self.swap_call(&quote, signer.address())?;
        let hash = self.submit(&signer, call, TxOverrides::default()).await?;

        Ok(receipt(hash, signer.address(), amount_in, quote, None))
    }

    /// Swaps an exact amount of the native asset for an ERC20 token.
    ///
    /// The router wraps the attached value itself, so no approval is sent.
    ///
    /// # Errors
    /// * `AmountTooLarge` above the native input ceiling, before anything is sent
    /// * Any quote error
    /// * `TransactionFailed` if the swap fails
    pub async fn swap_exact_native_for_tokens(
        &self,
        private_key: &str,
        token_out: Address,
        amount_in: &str,
        slippage_percent: f64,
    ) -> Result<SwapReceipt> {
        let signer = signer_from_key(private_key)?;
        let raw = parse_units(amount_in, NATIVE_DECIMALS)?;
        let ceiling = U256::from(MAX_NATIVE_AMOUNT_IN) * U256::from(10).pow(U256::from(NATIVE_DECIMALS));
        if raw > ceiling {
            return Err(SwapError::AmountTooLarge {
                amount: amount_in.to_string(),
                max: MAX_NATIVE_AMOUNT_IN,
            });
        }

        let quote = self
            .quotes
            .get_swap_quote(self.wrapped_native, token_out, amount_in, slippage_percent)
            .await?;
        let call = self.swap_call(&quote, signer.address())?;
        let overrides = TxOverrides {
            value: Some(quote.amount_in),
            gas_limit: Some(NATIVE_SWAP_GAS_LIMIT),
        };
        let hash = self.submit(&signer, call, overrides).await?;

        Ok(receipt(hash, signer.address(), amount_in, quote, None))
    }

    /// Swaps an exact amount of an ERC20 token for the native asset.
    ///
    /// The swap pays the wrapped token to the router; once it is mined the
    /// router unwraps the quoted minimum to the sender.
    ///
    /// # Errors
    /// * Any quote error
    /// * `TransactionFailed` if the approval, the swap or the unwrap fails
    pub async fn swap_exact_tokens_for_native(
        &self,
        private_key: &str,
        token_in: Address,
        amount_in: &str,
        slippage_percent: f64,
    ) -> Result<SwapReceipt> {
        let signer = signer_from_key(private_key)?;
        let quote = self
            .quotes
            .get_swap_quote(token_in, self.wrapped_native, amount_in, slippage_percent)
            .await?;

        self.approve(&signer, &quote).await?;
        let call = self.swap_call(&quote, self.swap_router)?;
        let hash = self.submit(&signer, call, TxOverrides::default()).await?;

        let unwrap = ContractCall::UnwrapWeth9 {
            amount_minimum: quote.minimum_amount_out,
            recipient: signer.address(),
        };
        let unwrap_hash = self.submit(&signer, unwrap, TxOverrides::default()).await?;

        Ok(receipt(
            hash,
            signer.address(),
            amount_in,
            quote,
            Some(unwrap_hash),
        ))
    }

    /// Wraps `amount` of the native asset.
    ///
    /// # Errors
    /// * `InvalidAmount` if `amount` is not a valid native amount
    /// * `TransactionFailed` if the deposit fails
    pub async fn wrap_native_asset(&self, private_key: &str, amount: &str) -> Result<WrapReceipt> {
        let signer = signer_from_key(private_key)?;
        let raw = parse_units(amount, NATIVE_DECIMALS)?;
        let hash = self
            .submit(&signer, ContractCall::Deposit { amount: raw }, TxOverrides::default())
            .await?;
        Ok(WrapReceipt {
            transaction_hash: hash,
            from: signer.address(),
            amount: amount.to_string(),
            success: true,
        })
    }

    /// Unwraps `amount` of the wrapped native token.
    ///
    /// # Errors
    /// * `InsufficientBalance` if the wrapped balance is below `amount`, before anything is sent
    /// * `TransactionFailed` if the withdrawal fails
    pub async fn unwrap_wrapped(&self, private_key: &str, amount: &str) -> Result<WrapReceipt> {
        let signer = signer_from_key(private_key)?;
        let raw = parse_units(amount, NATIVE_DECIMALS)?;
        let balance = self
            .quotes
            .chain()
            .balance_of(self.wrapped_native, signer.address())
            .await?;
        if balance < raw {
            return Err(SwapError::InsufficientBalance {
                required: raw,
                available: balance,
            });
        }

        let hash = self
            .submit(&signer, ContractCall::Withdraw { amount: raw }, TxOverrides::default())
            .await?;
        Ok(WrapReceipt {
            transaction_hash: hash,
            from: signer.address(),
            amount: amount.to_string(),
            success: true,
        })
    }

    /// Sends `amount` of the native asset to `to`.
    ///
    /// # Errors
    /// * `InvalidAmount` if `amount` is not a valid native amount
    /// * `TransactionFailed` if the transfer fails
    pub async fn send_native(
        &self,
        private_key: &str,
        to: Address,
        amount: &str,
    ) -> Result<TransferReceipt> {
        let signer = signer_from_key(private_key)?;
        let raw = parse_units(amount, NATIVE_DECIMALS)?;
        let hash = self
            .submit(
                &signer,
                ContractCall::NativeTransfer { to, amount: raw },
                TxOverrides::default(),
            )
            .await?;
        Ok(TransferReceipt {
            transaction_hash: hash,
            from: signer.address(),
            to,
            token_address: None,
            amount: amount.to_string(),
        })
    }

    /// Sends `amount` of `token` to `to`, scaled by the token's on-chain decimals.
    ///
    /// # Errors
    /// * `Rpc` if the token metadata cannot be read
    /// * `InvalidAmount` if `amount` does not fit the token's decimals
    /// * `TransactionFailed` if the transfer fails
    pub async fn send_token(
        &self,
        private_key: &str,
        token: Address,
        to: Address,
        amount: &str,
    ) -> Result<TransferReceipt> {
        let signer = signer_from_key(private_key)?;
        let info = self.quotes.chain().token_info(token).await?;
        let raw = parse_units(amount, info.decimals)?;
        let call = ContractCall::Transfer {
            token,
            to,
            amount: raw,
        };
        let hash = self.submit(&signer, call, TxOverrides::default()).await?;
        Ok(TransferReceipt {
            transaction_hash: hash,
            from: signer.address(),
            to,
            token_address: Some(token),
            amount: amount.to_string(),
        })
    }

    /// Approves the router for the quoted input and waits for it to be mined
    async fn approve(&self, signer: &PrivateKeySigner, quote: &Quote) -> Result<TxHash> {
        let call = ContractCall::Approve {
            token: quote.token_in.address,
            spender: self.swap_router,
            amount: quote.amount_in,
        };
        self.submit(signer, call, TxOverrides::default()).await
    }

    /// Router call for `quote`: single-pool routes use `exactInputSingle`,
    /// two-hop routes `exactInput` over the encoded path.
    fn swap_call(&self, quote: &Quote, recipient: Address) -> Result<ContractCall> {
        let fees = quote.route.fees();
        let deadline = deadline();
        if let [fee] = fees.as_slice() {
            return Ok(ContractCall::ExactInputSingle {
                token_in: quote.token_in.address,
                token_out: quote.token_out.address,
                fee: *fee,
                recipient,
                deadline,
                amount_in: quote.amount_in,
                amount_out_minimum: quote.minimum_amount_out,
            });
        }

        let tokens = quote
            .route
            .token_path(quote.token_in.address, quote.token_out.address);
        Ok(ContractCall::ExactInput {
            path: encode_path(&tokens, &fees)?,
            recipient,
            deadline,
            amount_in: quote.amount_in,
            amount_out_minimum: quote.minimum_amount_out,
        })
    }

    /// Sends `call` and requires a successful receipt
    async fn submit(
        &self,
        signer: &PrivateKeySigner,
        call: ContractCall,
        overrides: TxOverrides,
    ) -> Result<TxHash> {
        let description = format!("{call:?}");
        let receipt = self.quotes.chain().send(signer, call, overrides).await?;
        if !receipt.success {
            log::error!("route::executor: transaction {} reverted", receipt.hash);
            return Err(SwapError::TransactionFailed {
                hash: Some(receipt.hash),
                reason: "execution reverted".to_string(),
            });
        }
        log::info!("route::executor: {} confirmed: {description}", receipt.hash);
        Ok(receipt.hash)
    }
}

/// Unix time after which a swap sent now reverts
fn deadline() -> u64 {
    u64::try_from(Utc::now().timestamp() + DEADLINE_SECS).unwrap_or_default()
}

/// Receipt for a swap along `quote`
fn receipt(
    hash: TxHash,
    from: Address,
    amount_in: &str,
    quote: Quote,
    unwrap_transaction_hash: Option<TxHash>,
) -> SwapReceipt {
    SwapReceipt {
        transaction_hash: hash,
        from,
        amount_in: amount_in.to_string(),
        amount_out: quote.formatted_minimum_amount_out,
        token_in: quote.token_in,
        token_out: quote.token_out,
        route: quote.route,
        unwrap_transaction_hash,
    }
}
