use std::env;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Error, Result};
use log::info;
use serde::Serialize;

use sailroute::config::Config;
use sailroute::utils::app_context::AppContext;
use sailroute::utils::constants::DEFAULT_SLIPPAGE_PERCENT;
use sailroute::utils::logger::setup_logger;
use sailroute::utils::wallet::wallet_address;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides SAILROUTE_RPC_URL for this invocation
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route between two tokens
    Routes { token_in: Address, token_out: Address },
    /// Quote a swap along the best route
    Quote {
        token_in: Address,
        token_out: Address,
        /// Input amount in token units, e.g. 1.5
        amount: String,
        /// Slippage tolerance in percent
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_PERCENT)]
        slippage: f64,
    },
    /// Swap an exact amount of one token for another
    Swap {
        token_in: Address,
        token_out: Address,
        amount: String,
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_PERCENT)]
        slippage: f64,
    },
    /// Swap an exact amount of the native asset for a token
    SwapNativeIn {
        token_out: Address,
        amount: String,
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_PERCENT)]
        slippage: f64,
    },
    /// Swap an exact amount of a token for the native asset
    SwapNativeOut {
        token_in: Address,
        amount: String,
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_PERCENT)]
        slippage: f64,
    },
    /// Wrap the native asset
    Wrap { amount: String },
    /// Unwrap the wrapped native token
    Unwrap { amount: String },
    /// Send the native asset to an address
    Send { to: Address, amount: String },
    /// Send an ERC20 token to an address
    SendToken {
        token: Address,
        to: Address,
        amount: String,
    },
    /// Read the on-chain state of a pool
    Pool { pool: Address },
    /// Look up a pool in the index
    IndexedPool { pool: Address },
    /// Look up a token and its statistics in the index
    Token { token: Address },
    /// USD price of a token from the index
    TokenPrice { token: Address },
    /// Print the address of SAILROUTE_PRIVATE_KEY
    Address,
}

/// Signing key for write commands, read per invocation
fn private_key() -> Result<String, Error> {
    env::var("SAILROUTE_PRIVATE_KEY").map_err(|_| Error::msg("SAILROUTE_PRIVATE_KEY must be set"))
}

/// Prints a command result as JSON on stdout
fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(ctx: &AppContext, command: Commands) -> Result<(), Error> {
    let executor = &ctx.executor;
    match command {
        Commands::Routes {
            token_in,
            token_out,
        } => {
            let routes = executor
                .quotes()
                .finder()
                .find_all_routes(token_in, token_out)
                .await?;
            print_json(&routes)
        }
        Commands::Quote {
            token_in,
            token_out,
            amount,
            slippage,
        } => {
            let quote = executor
                .quotes()
                .get_swap_quote(token_in, token_out, &amount, slippage)
                .await?;
            print_json(&quote)
        }
        Commands::Swap {
            token_in,
            token_out,
            amount,
            slippage,
        } => {
            let receipt = executor
                .swap_exact_tokens_for_tokens(&private_key()?, token_in, token_out, &amount, slippage)
                .await?;
            print_json(&receipt)
        }
        Commands::SwapNativeIn {
            token_out,
            amount,
            slippage,
        } => {
            let receipt = executor
                .swap_exact_native_for_tokens(&private_key()?, token_out, &amount, slippage)
                .await?;
            print_json(&receipt)
        }
        Commands::SwapNativeOut {
            token_in,
            amount,
            slippage,
        } => {
            let receipt = executor
                .swap_exact_tokens_for_native(&private_key()?, token_in, &amount, slippage)
                .await?;
            print_json(&receipt)
        }
        Commands::Wrap { amount } => {
            print_json(&executor.wrap_native_asset(&private_key()?, &amount).await?)
        }
        Commands::Unwrap { amount } => {
            print_json(&executor.unwrap_wrapped(&private_key()?, &amount).await?)
        }
        Commands::Send { to, amount } => {
            print_json(&executor.send_native(&private_key()?, to, &amount).await?)
        }
        Commands::SendToken { token, to, amount } => print_json(
            &executor
                .send_token(&private_key()?, token, to, &amount)
                .await?,
        ),
        Commands::Pool { pool } => print_json(&ctx.chain.pool_state(pool).await?),
        Commands::IndexedPool { pool } => print_json(&ctx.subgraph.pool(pool).await?),
        Commands::Token { token } => print_json(&ctx.subgraph.token(token).await?),
        Commands::TokenPrice { token } => {
            let price = ctx.subgraph.token_price_usd(token).await?;
            print_json(&price.map(|price| price.normalized().to_plain_string()))
        }
        Commands::Address => print_json(&wallet_address(&private_key()?)?),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    setup_logger()?;

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.rpc_url {
        config.set_rpc_url(url)?;
    }
    info!("Using chain {} at {}", config.chain_id, config.rpc_url());

    let ctx = AppContext::new(config);
    run(&ctx, cli.command).await
}
