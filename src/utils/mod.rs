/// App context
pub mod app_context;
/// Constants
pub mod constants;
/// Logger
pub mod logger;
/// Token unit conversions
pub mod units;
/// Wallet keys
pub mod wallet;
