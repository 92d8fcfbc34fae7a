use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Reads the level from `RUST_LOG`, defaulting to `Info`
fn level_from_env() -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Sets up the application logger.
///
/// Output goes to stderr so stdout carries only command results.
///
/// # Errors
/// * If a logger has already been installed
pub fn setup_logger() -> Result<()> {
    Dispatch::new()
        .level(level_from_env())
        // The HTTP stack is chatty at debug
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
