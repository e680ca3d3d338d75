//! Tracing setup shared by the bot binary and its tools.
//!
//! Two layers are installed: a console layer and an hourly-rolling file layer under
//! `./logs/`. Filters work in whitelist mode: anything not named explicitly is off, so
//! noisy dependencies (hyper, reqwest, teloxide internals) stay quiet unless asked for.

use std::fmt::Display;

pub use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_DIR: &str = "./logs/";

/// Modules that are always let through, whatever the caller whitelists.
const BASE_MODULES: [&str; 2] = ["burberry", "panic_hook"];

/// Builds a filter that only enables `allowed_modules`.
///
/// Entries that already carry a level (`"hedgy_store=debug"`) are used verbatim, the rest
/// get `level`.
pub fn new_whitelist_mode_env_filter(allowed_modules: &[&str], level: LevelFilter) -> EnvFilter {
    let directives = allowed_modules
        .iter()
        .map(|module| {
            if module.contains('=') {
                module.to_string()
            } else {
                format!("{module}={level}")
            }
        })
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .parse(&directives)
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Console at INFO, file at TRACE, both restricted to `modules` plus [`BASE_MODULES`].
///
/// The file is named `{name}-{network}.log` and rotated hourly.
pub fn init_with_whitelisted_modules<T: Display>(network: T, name: &str, modules: &[&str]) {
    let allowed = BASE_MODULES.iter().chain(modules.iter()).copied().collect::<Vec<_>>();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_filter(new_whitelist_mode_env_filter(&allowed, LevelFilter::INFO));

    let file_appender = tracing_appender::rolling::hourly(LOG_DIR, format!("{name}-{network}.log"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_target(true)
        .with_filter(new_whitelist_mode_env_filter(&allowed, LevelFilter::TRACE));

    tracing_subscriber::registry().with(file_layer).with(console_layer).init();
}

/// Console only. Used by one-shot subcommands that should not leave log files behind.
pub fn init_console_logger(level: Option<LevelFilter>) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(LevelFilter::INFO).into())
        .parse_lossy("");

    tracing_subscriber::registry()
        .with(fmt::layer().with_timer(fmt::time::SystemTime))
        .with(filter)
        .init();
}
