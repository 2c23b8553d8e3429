//! Subscriber setup for the CLI
//!
//! Events go to stderr so demo output on stdout stays clean. `RUST_LOG`,
//! when set, takes precedence over the configured level.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

pub fn init(config: &LogConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log filter `{}`", config.level))?,
    };

    let format = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi && std::io::stderr().is_terminal())
        .with_target(true);

    Registry::default()
        .with(filter)
        .with(format)
        .try_init()
        .context("failed to install tracing subscriber")
}
