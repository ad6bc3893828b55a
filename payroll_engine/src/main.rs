//! Entry point for the Payroll Engine binary.
//!
//! Running this binary will start an HTTP server that exposes a
//! minimal API for calculating payroll.  Configuration is read from the
//! environment (see [`payroll_engine::config`]); log verbosity follows
//! `RUST_LOG` and defaults to `info`.

use payroll_engine::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_env_filter(filter)
        .init();

    let config = Config::load()?;
    payroll_engine::api::serve(config).await
}
