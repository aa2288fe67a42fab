pub mod cli;
pub mod config;
pub mod error;
pub mod macros;
pub mod models;
pub mod telemetry;
pub mod time;

pub use crate::macros::{interpolate, MacroInterpolator};
pub use crate::time::TimeRange;

use crate::{cli::Cli, config::AppConfig};
use anyhow::Context;
use chrono::Utc;
use std::io;

/// Runs the CLI against the process environment and standard streams.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load SLS_MACROS_* configuration")?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    cli.execute(&config, &mut stdin.lock(), &mut stdout.lock(), Utc::now())?;
    Ok(())
}
