use clap::Parser;
use sls_macros::{cli::Cli, telemetry};

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    sls_macros::run(Cli::parse())
}
