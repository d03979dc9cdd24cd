use anyhow::Result;
use clap::Parser;

use ledgerdev::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays usable for commands and the bridge
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().execute()
}
