//! Frontstage CLI — frontend asset staging for deployment builds.
//!
//! Installs backend dependencies, fetches the upstream frontend tree, and
//! stages an allowlisted set of assets into the build output directory.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
