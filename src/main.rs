//! Cropcast - Main Entry Point
//!
//! Crop price prediction over trained regression model artifacts.

use clap::Parser;
use cropcast::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropcast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    cli::run(cli)
}
