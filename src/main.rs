//! Batch gateway - replays bulk REST operations against a backing service

#![allow(missing_docs)]

use batch_gateway::utils::logging::init_logging;
use batch_gateway::{Config, Gateway, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "config/gateway.yaml")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps multi-line messages readable
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let from_file = args.config.exists();
    let config = if from_file {
        Config::from_file(&args.config).await?
    } else {
        Config::from_env()?
    };
    let config = config.with_listen_overrides(args.host, args.port)?;

    init_logging(config.logging())?;
    if from_file {
        info!("Configuration loaded from {}", args.config.display());
    } else {
        warn!(
            "Configuration file {} not found, using environment configuration",
            args.config.display()
        );
    }

    Gateway::new(config)?.run().await
}
