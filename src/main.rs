//! logflow - asynchronous multi-tenant log ingestion pipeline
//!
//! Runs the HTTP ingress gateway and the batch worker pool in one process.

#![allow(missing_docs)]

use clap::Parser;
use logflow::utils::logging::init_tracing;
use logflow::{Config, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "logflow", version, about)]
struct Cli {
    /// YAML configuration file; defaults plus environment variables when absent
    #[arg(short, long, env = "LOGFLOW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Variables from a local .env are treated like real environment variables
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let build = logflow::build_info();
    info!(
        version = build.version,
        git_hash = build.git_hash,
        "Starting logflow"
    );

    let result = match Pipeline::new(config).await {
        Ok(pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
