use crate::generator::workflow::launch;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod cache;
mod cli;
mod config;
mod error;
mod generator;
mod llm;
mod prompts;
mod search;
mod types;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paper_scribe={}", default_level)));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = args.into_config()?;

    launch(&config).await
}
