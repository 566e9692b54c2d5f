mod aggregator;
mod auth;
mod cli;
mod config;
mod error;
mod models;
mod providers;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting cidash - CircleCI build dashboard");
    cli.execute().await?;

    Ok(())
}
