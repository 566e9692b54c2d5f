use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::aggregator::Aggregator;
use crate::auth::Token;
use crate::config::Settings;
use crate::models::DashResponse;
use crate::providers::circleci::{CircleClient, DEFAULT_API_URL};
use crate::server::{self, AppState};

#[derive(Parser)]
#[command(name = "cidash")]
#[command(author, version, about = "CircleCI build dashboard backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP and WebSocket on /dash
    Serve {
        /// Path to the TOML settings file
        #[arg(short, long, default_value = "etc/settings.toml")]
        config: PathBuf,

        /// CircleCI API token
        #[arg(short, long, env = "CIRCLE_CI_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Run a single aggregation cycle and print the result
    Snapshot {
        /// CircleCI API base URL
        #[arg(short, long, default_value = DEFAULT_API_URL)]
        url: String,

        /// CircleCI API token
        #[arg(short, long, env = "CIRCLE_CI_AUTH_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty print JSON output
        #[arg(short, long, default_value_t = false)]
        pretty: bool,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Serve { config, token } => {
                let settings = Settings::load(config)?;
                let addr = settings.socket_addr()?;

                let token = Token::from(token.clone());
                if token.is_empty() {
                    warn!("CIRCLE_CI_AUTH_TOKEN is not set, every request will be rejected");
                }

                let provider = CircleClient::new(&settings.api_url)?;
                let aggregator = Aggregator::new(Arc::new(provider), token);

                info!(
                    "Pushing builds from {} every {}s",
                    settings.api_url, settings.interval_secs
                );
                server::serve(addr, AppState::new(aggregator, settings.interval())).await?;

                Ok(())
            }
            Commands::Snapshot {
                url,
                token,
                output,
                pretty,
            } => {
                let provider = CircleClient::new(url)?;
                let aggregator = Aggregator::new(Arc::new(provider), Token::from(token.clone()));
                let response = DashResponse {
                    builds: aggregator.aggregate().await?,
                };

                let json_output = if *pretty {
                    serde_json::to_string_pretty(&response)?
                } else {
                    serde_json::to_string(&response)?
                };

                if let Some(output_path) = output {
                    std::fs::write(output_path, json_output)?;
                    info!("Snapshot written to: {}", output_path.display());
                } else {
                    println!("{json_output}");
                }

                Ok(())
            }
        }
    }
}
