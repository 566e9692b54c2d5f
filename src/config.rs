use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DashError, Result};
use crate::providers::circleci::DEFAULT_API_URL;

/// Server settings read from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listener address, e.g. `127.0.0.1:8080`
    pub address: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Seconds between pushes on a streaming connection
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_interval_secs() -> u64 {
    10
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DashError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(raw).map_err(|e| DashError::Config(format!("Malformed settings: {e}")))?;

        if settings.interval_secs == 0 {
            return Err(DashError::Config(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        settings.socket_addr()?;

        Ok(settings)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.address
            .parse()
            .map_err(|e| DashError::Config(format!("Invalid address {:?}: {e}", self.address)))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
