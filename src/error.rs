use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Missing CIRCLE_CI_AUTH_TOKEN")]
    Auth,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("No builds found for project: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashError>;
