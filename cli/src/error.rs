use phishshield_core::api::{ConfigError, EventsOutError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("setup failed: {0}")]
    Setup(#[from] anyhow::Error),
    #[error(transparent)]
    EventsOut(#[from] EventsOutError),
    #[error("stdio bridge: {0}")]
    Bridge(#[from] std::io::Error),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}
