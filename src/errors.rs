//! Error types for the CLI crate.

use std::io;
use std::path::PathBuf;

use cdp_adapter::AdapterError;
use thiserror::Error;
use tool_contract::ToolError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

pub type AppResult<T> = Result<T, AppError>;
