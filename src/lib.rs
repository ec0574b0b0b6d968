//! pagescript library
//!
//! Configuration, the reference tool runner and registry wiring used by the
//! `pagescript` binary and its integration tests.

pub mod config;
pub mod errors;
pub mod redact;
pub mod runner;

use tool_contract::{ToolError, ToolRegistry};

pub use config::{load_config, AppConfig, ToolsConfig};
pub use errors::{AppError, AppResult, ConfigError};
pub use runner::{CallReport, ToolRunner};

/// Registry holding every tool enabled by `tools`.
pub fn build_registry(tools: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    ToolRegistry::with_capabilities(
        tool_execute_js::tools(tools.capture_snapshot),
        &tools.capabilities,
    )
}
