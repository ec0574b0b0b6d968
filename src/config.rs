//! Configuration loading
//!
//! YAML file (explicit path or `<config dir>/pagescript/config.yaml`), then
//! environment overrides. CLI flags are applied by the binary on top.

use std::env;
use std::path::{Path, PathBuf};

use cdp_adapter::config::{parse_flag, ENV_HEADLESS};
use cdp_adapter::CdpConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tool_contract::Capability;
use tracing::{info, warn};

use crate::errors::ConfigError;

pub const ENV_CDP_ENDPOINT: &str = "PAGESCRIPT_CDP_ENDPOINT";
pub const ENV_CAPTURE_SNAPSHOT: &str = "PAGESCRIPT_CAPTURE_SNAPSHOT";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browser: CdpConfig,
    pub tools: ToolsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Extra capabilities on top of the always-enabled core set.
    pub capabilities: Vec<Capability>,
    /// Ask the orchestrator for a page-state capture after each call.
    pub capture_snapshot: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            capabilities: Vec::new(),
            capture_snapshot: true,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagescript").join("config.yaml"))
}

/// Loads configuration. An explicit path must exist; a missing default
/// file falls back to built-in defaults.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            read_config(path).await?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path).await?,
            Some(path) => {
                warn!("Config file not found, using defaults: {}", path.display());
                AppConfig::default()
            }
            None => AppConfig::default(),
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

async fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(content)
}

pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(endpoint) = env::var(ENV_CDP_ENDPOINT) {
        let trimmed = endpoint.trim();
        if !trimmed.is_empty() {
            config.browser.websocket_url = Some(trimmed.to_string());
        }
    }
    if let Some(headless) = env::var(ENV_HEADLESS).ok().as_deref().and_then(parse_flag) {
        config.browser.headless = headless;
    }
    if let Some(capture) = env::var(ENV_CAPTURE_SNAPSHOT)
        .ok()
        .as_deref()
        .and_then(parse_flag)
    {
        config.tools.capture_snapshot = capture;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        env::remove_var(ENV_CDP_ENDPOINT);
        env::remove_var(ENV_HEADLESS);
        env::remove_var(ENV_CAPTURE_SNAPSHOT);
    }

    #[test]
    fn parses_partial_yaml() {
        let config = parse_config(
            "browser:\n  websocket_url: ws://127.0.0.1:9222/devtools/browser/abc\ntools:\n  capabilities: [tabs, wait]\n",
        )
        .unwrap();
        assert_eq!(
            config.browser.websocket_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/browser/abc")
        );
        assert_eq!(
            config.tools.capabilities,
            vec![Capability::Tabs, Capability::Wait]
        );
        assert!(config.tools.capture_snapshot);
    }

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(parse_config("  \n").unwrap().tools, ToolsConfig::default());
    }

    #[test]
    fn unknown_capability_is_rejected() {
        assert!(parse_config("tools:\n  capabilities: [teleport]\n").is_err());
    }

    #[tokio::test]
    #[serial]
    async fn explicit_missing_path_is_an_error() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = load_config(Some(&missing)).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    #[serial]
    async fn file_then_env_overrides() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tools:\n  capture_snapshot: true\nbrowser:\n  eval_timeout_ms: 1500").unwrap();

        env::set_var(ENV_CAPTURE_SNAPSHOT, "off");
        env::set_var(ENV_CDP_ENDPOINT, "ws://localhost:9222/devtools/browser/x");
        let config = load_config(Some(file.path())).await.unwrap();
        clear_env();

        assert!(!config.tools.capture_snapshot);
        assert_eq!(config.browser.eval_timeout_ms, 1500);
        assert_eq!(
            config.browser.websocket_url.as_deref(),
            Some("ws://localhost:9222/devtools/browser/x")
        );
    }

    #[tokio::test]
    #[serial]
    async fn malformed_yaml_reports_parse_error() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tools: [not, a, map").unwrap();
        let err = load_config(Some(file.path())).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
