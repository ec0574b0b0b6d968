use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use which::which;

pub const ENV_CHROME: &str = "PAGESCRIPT_CHROME";
pub const ENV_HEADLESS: &str = "PAGESCRIPT_HEADLESS";
pub const DEFAULT_EVAL_TIMEOUT_MS: u64 = 30_000;
/// chromiumoxide abandons any command after 30s, so longer deadlines never fire.
pub const MAX_EVAL_TIMEOUT_MS: u64 = 30_000;

/// How to reach the browser and how long a single evaluation may take.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    /// Attach to an already running browser instead of launching one.
    pub websocket_url: Option<String>,
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
    pub eval_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            websocket_url: None,
            executable: None,
            user_data_dir: None,
            headless: resolve_headless_default(),
            eval_timeout_ms: DEFAULT_EVAL_TIMEOUT_MS,
        }
    }
}

impl CdpConfig {
    /// Configured executable, falling back to detection.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        self.executable
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(detect_chrome_executable)
    }

    /// Evaluation deadline, clamped to `1..=MAX_EVAL_TIMEOUT_MS`.
    pub fn eval_timeout(&self) -> Duration {
        Duration::from_millis(self.eval_timeout_ms.clamp(1, MAX_EVAL_TIMEOUT_MS))
    }
}

fn resolve_headless_default() -> bool {
    match env::var(ENV_HEADLESS) {
        Ok(value) => parse_flag(&value).unwrap_or(true),
        Err(_) => true,
    }
}

/// Parses the usual on/off spellings.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var(ENV_CHROME) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_specific_chrome_paths()
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "freebsd")))]
    {
        Vec::new()
    }
}
