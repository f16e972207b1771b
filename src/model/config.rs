use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::mode::Mode;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api/v1";
pub const MIN_AUTO_REFRESH_SECS: u64 = 3;
pub const DEFAULT_AUTO_REFRESH_SECS: u64 = 5;

const CONFIG_ENV: &str = "GITOPS_CONSOLE_CONFIG";
const API_ENV: &str = "GITOPS_CONSOLE_API";
const LOG_FILE_ENV: &str = "GITOPS_CONSOLE_LOG_FILE";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Auto-refresh period in seconds; clamped to at least 3.
    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,

    /// Start with auto-refresh enabled.
    #[serde(default)]
    pub auto_refresh: bool,

    /// Show unchanged files in the tree (otherwise changed-only).
    #[serde(default = "default_true")]
    pub show_all: bool,

    #[serde(default)]
    pub initial_mode: Mode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_auto_refresh_secs() -> u64 {
    DEFAULT_AUTO_REFRESH_SECS
}

fn default_true() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            api_base: default_api_base(),
            auto_refresh_secs: DEFAULT_AUTO_REFRESH_SECS,
            auto_refresh: false,
            show_all: true,
            initial_mode: Mode::Preview,
            log_file: None,
        }
    }
}

impl ConsoleConfig {
    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_secs.max(MIN_AUTO_REFRESH_SECS))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: ConsoleConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolves the config file (explicit path, `$GITOPS_CONSOLE_CONFIG`, then the
    /// per-user default) and layers environment and CLI overrides on top.
    pub fn load(explicit: Option<&Path>, api_override: Option<&str>) -> Result<Self> {
        let mut cfg = match explicit {
            Some(path) => Self::read(path)?,
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => Self::read(Path::new(&path))?,
                None => match default_config_path() {
                    Some(path) if path.is_file() => Self::read(&path)?,
                    _ => Self::default(),
                },
            },
        };

        if let Ok(api) = std::env::var(API_ENV)
            && !api.trim().is_empty()
        {
            cfg.api_base = api;
        }
        if let Some(api) = api_override {
            cfg.api_base = api.to_string();
        }
        if let Some(path) = std::env::var_os(LOG_FILE_ENV) {
            cfg.log_file = Some(PathBuf::from(path));
        }

        cfg.api_base = cfg.api_base.trim().trim_end_matches('/').to_string();
        if cfg.api_base.is_empty() {
            anyhow::bail!("api_base must not be empty");
        }
        cfg.auto_refresh_secs = cfg.auto_refresh_secs.max(MIN_AUTO_REFRESH_SECS);
        Ok(cfg)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("gitops-console").join("config.json"))
}
