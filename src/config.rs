//! User configuration.
//!
//! Settings live in `<config dir>/vault-capture/config.json`. Any field may be
//! left out; environment variables override the file:
//! - `VAULT_CAPTURE_OPEN_IN_NEW_TAB` - open freshly created notes in a new tab
//! - `VAULT_CAPTURE_OBSIDIAN_CONFIG` - path to Obsidian's `obsidian.json`
//! - `VAULT_CAPTURE_FETCH_TIMEOUT_SECS` / `VAULT_CAPTURE_SUMMARY_TIMEOUT_SECS`
//! - `VAULT_CAPTURE_SUMMARY_ENDPOINT`, `VAULT_CAPTURE_SUMMARY_MODEL`,
//!   `VAULT_CAPTURE_SUMMARY_API_KEY`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::capture::Preferences;
use crate::fetch::SummaryConfig;

const APP_NAME: &str = "vault-capture";
const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "VAULT_CAPTURE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Open newly created notes in a new tab. Appends never change focus.
    pub open_in_new_tab: bool,
    /// Override for the location of `obsidian.json`.
    pub obsidian_config: Option<PathBuf>,
    /// Upper bound for page and transcript fetches.
    pub fetch_timeout_secs: u64,
    /// Upper bound for summary generation.
    pub summary_timeout_secs: u64,
    pub summary: SummaryConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            open_in_new_tab: false,
            obsidian_config: None,
            fetch_timeout_secs: 30,
            summary_timeout_secs: 60,
            summary: SummaryConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load from the user's config directory, then apply environment overrides.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Apply overrides looked up by full variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(v) = var("OPEN_IN_NEW_TAB") {
            self.open_in_new_tab = parse_bool(&v).unwrap_or(self.open_in_new_tab);
        }
        if let Some(v) = var("OBSIDIAN_CONFIG") {
            self.obsidian_config = Some(PathBuf::from(v));
        }
        if let Some(secs) = var("FETCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.fetch_timeout_secs = secs;
        }
        if let Some(secs) = var("SUMMARY_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.summary_timeout_secs = secs;
        }
        if let Some(v) = var("SUMMARY_ENDPOINT") {
            self.summary.endpoint = v;
        }
        if let Some(v) = var("SUMMARY_MODEL") {
            self.summary.model = v;
        }
        if let Some(v) = var("SUMMARY_API_KEY") {
            self.summary.api_key = Some(v);
        }
        self
    }

    /// Where to read Obsidian's vault list from.
    pub fn obsidian_config_path(&self) -> Option<PathBuf> {
        self.obsidian_config
            .clone()
            .or_else(crate::vaults::default_config_path)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            open_in_new_tab: self.open_in_new_tab,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            summary_timeout: Duration::from_secs(self.summary_timeout_secs),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
