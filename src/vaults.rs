//! Vault discovery from Obsidian's own configuration.
//!
//! Obsidian records known vaults in `obsidian.json`:
//!
//! ```json
//! { "vaults": { "4f1c...": { "path": "/Users/me/Notes", "ts": 1700000000000, "open": true } } }
//! ```
//!
//! Captures are written through the Advanced URI plugin, so each vault is also
//! checked for it in `.obsidian/community-plugins.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Vault;

/// Plugin id of the companion write plugin.
pub const ADVANCED_URI_PLUGIN: &str = "obsidian-advanced-uri";

#[derive(Debug, Deserialize)]
struct ObsidianConfig {
    #[serde(default)]
    vaults: HashMap<String, VaultEntry>,
}

#[derive(Debug, Deserialize)]
struct VaultEntry {
    path: PathBuf,
}

/// Location of `obsidian.json` in the user's config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("obsidian").join("obsidian.json"))
}

/// Vaults listed in the Obsidian config at `config_path`, sorted by name.
///
/// A missing or unreadable config means no vaults.
pub fn discover(config_path: &Path) -> Vec<Vault> {
    match load_vaults(config_path) {
        Ok(vaults) => vaults,
        Err(e) => {
            tracing::warn!("No vaults loaded from {}: {:#}", config_path.display(), e);
            Vec::new()
        }
    }
}

fn load_vaults(config_path: &Path) -> Result<Vec<Vault>> {
    let content = fs::read_to_string(config_path).context("Failed to read Obsidian config")?;
    let vaults = parse_config(&content)?;
    Ok(vaults)
}

/// Parse the contents of `obsidian.json`.
pub fn parse_config(content: &str) -> Result<Vec<Vault>> {
    let config: ObsidianConfig =
        serde_json::from_str(content).context("Failed to parse Obsidian config")?;

    let mut vaults: Vec<Vault> = config
        .vaults
        .into_values()
        .filter_map(|entry| {
            let name = entry.path.file_name()?.to_string_lossy().to_string();
            let mut vault = Vault::new(name, entry.path);
            vault.has_advanced_uri = has_plugin(&vault.root_path, ADVANCED_URI_PLUGIN);
            Some(vault)
        })
        .collect();

    vaults.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(vaults)
}

/// Whether the community plugin `plugin_id` is enabled in the vault at `root`.
pub fn has_plugin(root: &Path, plugin_id: &str) -> bool {
    let path = root.join(".obsidian").join("community-plugins.json");
    let Ok(content) = fs::read_to_string(&path) else {
        return false;
    };
    match serde_json::from_str::<Vec<String>>(&content) {
        Ok(plugins) => plugins.iter().any(|p| p == plugin_id),
        Err(e) => {
            tracing::debug!("Unreadable plugin list {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vault(root: &Path, plugins: Option<&str>) {
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        if let Some(plugins) = plugins {
            fs::write(root.join(".obsidian/community-plugins.json"), plugins).unwrap();
        }
    }

    #[test]
    fn parses_vaults_and_plugin_status() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("Work");
        let home = dir.path().join("Home");
        make_vault(&work, Some(r#"["dataview", "obsidian-advanced-uri"]"#));
        make_vault(&home, None);

        let config = serde_json::json!({
            "vaults": {
                "a1": { "path": work, "ts": 1, "open": true },
                "b2": { "path": home, "ts": 2 }
            }
        });

        let vaults = parse_config(&config.to_string()).unwrap();
        assert_eq!(vaults.len(), 2);
        assert_eq!(vaults[0].name, "Home");
        assert!(!vaults[0].has_advanced_uri);
        assert_eq!(vaults[1].name, "Work");
        assert!(vaults[1].has_advanced_uri);
    }

    #[test]
    fn missing_config_yields_no_vaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(&dir.path().join("obsidian.json")).is_empty());
    }

    #[test]
    fn config_without_vaults_key() {
        assert!(parse_config("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_plugin_list_means_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        make_vault(dir.path(), Some("not json"));
        assert!(!has_plugin(dir.path(), ADVANCED_URI_PLUGIN));
    }
}
