use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A note-storage root.
///
/// Vaults are enumerated once at startup and treated as immutable for the
/// rest of the capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Display name, unique among known vaults.
    pub name: String,
    /// Absolute filesystem root.
    pub root_path: PathBuf,
    /// Whether the Advanced URI plugin is enabled, which the write protocol needs.
    #[serde(default)]
    pub has_advanced_uri: bool,
}

impl Vault {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            has_advanced_uri: false,
        }
    }

    pub fn with_advanced_uri(mut self) -> Self {
        self.has_advanced_uri = true;
        self
    }
}

/// Folder used when nothing has been saved yet.
pub const DEFAULT_FOLDER: &str = "inbox";

/// Last-used destination, persisted between capture sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
    pub vault: Option<String>,
    pub folder: Option<String>,
}

impl SessionDefaults {
    /// Saved folder, or [`DEFAULT_FOLDER`] when none was saved.
    pub fn folder_or_default(&self) -> String {
        self.folder
            .clone()
            .unwrap_or_else(|| DEFAULT_FOLDER.to_string())
    }
}
