//! Error types shared by the capture pipeline.

use std::time::Duration;

use thiserror::Error;

/// Capture errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No Obsidian vaults found")]
    NoVaults,

    #[error("No vault has the Advanced URI plugin enabled")]
    PluginMissing,

    #[error("Unresolved destination: {0}")]
    UnresolvedDestination(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch content: {0}")]
    Fetch(String),

    #[error("Summary generation failed: {0}")]
    Summary(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
