//! Seams between the capture session and the outside world.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CaptureError;
use crate::models::{Note, PageContent, SessionDefaults, SourceLink, Vault};

/// Reports the URL and title of the frontmost browser tab.
#[async_trait]
pub trait LinkDetector: Send + Sync {
    /// `Ok(None)` when the active application is not a supported browser.
    async fn active_link(&self) -> Result<Option<SourceLink>, CaptureError>;
}

/// Reads the user's current text selection.
#[async_trait]
pub trait SelectionReader: Send + Sync {
    async fn selected_text(&self) -> Result<Option<String>, CaptureError>;
}

/// Turns a URL into note-ready content.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageContent, CaptureError>;
}

/// Produces a summary of fetched page content.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn is_available(&self) -> bool;

    async fn summarize(&self, page_body: &str) -> Result<String, CaptureError>;
}

/// Hands a companion write protocol URI to the vault application.
#[async_trait]
pub trait NoteWriter: Send + Sync {
    async fn write(&self, target: &str) -> Result<(), CaptureError>;
}

/// Query side of the note index cache. Never fails: problems yield an empty list.
pub trait NoteIndex: Send + Sync {
    fn notes(&self, vault: &Vault) -> Vec<Note>;
}

/// Storage for the last-used vault and folder.
pub trait DefaultsStore: Send + Sync {
    fn load_defaults(&self) -> Result<SessionDefaults, CaptureError>;

    fn save_defaults(&self, defaults: &SessionDefaults) -> Result<(), CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStyle {
    Success,
    Failure,
    Progress,
}

/// A user-visible status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub style: NotificationStyle,
    pub title: String,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Success,
            title: title.into(),
        }
    }

    pub fn failure(title: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Failure,
            title: title.into(),
        }
    }

    pub fn progress(title: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Progress,
            title: title.into(),
        }
    }
}

/// Shows notifications to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Every collaborator a capture session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub links: Arc<dyn LinkDetector>,
    pub selection: Arc<dyn SelectionReader>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub writer: Arc<dyn NoteWriter>,
    pub notifier: Arc<dyn Notifier>,
    pub index: Arc<dyn NoteIndex>,
    pub defaults: Arc<dyn DefaultsStore>,
}
