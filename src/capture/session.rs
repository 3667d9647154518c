//! The capture session: drives one capture from detection to write.
//!
//! A session moves through `Initializing -> Ready -> Submitting` and ends in
//! `Completed`, or in `Failed` when both write attempts were rejected (the
//! user may submit again from there). `Cancelled` discards the draft.
//!
//! Content fetches and summaries are split into a request, an async run, and
//! an apply step. Each request carries a tag from a monotonically increasing
//! counter; results whose tag is no longer current are dropped.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::collaborators::{Collaborators, ContentFetcher, Notification, Summarizer};
use super::compose::compose;
use super::rank::rank;
use super::resolve::{resolve, Destination};
use super::uri::{fallback_target, primary_target, WriteRequest};
use crate::error::CaptureError;
use crate::models::{
    strip_note_extension, CaptureDraft, Note, PageContent, SessionDefaults, Vault,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Ready,
    Submitting,
    Completed,
    Failed,
    Cancelled,
}

/// Per-session settings read from configuration.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub open_in_new_tab: bool,
    pub fetch_timeout: Duration,
    pub summary_timeout: Duration,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            open_in_new_tab: false,
            fetch_timeout: Duration::from_secs(30),
            summary_timeout: Duration::from_secs(60),
        }
    }
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag(u64);

/// A content fetch for the session's source link.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    tag: RequestTag,
    pub url: String,
}

#[derive(Debug)]
pub struct FetchOutcome {
    tag: RequestTag,
    pub result: Result<PageContent, CaptureError>,
}

impl FetchRequest {
    pub async fn run(self, fetcher: &dyn ContentFetcher, timeout: Duration) -> FetchOutcome {
        let result = with_timeout(timeout, fetcher.fetch(&self.url)).await;
        FetchOutcome {
            tag: self.tag,
            result,
        }
    }
}

/// A summary request over a snapshot of the page body.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    tag: RequestTag,
    pub page_body: String,
}

#[derive(Debug)]
pub struct SummaryOutcome {
    tag: RequestTag,
    pub result: Result<String, CaptureError>,
}

impl SummaryRequest {
    pub async fn run(self, summarizer: &dyn Summarizer, timeout: Duration) -> SummaryOutcome {
        let result = with_timeout(timeout, summarizer.summarize(&self.page_body)).await;
        SummaryOutcome {
            tag: self.tag,
            result,
        }
    }
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, CaptureError>
where
    F: Future<Output = Result<T, CaptureError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| CaptureError::Timeout(limit))?
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub destination: Destination,
    /// The URI that the vault application accepted.
    pub target: String,
    pub used_fallback: bool,
}

pub struct CaptureSession {
    collaborators: Collaborators,
    vaults: Vec<Vault>,
    preferences: Preferences,
    state: SessionState,
    draft: CaptureDraft,
    candidates: Vec<Note>,
    counter: u64,
    pending_fetch: Option<RequestTag>,
    pending_summary: Option<RequestTag>,
}

impl CaptureSession {
    /// Start a session over `vaults`.
    ///
    /// Fails when there is no vault at all, or when no vault can accept writes.
    pub fn new(
        collaborators: Collaborators,
        vaults: Vec<Vault>,
        preferences: Preferences,
    ) -> Result<Self, CaptureError> {
        if vaults.is_empty() {
            return Err(CaptureError::NoVaults);
        }
        if !vaults.iter().any(|v| v.has_advanced_uri) {
            return Err(CaptureError::PluginMissing);
        }

        Ok(Self {
            collaborators,
            vaults,
            preferences,
            state: SessionState::Initializing,
            draft: CaptureDraft::default(),
            candidates: Vec::new(),
            counter: 0,
            pending_fetch: None,
            pending_summary: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &CaptureDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut CaptureDraft {
        &mut self.draft
    }

    pub fn candidates(&self) -> &[Note] {
        &self.candidates
    }

    /// Vaults that can receive captures.
    pub fn eligible_vaults(&self) -> impl Iterator<Item = &Vault> {
        self.vaults.iter().filter(|v| v.has_advanced_uri)
    }

    /// Load defaults and detect what to capture, then become `Ready`.
    ///
    /// Detection failures are expected and only logged. A failed content fetch
    /// is reported but leaves the session usable without page content.
    pub async fn initialize(&mut self) {
        let defaults = self.collaborators.defaults.load_defaults().unwrap_or_else(|e| {
            tracing::warn!("Failed to load saved defaults: {}", e);
            SessionDefaults::default()
        });
        self.draft.vault = self.pick_vault(defaults.vault.as_deref());
        self.draft.folder = defaults.folder_or_default();

        let links = Arc::clone(&self.collaborators.links);
        let selection = Arc::clone(&self.collaborators.selection);
        let (link, selected) = tokio::join!(links.active_link(), selection.selected_text());

        match link {
            Ok(Some(link)) => {
                tracing::debug!(url = %link.url, "Detected browser link");
                self.draft.source = Some(link);
            }
            Ok(None) => tracing::debug!("No supported browser in front"),
            Err(e) => tracing::debug!("Link detection failed: {}", e),
        }

        match selected {
            Ok(Some(text)) if !text.is_empty() => self.draft.highlight_text = Some(text),
            Ok(_) => tracing::debug!("No text selected"),
            Err(e) => tracing::debug!("Selection detection failed: {}", e),
        }

        if let Some(request) = self.begin_fetch() {
            let fetcher = Arc::clone(&self.collaborators.fetcher);
            let outcome = request
                .run(fetcher.as_ref(), self.preferences.fetch_timeout)
                .await;
            self.apply_fetch(outcome);
        }

        self.announce_capture();
        self.state = SessionState::Ready;
    }

    fn pick_vault(&self, saved: Option<&str>) -> Option<Vault> {
        saved
            .and_then(|name| self.eligible_vaults().find(|v| v.name == name))
            .or_else(|| self.eligible_vaults().next())
            .cloned()
    }

    fn next_tag(&mut self) -> RequestTag {
        self.counter += 1;
        RequestTag(self.counter)
    }

    fn is_live(&self) -> bool {
        !matches!(
            self.state,
            SessionState::Completed | SessionState::Cancelled
        )
    }

    /// Start fetching content for the source link, if there is one and nothing
    /// has been fetched yet.
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        if self.draft.page_content.is_some() {
            return None;
        }
        let url = self.draft.source.as_ref()?.url.clone();
        let tag = self.next_tag();
        self.pending_fetch = Some(tag);
        Some(FetchRequest { tag, url })
    }

    /// Apply a fetch result. Returns `false` when the result was stale and dropped.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> bool {
        if !self.is_live() || self.pending_fetch != Some(outcome.tag) {
            tracing::debug!("Dropping stale content fetch");
            return false;
        }
        self.pending_fetch = None;

        match outcome.result {
            Ok(content) if !content.body.is_empty() => {
                self.draft.page_content = Some(content);
            }
            Ok(_) => tracing::debug!("Fetched content was empty"),
            Err(e) => {
                tracing::warn!("Failed to fetch page content: {}", e);
                self.collaborators
                    .notifier
                    .notify(Notification::failure("Failed to fetch page content"));
            }
        }
        true
    }

    /// Label for the page content option, when content was fetched.
    pub fn page_option_label(&self) -> Option<&'static str> {
        self.draft
            .page_content
            .as_ref()
            .map(|c| c.kind.option_label())
    }

    /// Whether the summary option can be offered.
    pub fn summary_available(&self) -> bool {
        self.collaborators.summarizer.is_available() && self.draft.page_body().is_some()
    }

    /// Snapshot the page body for summarization.
    ///
    /// Returns `None` when there is nothing to summarize yet or no summarizer.
    pub fn begin_summary(&mut self) -> Option<SummaryRequest> {
        if !self.summary_available() {
            return None;
        }
        let page_body = self.draft.page_body()?.to_string();
        let tag = self.next_tag();
        self.pending_summary = Some(tag);
        Some(SummaryRequest { tag, page_body })
    }

    /// Apply a summary result. Returns `false` when the result was stale and dropped.
    pub fn apply_summary(&mut self, outcome: SummaryOutcome) -> bool {
        if !self.is_live() || self.pending_summary != Some(outcome.tag) {
            tracing::debug!("Dropping stale summary");
            return false;
        }
        self.pending_summary = None;

        match outcome.result {
            Ok(summary) if !summary.is_empty() => {
                self.draft.summary_text = Some(summary);
                self.collaborators
                    .notifier
                    .notify(Notification::success("Summary captured"));
            }
            Ok(_) => tracing::debug!("Summarizer returned nothing"),
            Err(e) => {
                tracing::warn!("Summary generation failed: {}", e);
                self.collaborators
                    .notifier
                    .notify(Notification::failure("Failed to generate summary"));
            }
        }
        true
    }

    /// Toggle the summary section, generating the summary when switched on.
    pub async fn set_include_summary(&mut self, include: bool) {
        self.draft.include_summary = include;
        if !include {
            return;
        }
        if let Some(request) = self.begin_summary() {
            self.collaborators
                .notifier
                .notify(Notification::progress("Generating Summary"));
            let summarizer = Arc::clone(&self.collaborators.summarizer);
            let outcome = request
                .run(summarizer.as_ref(), self.preferences.summary_timeout)
                .await;
            self.apply_summary(outcome);
        }
    }

    /// Update the title and re-rank destination candidates.
    pub fn set_file_name(&mut self, file_name: &str) -> &[Note] {
        self.draft.file_name = file_name.to_string();
        self.candidates = match &self.draft.vault {
            Some(vault) => rank(file_name, &self.collaborators.index.notes(vault)),
            None => Vec::new(),
        };
        &self.candidates
    }

    /// Point the draft at an existing note.
    pub fn select_candidate(&mut self, note: &Note) {
        let root = self.draft.vault.as_ref().map(|v| v.root_path.as_path());
        let (folder, file_name) = split_note_path(root, &note.path);
        self.draft.folder = folder;
        self.draft.file_name = file_name;
    }

    /// Drop the detected highlight and link.
    pub fn clear_capture(&mut self) {
        self.draft.source = None;
        self.draft.highlight_text = None;
        self.collaborators
            .notifier
            .notify(Notification::success("Capture Cleared"));
    }

    /// Abandon the session. Results that arrive later are dropped.
    pub fn cancel(&mut self) {
        self.discard();
        self.state = SessionState::Cancelled;
    }

    fn discard(&mut self) {
        self.draft = CaptureDraft::default();
        self.candidates.clear();
        self.pending_fetch = None;
        self.pending_summary = None;
    }

    /// Write the capture into the vault.
    ///
    /// The first attempt is append-aware. If the vault application rejects it,
    /// a plain create is tried once before giving up; a possible duplicate note
    /// is preferable to losing the capture.
    pub async fn submit(&mut self, now: NaiveDateTime) -> Result<SubmitOutcome, CaptureError> {
        if !matches!(self.state, SessionState::Ready | SessionState::Failed) {
            return Err(CaptureError::InvalidState(format!(
                "cannot submit while {:?}",
                self.state
            )));
        }
        let vault = self.draft.vault.clone().ok_or_else(|| {
            CaptureError::UnresolvedDestination("no vault selected".to_string())
        })?;

        let destination = resolve(
            Some(vault.root_path.as_path()),
            Some(self.draft.folder.as_str()),
            &self.draft.file_name,
        )?;

        self.state = SessionState::Submitting;
        self.persist_defaults(&vault);

        let request = WriteRequest {
            vault: vault.name.clone(),
            folder: self.draft.folder.clone(),
            file_name: self.draft.file_name.clone(),
            body: compose(&self.draft, now),
            append: destination.append,
            open_in_new_tab: self.preferences.open_in_new_tab,
        };
        let writer = Arc::clone(&self.collaborators.writer);

        let primary = primary_target(&request);
        match writer.write(&primary).await {
            Ok(()) => return Ok(self.complete(destination, primary, false)),
            Err(e) => {
                tracing::warn!("Capture write failed, retrying without append: {}", e);
                self.collaborators
                    .notifier
                    .notify(Notification::failure("Failed to capture. Try again"));
            }
        }

        let fallback = fallback_target(&request);
        match writer.write(&fallback).await {
            Ok(()) => Ok(self.complete(destination, fallback, true)),
            Err(e) => {
                tracing::error!("Fallback capture write failed: {}", e);
                self.collaborators
                    .notifier
                    .notify(Notification::failure("Capture failed"));
                self.state = SessionState::Failed;
                Err(CaptureError::WriteFailed(e.to_string()))
            }
        }
    }

    fn persist_defaults(&self, vault: &Vault) {
        let defaults = SessionDefaults {
            vault: Some(vault.name.clone()),
            folder: Some(self.draft.folder.clone()),
        };
        if let Err(e) = self.collaborators.defaults.save_defaults(&defaults) {
            tracing::warn!("Failed to save defaults: {}", e);
        }
    }

    fn complete(
        &mut self,
        destination: Destination,
        target: String,
        used_fallback: bool,
    ) -> SubmitOutcome {
        tracing::info!(
            path = %destination.absolute_path.display(),
            append = destination.append,
            used_fallback,
            "Note captured"
        );
        self.collaborators
            .notifier
            .notify(Notification::success("Note Captured"));
        self.discard();
        self.state = SessionState::Completed;
        SubmitOutcome {
            destination,
            target,
            used_fallback,
        }
    }

    fn announce_capture(&self) {
        let title = match (self.draft.has_highlight(), self.draft.source.is_some()) {
            (true, true) => "Highlighted text, Source captured",
            (true, false) => "Highlighted text captured",
            (false, true) => "Link captured",
            (false, false) if self.draft.page_content.is_some() => "Page contents captured",
            (false, false) => return,
        };
        self.collaborators
            .notifier
            .notify(Notification::success(title));
    }
}

/// Split a note path into folder and file name, relative to `vault_root`.
///
/// Absolute paths under the vault root are made relative; the note extension
/// is dropped from the file name.
pub fn split_note_path(vault_root: Option<&Path>, note_path: &str) -> (String, String) {
    let relative = vault_root
        .and_then(|root| Path::new(note_path).strip_prefix(root).ok())
        .map(|rest| rest.to_string_lossy().into_owned())
        .unwrap_or_else(|| note_path.to_string())
        .replace('\\', "/");
    let relative = relative.trim_start_matches('/');

    let (folder, file) = relative.rsplit_once('/').unwrap_or(("", relative));
    (folder.to_string(), strip_note_extension(file).to_string())
}
