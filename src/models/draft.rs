use serde::{Deserialize, Serialize};

use super::Vault;

/// A link to the resource being captured, with its display title when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub url: String,
    pub label: Option<String>,
}

impl SourceLink {
    pub fn new(url: impl Into<String>, label: Option<String>) -> Self {
        Self {
            url: url.into(),
            label,
        }
    }

    /// Text shown for the link: the display title, or the raw URL when there is none.
    pub fn display_text(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.url,
        }
    }
}

/// What kind of content was fetched for the source link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Page converted to markdown.
    Page,
    /// Video captions flattened to text.
    Transcript,
}

impl ContentKind {
    /// Label for the option that includes this content in the note.
    pub fn option_label(&self) -> &'static str {
        match self {
            ContentKind::Page => "Include page content",
            ContentKind::Transcript => "Include video transcript",
        }
    }
}

/// Content fetched once per session for the source link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub kind: ContentKind,
    pub body: String,
}

/// The in-progress state of one capture session.
///
/// Created when the session starts, edited in place, and dropped when the
/// capture completes or is cancelled. Only the vault name and folder outlive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDraft {
    pub vault: Option<Vault>,
    /// Folder relative to the vault root. Empty means the root itself.
    pub folder: String,
    /// Note name without extension.
    pub file_name: String,
    pub highlight_text: Option<String>,
    pub note_text: Option<String>,
    pub source: Option<SourceLink>,
    /// Fetched at most once per session.
    pub page_content: Option<PageContent>,
    pub summary_text: Option<String>,
    pub include_highlight: bool,
    pub include_page_body: bool,
    pub include_summary: bool,
}

impl Default for CaptureDraft {
    fn default() -> Self {
        Self {
            vault: None,
            folder: String::new(),
            file_name: String::new(),
            highlight_text: None,
            note_text: None,
            source: None,
            page_content: None,
            summary_text: None,
            include_highlight: true,
            include_page_body: false,
            include_summary: false,
        }
    }
}

impl CaptureDraft {
    /// Body of the fetched page or transcript, if any.
    pub fn page_body(&self) -> Option<&str> {
        self.page_content.as_ref().map(|c| c.body.as_str())
    }

    pub fn has_highlight(&self) -> bool {
        self.highlight_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_draft_includes_highlight_only() {
        let draft = CaptureDraft::default();
        assert!(draft.include_highlight);
        assert!(!draft.include_page_body);
        assert!(!draft.include_summary);
    }

    #[test]
    fn display_text_falls_back_to_url() {
        let link = SourceLink::new("https://example.com", None);
        assert_eq!(link.display_text(), "https://example.com");

        let blank = SourceLink::new("https://example.com", Some("  ".to_string()));
        assert_eq!(blank.display_text(), "https://example.com");

        let titled = SourceLink::new("https://example.com", Some("Example".to_string()));
        assert_eq!(titled.display_text(), "Example");
    }
}
