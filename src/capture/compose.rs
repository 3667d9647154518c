//! Note body assembly.
//!
//! Sections appear in a fixed order and are separated by a blank line. A
//! section whose inclusion rule is not met is left out entirely.

use chrono::NaiveDateTime;

use crate::models::CaptureDraft;

const SECTION_SEPARATOR: &str = "\n\n";
const HEADING_FORMAT: &str = "## %d/%m/%y: %H:%M:%S";

/// Build the note body for `draft`, stamped with `now`.
pub fn compose(draft: &CaptureDraft, now: NaiveDateTime) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(now.format(HEADING_FORMAT).to_string());

    if draft.include_highlight {
        if let Some(highlight) = non_empty(draft.highlight_text.as_deref()) {
            sections.push(format!("> [!quote] Quote\n{}", highlight));
        }
    }

    if let Some(note) = draft.note_text.as_deref() {
        if !note.trim().is_empty() {
            sections.push(format!("> [!note] Note\n{}", note));
        }
    }

    if let Some(source) = &draft.source {
        if !source.url.is_empty() {
            sections.push(format!(
                "Source: [{}]({})",
                source.display_text(),
                source.url
            ));
        }
    }

    if draft.include_summary {
        if let Some(summary) = non_empty(draft.summary_text.as_deref()) {
            sections.push(format!("---\n\n{}\n\n---", summary));
        }
    }

    if draft.include_page_body {
        if let Some(body) = non_empty(draft.page_body()) {
            sections.push(body.to_string());
        }
    }

    sections.join(SECTION_SEPARATOR)
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}
