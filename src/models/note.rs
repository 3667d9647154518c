use serde::{Deserialize, Serialize};

/// File extension used for every note in a vault.
pub const NOTE_EXTENSION: &str = "md";

/// A note known to the index cache.
///
/// Notes are read-only from the capture side: the indexer creates them whenever
/// the vault changes and capture only queries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// File stem of the note. Not unique within a vault.
    pub title: String,
    /// Vault-relative, forward-slash separated path including the extension.
    /// Unique within a vault.
    pub path: String,
}

impl Note {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }

    /// Build a note from its vault-relative path, deriving the title from the file stem.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let file = path.rsplit('/').next().unwrap_or(&path);
        let title = strip_note_extension(file).to_string();
        Self { title, path }
    }
}

/// `file` without a trailing `.md` extension.
pub fn strip_note_extension(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext == NOTE_EXTENSION => stem,
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_strips_folder_and_extension() {
        let note = Note::from_path("inbox/Reading List.md");
        assert_eq!(note.title, "Reading List");
        assert_eq!(note.path, "inbox/Reading List.md");
    }

    #[test]
    fn only_the_note_extension_is_stripped() {
        assert_eq!(strip_note_extension("Idea.md"), "Idea");
        assert_eq!(strip_note_extension("Idea.MD"), "Idea.MD");
        assert_eq!(strip_note_extension("v1.2 notes"), "v1.2 notes");
        assert_eq!(strip_note_extension(".md"), ".md");
    }

    #[test]
    fn from_path_at_vault_root() {
        assert_eq!(Note::from_path("Todo.md").title, "Todo");
    }
}
