//! Builds the note index cache from the files in a vault.

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::db::Database;
use crate::models::{Note, Vault, NOTE_EXTENSION};

/// Collect every note in `vault`, skipping hidden files and folders
/// (`.obsidian`, `.trash`, ...). Only lowercase `.md` files are notes, matching
/// the path the writer targets. Notes are sorted by path.
pub fn scan_vault(vault: &Vault) -> Result<Vec<Note>> {
    let root = &vault.root_path;
    let mut notes = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(vault = %vault.name, "Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_note_extension(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside the vault", entry.path().display()))?
            .to_string_lossy()
            .replace('\\', "/");
        notes.push(Note::from_path(relative));
    }

    notes.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(vault = %vault.name, count = notes.len(), "Scanned vault");
    Ok(notes)
}

/// Rescan `vault` and replace its cached notes.
pub fn refresh(db: &Database, vault: &Vault) -> Result<usize> {
    let notes = scan_vault(vault)
        .with_context(|| format!("Failed to scan vault {}", vault.name))?;
    db.replace_vault_notes(vault, &notes)?;
    tracing::info!(vault = %vault.name, count = notes.len(), "Indexed vault");
    Ok(notes.len())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn has_note_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == NOTE_EXTENSION)
}
