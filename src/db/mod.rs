//! Local storage: the note index cache and the saved capture defaults.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::capture::{DefaultsStore, NoteIndex};
use crate::error::CaptureError;
use crate::models::{Note, SessionDefaults, Vault};

/// Key under which the last-used vault name is stored.
pub const VAULT_KEY: &str = "vault";
/// Key under which the last-used folder is stored.
pub const PATH_KEY: &str = "path";

/// When a vault was last indexed.
#[derive(Debug, Clone)]
pub struct IndexRun {
    pub vault: String,
    pub root_path: PathBuf,
    pub note_count: usize,
    pub indexed_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Note index operations
    // ============================================================

    /// Replace everything cached for `vault` with `notes`.
    pub fn replace_vault_notes(&self, vault: &Vault, notes: &[Note]) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM notes WHERE vault = ?", [&vault.name])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO notes (vault, path, title, indexed_at) VALUES (?, ?, ?, ?)",
            )?;
            for note in notes {
                stmt.execute((&vault.name, &note.path, &note.title, &now))?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO vault_index_runs (vault, root_path, note_count, indexed_at)
             VALUES (?, ?, ?, ?)",
            (
                &vault.name,
                vault.root_path.to_string_lossy().to_string(),
                notes.len() as i64,
                &now,
            ),
        )?;
        tx.commit()?;

        tracing::debug!(vault = %vault.name, count = notes.len(), "Replaced cached notes");
        Ok(())
    }

    /// Cached notes for the vault named `vault`, ordered by path.
    pub fn get_notes(&self, vault: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT title, path FROM notes WHERE vault = ? ORDER BY path")?;

        let notes = stmt
            .query_map([vault], |row| {
                Ok(Note {
                    title: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn get_index_run(&self, vault: &str) -> Result<Option<IndexRun>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let run = conn
            .query_row(
                "SELECT vault, root_path, note_count, indexed_at FROM vault_index_runs WHERE vault = ?",
                [vault],
                |row| {
                    Ok(IndexRun {
                        vault: row.get(0)?,
                        root_path: PathBuf::from(row.get::<_, String>(1)?),
                        note_count: row.get::<_, i64>(2)? as usize,
                        indexed_at: parse_datetime(row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    // ============================================================
    // Saved defaults
    // ============================================================

    pub fn get_default(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let value = conn
            .query_row("SELECT value FROM defaults WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_default(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO defaults (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }
}

impl NoteIndex for Database {
    fn notes(&self, vault: &Vault) -> Vec<Note> {
        self.get_notes(&vault.name).unwrap_or_else(|e| {
            tracing::warn!(vault = %vault.name, "Failed to read note cache: {}", e);
            Vec::new()
        })
    }
}

impl DefaultsStore for Database {
    fn load_defaults(&self) -> Result<SessionDefaults, CaptureError> {
        Ok(SessionDefaults {
            vault: self.get_default(VAULT_KEY)?.filter(|v| !v.is_empty()),
            folder: self.get_default(PATH_KEY)?.filter(|v| !v.is_empty()),
        })
    }

    fn save_defaults(&self, defaults: &SessionDefaults) -> Result<(), CaptureError> {
        if let Some(vault) = defaults.vault.as_deref().filter(|v| !v.is_empty()) {
            self.set_default(VAULT_KEY, vault)?;
        }
        if let Some(folder) = defaults.folder.as_deref().filter(|f| !f.is_empty()) {
            self.set_default(PATH_KEY, folder)?;
        }
        Ok(())
    }
}

/// Database location inside the platform data directory.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "vault-capture")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("vault-capture.db"))
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
