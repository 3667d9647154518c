//! Destination resolution: where the note goes and whether it already exists.

use std::path::{Path, PathBuf};

use crate::error::CaptureError;
use crate::models::NOTE_EXTENSION;

/// A resolved write destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Vault-relative path without extension, as the write protocol expects it.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// Whether a file already existed at `absolute_path` when resolved.
    pub append: bool,
}

/// Compute the destination for `file_name` under `folder` in the vault at `vault_root`.
///
/// The existence check is a point-in-time test; the filesystem is never touched
/// otherwise.
pub fn resolve(
    vault_root: Option<&Path>,
    folder: Option<&str>,
    file_name: &str,
) -> Result<Destination, CaptureError> {
    let root = vault_root
        .ok_or_else(|| CaptureError::UnresolvedDestination("no vault selected".to_string()))?;

    if file_name.trim().is_empty() {
        return Err(CaptureError::UnresolvedDestination(
            "note title is empty".to_string(),
        ));
    }

    let folder = folder.map(|f| f.trim_matches('/')).unwrap_or_default();
    let relative_path = if folder.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", folder, file_name)
    };

    let absolute_path = root.join(format!("{}.{}", relative_path, NOTE_EXTENSION));
    let append = absolute_path.is_file();

    tracing::debug!(path = %absolute_path.display(), append, "Resolved destination");

    Ok(Destination {
        relative_path,
        absolute_path,
        append,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn root_level_note_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let dest = resolve(Some(dir.path()), Some(""), "Foo").unwrap();
        assert_eq!(dest.absolute_path, dir.path().join("Foo.md"));
        assert_eq!(dest.relative_path, "Foo");
        assert!(!dest.append);
    }

    #[test]
    fn existing_note_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Foo.md"), "# Foo").unwrap();
        let dest = resolve(Some(dir.path()), None, "Foo").unwrap();
        assert!(dest.append);
    }

    #[test]
    fn folder_is_joined() {
        let dir = tempfile::tempdir().unwrap();
        let dest = resolve(Some(dir.path()), Some("inbox"), "Bar").unwrap();
        assert_eq!(dest.absolute_path, dir.path().join("inbox/Bar.md"));
        assert_eq!(dest.relative_path, "inbox/Bar");
    }

    #[test]
    fn surrounding_slashes_on_folder_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let dest = resolve(Some(dir.path()), Some("/inbox/"), "Bar").unwrap();
        assert_eq!(dest.relative_path, "inbox/Bar");
    }

    #[test]
    fn directory_with_note_name_is_not_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Foo.md")).unwrap();
        let dest = resolve(Some(dir.path()), None, "Foo").unwrap();
        assert!(!dest.append);
    }

    #[test]
    fn missing_vault_is_unresolved() {
        let err = resolve(None, Some("inbox"), "Bar").unwrap_err();
        assert!(matches!(err, CaptureError::UnresolvedDestination(_)));
    }

    #[test]
    fn blank_file_name_is_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(Some(dir.path()), Some("inbox"), "  ").unwrap_err();
        assert!(matches!(err, CaptureError::UnresolvedDestination(_)));
    }
}
