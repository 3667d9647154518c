//! Domain models for vault-capture.
//!
//! # Core Concepts
//!
//! ## Read-only Entities
//!
//! - [`Vault`]: One note-storage root known to Obsidian.
//! - [`Note`]: One markdown file inside a vault, as recorded by the note index cache.
//!
//! ## Session Entities
//!
//! These live only for the duration of a capture session:
//!
//! - [`CaptureDraft`]: The user-editable state that becomes the note body.
//! - [`SessionDefaults`]: The last-used vault and folder, persisted across sessions.

mod draft;
mod note;
mod vault;

pub use draft::*;
pub use note::*;
pub use vault::*;
