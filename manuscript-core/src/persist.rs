//! Manuscript persistence for save/restore.
//!
//! Restoring is two-phase: [`SavedManuscript::load_json`] produces an inert
//! value, then [`Manuscript::from_saved`](crate::Manuscript::from_saved)
//! adopts it and re-validates the schema store. A crash mid-write can leave
//! a partial file; writes are not atomic.

use crate::manuscript::{ManuscriptError, ManuscriptState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Saved manuscript is invalid: {0}")]
    Invalid(#[from] ManuscriptError),
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// A saved manuscript with everything needed to resume writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedManuscript {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created (RFC 3339).
    pub saved_at: String,

    /// Summary readable without adopting the whole state.
    pub metadata: SaveMetadata,

    /// The complete manuscript state.
    pub state: ManuscriptState,
}

/// Metadata about the save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub title: String,

    /// Total sections at every depth.
    pub section_count: usize,

    /// Prompted sections not yet completed.
    pub incomplete_count: usize,

    /// Where the cursor was, as dotted numbering (empty before the start).
    pub cursor: String,

    #[serde(default)]
    pub saved_at: String,
}

impl SavedManuscript {
    pub fn new(state: ManuscriptState) -> Self {
        let saved_at = chrono::Utc::now().to_rfc3339();
        let metadata = SaveMetadata {
            title: state.title.clone(),
            section_count: state.toc.len(),
            incomplete_count: state.toc.incomplete().len(),
            cursor: state.cursor.current().to_string(),
            saved_at: saved_at.clone(),
        };
        Self {
            version: SAVE_VERSION,
            saved_at,
            metadata,
            state,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).await?;
        debug!(path = %path.as_ref().display(), "manuscript saved");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Read only the metadata of a save file.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: PathBuf,
    pub metadata: SaveMetadata,
}

/// List readable manuscript saves in a directory, sorted by path.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedManuscript::peek_metadata(&path).await {
                saves.push(SaveInfo { path, metadata });
            }
        }
    }

    saves.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(saves)
}

/// The snapshot file for a title: `<dir>/<sanitized title>.json`.
pub fn snapshot_path(dir: impl AsRef<Path>, title: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.json", sanitize(title)))
}

/// Keep letters, digits, spaces, `-` and `_`; replace everything else.
pub(crate) fn sanitize(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
