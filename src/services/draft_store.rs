//! Draft persistence.
//!
//! The editor state is kept as a JSON file next to the operator config so
//! edits survive between CLI invocations until they are published or
//! cleared.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::editor::EditorState;

/// Service for loading and saving the editor draft.
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the draft, or an empty draft if none was saved.
    pub fn load(&self) -> Result<EditorState> {
        if !self.path.exists() {
            return Ok(EditorState::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read draft file: {}", self.path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse draft file: {}", self.path.display()))
    }

    /// Saves the draft using temp file + rename.
    pub fn save(&self, state: &EditorState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create draft directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(state).context("Failed to serialize draft")?;
        let temp_path = self.path.with_extension("json.tmp");

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp draft file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to rename temp draft file to: {}", self.path.display())
        })?;

        Ok(())
    }

    /// Deletes the saved draft. Missing files are not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to delete draft file: {}", self.path.display())),
        }
    }
}
