use super::{PersistedState, StateStore};
use crate::error::{FolderTagError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// State blob in a JSON file.
pub struct FsStateStore {
    path: PathBuf,
}

impl FsStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FsStateStore {
    fn load(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }
        let content = fs::read_to_string(&self.path).map_err(FolderTagError::Io)?;
        if content.trim().is_empty() {
            return Ok(PersistedState::default());
        }
        serde_json::from_str(&content).map_err(FolderTagError::Serialization)
    }

    fn save(&mut self, state: &PersistedState) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(FolderTagError::Io)?;
        }
        let content = serde_json::to_string_pretty(state).map_err(FolderTagError::Serialization)?;

        // Atomic write
        let tmp = dir.join(format!(".state-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(FolderTagError::Io)?;
        fs::rename(&tmp, &self.path).map_err(FolderTagError::Io)?;
        Ok(())
    }
}
