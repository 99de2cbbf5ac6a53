use crate::api::TaggerApi;
use crate::store::fs::FsStateStore;
use crate::vault::fs::FsVault;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway vault on disk with its state file inside it.
pub struct TestEnv {
    // Keeps the directory alive until the test is done.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(".foldertag").join("state.json")
    }

    /// Writes a note, creating its folders.
    pub fn write_note(&self, path: &str, content: &str) -> PathBuf {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create note folder");
        }
        fs::write(&full, content).expect("failed to write note");
        full
    }

    pub fn read_note(&self, path: &str) -> String {
        fs::read_to_string(self.root.join(path)).expect("failed to read note")
    }

    pub fn mkdir(&self, path: &str) {
        fs::create_dir_all(self.root.join(path)).expect("failed to create folder");
    }

    pub fn path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        Path::new(&self.root).join(path).exists()
    }

    /// Opens an API over this vault, reloading state from disk.
    pub fn api(&self) -> TaggerApi<FsVault, FsStateStore> {
        TaggerApi::new(
            FsVault::new(&self.root),
            FsStateStore::new(self.state_file()),
        )
        .expect("failed to open api")
    }
}
