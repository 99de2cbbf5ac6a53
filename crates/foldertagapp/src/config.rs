//! # Configuration
//!
//! Process-level configuration, loaded with [`confique`] from layered
//! sources. Plugin settings that travel with the vault (inherit depth,
//! ignore paths, protected tags, remembered move action) are *not* here;
//! they live in the state file (see [`crate::store`]).
//!
//! ## Sources
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `FOLDERTAG_VAULT`, `FOLDERTAG_STATE_FILE`, ...
//! 2. **Vault config**: `<vault>/.foldertag/foldertag.toml`
//! 3. **User config**: OS-appropriate config directory (via `directories`).
//! 4. **Compiled defaults**.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `vault_root` | current directory | Folder holding the notes |
//! | `state_file` | `<vault>/.foldertag/state.json` | Rules, ledger and history |
//! | `debounce_ms` | `100` | Quiet time before a rename is classified |
//! | `batch_window_ms` | `300` | Window that groups moves into one batch |
//! | `history_limit` | `50` | Undoable operations kept (at most 50) |

use crate::error::Result;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "foldertag.toml";
pub const STATE_DIR: &str = ".foldertag";
pub const STATE_FILE: &str = "state.json";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FolderTagConfig {
    /// Folder holding the notes. Defaults to the current directory.
    #[config(env = "FOLDERTAG_VAULT")]
    pub vault_root: Option<PathBuf>,

    /// Where rules, tracking and history are stored.
    #[config(env = "FOLDERTAG_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    #[config(default = 100, env = "FOLDERTAG_DEBOUNCE_MS")]
    pub debounce_ms: u64,

    #[config(default = 300, env = "FOLDERTAG_BATCH_WINDOW_MS")]
    pub batch_window_ms: u64,

    /// Capped at 50; larger values keep 50.
    #[config(default = 50, env = "FOLDERTAG_HISTORY_LIMIT")]
    pub history_limit: usize,
}

impl Default for FolderTagConfig {
    fn default() -> Self {
        Self {
            vault_root: None,
            state_file: None,
            debounce_ms: 100,
            batch_window_ms: 300,
            history_limit: 50,
        }
    }
}

impl FolderTagConfig {
    /// Loads configuration for `vault` (or the configured/current vault).
    /// Missing files are skipped.
    pub fn load(vault: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(vault) = vault {
            builder = builder.file(vault.join(STATE_DIR).join(CONFIG_FILE));
        }
        if let Some(user) = user_config_file() {
            builder = builder.file(user);
        }
        let mut config = builder.load()?;
        if let Some(vault) = vault {
            config.vault_root = Some(vault.to_path_buf());
        }
        Ok(config)
    }

    pub fn vault_root(&self) -> PathBuf {
        self.vault_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.vault_root().join(STATE_DIR).join(STATE_FILE))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }
}

fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "foldertag").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FolderTagConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(100));
        assert_eq!(config.batch_window(), Duration::from_millis(300));
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.vault_root(), PathBuf::from("."));
    }

    #[test]
    fn test_state_file_defaults_inside_vault() {
        let config = FolderTagConfig {
            vault_root: Some(PathBuf::from("/notes")),
            ..Default::default()
        };
        assert_eq!(
            config.state_file(),
            PathBuf::from("/notes/.foldertag/state.json")
        );
    }

    #[test]
    fn test_explicit_state_file_wins() {
        let config = FolderTagConfig {
            vault_root: Some(PathBuf::from("/notes")),
            state_file: Some(PathBuf::from("/tmp/state.json")),
            ..Default::default()
        };
        assert_eq!(config.state_file(), PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_vault_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join(STATE_DIR);
        std::fs::create_dir_all(&state_dir).unwrap();
        std::fs::write(state_dir.join(CONFIG_FILE), "batch_window_ms = 500\n").unwrap();

        let config = FolderTagConfig::load(Some(dir.path())).unwrap();
        assert_eq!(config.batch_window_ms, 500);
        assert_eq!(config.vault_root(), dir.path());
    }
}
