//! # Vault Access
//!
//! The [`Vault`] trait is everything the engine needs from the note
//! collection: reading and rewriting a note's tag list, and the handful of
//! file operations that cancelling a move requires.
//!
//! All paths are vault-relative (see [`crate::paths`]).
//!
//! ## Implementations
//!
//! - [`fs::FsVault`]: notes on disk, tags in YAML frontmatter.
//! - [`memory::MemVault`]: in-memory tree for tests, with failure injection.
//!
//! Implementations only need to make a single [`Vault::mutate_tags`] call
//! atomic for one file. Ordering across files is the caller's concern.

use crate::error::Result;

pub mod frontmatter;
pub mod fs;
pub mod memory;

/// A note's tag list before and after one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagChange {
    pub before: Vec<String>,
    pub after: Vec<String>,
}

impl TagChange {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

pub trait Vault {
    /// Current tags of a note, in file order.
    fn read_tags(&self, path: &str) -> Result<Vec<String>>;

    /// Read-modify-write of a note's tags. `transform` receives the current
    /// list and returns the new one. When the result equals the input the
    /// note is left untouched.
    fn mutate_tags(
        &mut self,
        path: &str,
        transform: &dyn Fn(&[String]) -> Vec<String>,
    ) -> Result<TagChange>;

    /// True for both notes and folders.
    fn exists(&self, path: &str) -> bool;

    fn is_folder(&self, path: &str) -> bool;

    /// Moves a file. The destination folder must exist and the destination
    /// must not.
    fn move_file(&mut self, from: &str, to: &str) -> Result<()>;

    /// Names of the entries directly inside `folder`, or `None` if the folder
    /// does not exist. `""` is the vault root.
    fn list_dir(&self, folder: &str) -> Result<Option<Vec<String>>>;

    fn create_dir_all(&mut self, folder: &str) -> Result<()>;

    fn remove_file(&mut self, path: &str) -> Result<()>;

    /// Removes an empty folder.
    fn remove_dir(&mut self, folder: &str) -> Result<()>;

    /// Every note under `folder`, recursively, sorted.
    fn list_notes(&self, folder: &str) -> Result<Vec<String>>;
}
