use super::{TagChange, Vault};
use crate::error::{FolderTagError, Result};
use crate::paths::{self, normalize_path};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory vault for tests.
///
/// Files map to their tag list directly; there is no note body. Folders are
/// explicit so that pruning empty folders can be observed. Paths registered
/// with [`MemVault::fail_on`] make every write to them fail.
#[derive(Debug, Clone, Default)]
pub struct MemVault {
    files: BTreeMap<String, Vec<String>>,
    folders: BTreeSet<String>,
    failing: BTreeSet<String>,
}

impl MemVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file (and its folders) with the given tags.
    pub fn add_file<I, S>(&mut self, path: &str, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = normalize_path(path);
        self.add_folder(paths::parent(&path));
        self.files
            .insert(path, tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_folder(&mut self, folder: &str) -> &mut Self {
        for prefix in paths::folder_chain(&normalize_path(folder)) {
            self.folders.insert(prefix);
        }
        self
    }

    pub fn fail_on(&mut self, path: &str) -> &mut Self {
        self.failing.insert(normalize_path(path));
        self
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Tags of a file, if it exists.
    pub fn tags(&self, path: &str) -> Option<&[String]> {
        self.files.get(&normalize_path(path)).map(Vec::as_slice)
    }

    fn folder_exists(&self, folder: &str) -> bool {
        folder.is_empty() || self.folders.contains(folder)
    }

    fn check_writable(&self, path: &str) -> Result<()> {
        if self.failing.contains(path) {
            return Err(FolderTagError::mutation(path, "simulated write failure"));
        }
        Ok(())
    }

    fn not_found(path: &str) -> FolderTagError {
        FolderTagError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path),
        ))
    }
}

impl Vault for MemVault {
    fn read_tags(&self, path: &str) -> Result<Vec<String>> {
        let path = normalize_path(path);
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| Self::not_found(&path))
    }

    fn mutate_tags(
        &mut self,
        path: &str,
        transform: &dyn Fn(&[String]) -> Vec<String>,
    ) -> Result<TagChange> {
        let path = normalize_path(path);
        self.check_writable(&path)?;
        let tags = self
            .files
            .get_mut(&path)
            .ok_or_else(|| Self::not_found(&path))?;
        let before = tags.clone();
        let after = transform(&before);
        *tags = after.clone();
        Ok(TagChange { before, after })
    }

    fn exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.files.contains_key(&path) || self.folder_exists(&path)
    }

    fn is_folder(&self, path: &str) -> bool {
        self.folder_exists(&normalize_path(path))
    }

    fn move_file(&mut self, from: &str, to: &str) -> Result<()> {
        let (from, to) = (normalize_path(from), normalize_path(to));
        self.check_writable(&from)?;
        if !self.folder_exists(paths::parent(&to)) {
            return Err(Self::not_found(paths::parent(&to)));
        }
        if self.exists(&to) {
            return Err(FolderTagError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", to),
            )));
        }
        let tags = self.files.remove(&from).ok_or_else(|| Self::not_found(&from))?;
        self.files.insert(to, tags);
        Ok(())
    }

    fn list_dir(&self, folder: &str) -> Result<Option<Vec<String>>> {
        let folder = normalize_path(folder);
        if !self.folder_exists(&folder) {
            return Ok(None);
        }
        let entries = self
            .files
            .keys()
            .chain(self.folders.iter())
            .filter(|p| !p.is_empty() && paths::parent(p) == folder)
            .map(|p| paths::basename(p).to_string())
            .collect();
        Ok(Some(entries))
    }

    fn create_dir_all(&mut self, folder: &str) -> Result<()> {
        self.add_folder(folder);
        Ok(())
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        self.check_writable(&path)?;
        self.files
            .remove(&path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(&path))
    }

    fn remove_dir(&mut self, folder: &str) -> Result<()> {
        let folder = normalize_path(folder);
        match self.list_dir(&folder)? {
            None => Err(Self::not_found(&folder)),
            Some(entries) if !entries.is_empty() => Err(FolderTagError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} is not empty", folder),
            ))),
            Some(_) => {
                self.folders.remove(&folder);
                Ok(())
            }
        }
    }

    fn list_notes(&self, folder: &str) -> Result<Vec<String>> {
        let folder = normalize_path(folder);
        Ok(self
            .files
            .keys()
            .filter(|p| folder.is_empty() || paths::is_under(p, &folder))
            .cloned()
            .collect())
    }
}
