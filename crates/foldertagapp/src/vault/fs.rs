use super::frontmatter;
use super::{TagChange, Vault};
use crate::error::{FolderTagError, Result};
use crate::paths::normalize_path;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const NOTE_EXT: &str = "md";

/// Vault backed by a folder of markdown notes.
///
/// Tags live in each note's YAML frontmatter. Rewrites go through a temp
/// file in the same folder followed by a rename, so a note is never left
/// half-written. Hidden entries (names starting with `.`) are skipped when
/// listing notes, which keeps state and editor folders out of bulk runs.
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, path: &str) -> PathBuf {
        let path = normalize_path(path);
        let mut abs = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            abs.push(segment);
        }
        abs
    }

    fn write_atomic(target: &Path, content: &str) -> Result<()> {
        let dir = target.parent().unwrap_or(Path::new("."));
        let tmp = dir.join(format!(".foldertag-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(FolderTagError::Io)?;
        if let Err(e) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(FolderTagError::Io(e));
        }
        Ok(())
    }

    fn collect_notes(&self, dir: &Path, rel: &str, out: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir).map_err(FolderTagError::Io)? {
            let entry = entry.map_err(FolderTagError::Io)?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let child = if rel.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", rel, name)
            };
            let path = entry.path();
            if path.is_dir() {
                self.collect_notes(&path, &child, out)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXT) {
                out.push(child);
            }
        }
        Ok(())
    }
}

impl Vault for FsVault {
    fn read_tags(&self, path: &str) -> Result<Vec<String>> {
        let content = fs::read_to_string(self.abs(path)).map_err(FolderTagError::Io)?;
        frontmatter::read_tags(&content)
    }

    fn mutate_tags(
        &mut self,
        path: &str,
        transform: &dyn Fn(&[String]) -> Vec<String>,
    ) -> Result<TagChange> {
        let target = self.abs(path);
        let content = fs::read_to_string(&target).map_err(FolderTagError::Io)?;
        let before = frontmatter::read_tags(&content)?;
        let after = transform(&before);
        if after != before {
            let updated = frontmatter::write_tags(&content, &after)?;
            Self::write_atomic(&target, &updated)?;
        }
        Ok(TagChange { before, after })
    }

    fn exists(&self, path: &str) -> bool {
        self.abs(path).exists()
    }

    fn is_folder(&self, path: &str) -> bool {
        self.abs(path).is_dir()
    }

    fn move_file(&mut self, from: &str, to: &str) -> Result<()> {
        let (from, to) = (self.abs(from), self.abs(to));
        if to.exists() {
            return Err(FolderTagError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            )));
        }
        fs::rename(from, to).map_err(FolderTagError::Io)
    }

    fn list_dir(&self, folder: &str) -> Result<Option<Vec<String>>> {
        let dir = self.abs(folder);
        if !dir.is_dir() {
            return Ok(None);
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(FolderTagError::Io)? {
            let entry = entry.map_err(FolderTagError::Io)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(Some(names))
    }

    fn create_dir_all(&mut self, folder: &str) -> Result<()> {
        fs::create_dir_all(self.abs(folder)).map_err(FolderTagError::Io)
    }

    fn remove_file(&mut self, path: &str) -> Result<()> {
        fs::remove_file(self.abs(path)).map_err(FolderTagError::Io)
    }

    fn remove_dir(&mut self, folder: &str) -> Result<()> {
        fs::remove_dir(self.abs(folder)).map_err(FolderTagError::Io)
    }

    fn list_notes(&self, folder: &str) -> Result<Vec<String>> {
        let folder = normalize_path(folder);
        let dir = self.abs(&folder);
        let mut notes = Vec::new();
        if dir.is_dir() {
            self.collect_notes(&dir, &folder, &mut notes)?;
        } else if dir.is_file() {
            notes.push(folder);
        }
        notes.sort();
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_mutate_rewrites_frontmatter() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Work/todo.md", "---\ntitle: Todo\n---\nBody\n");
        let mut vault = FsVault::new(dir.path());

        let change = vault
            .mutate_tags("Work/todo.md", &|tags| {
                let mut tags = tags.to_vec();
                tags.push("work".into());
                tags
            })
            .unwrap();
        assert!(change.before.is_empty());
        assert_eq!(vault.read_tags("Work/todo.md").unwrap(), vec!["work"]);

        let content = fs::read_to_string(dir.path().join("Work/todo.md")).unwrap();
        assert!(content.contains("title: Todo"));
        assert!(content.ends_with("Body\n"));
    }

    #[test]
    fn test_unchanged_tags_do_not_rewrite() {
        let dir = tempdir().unwrap();
        let original = "---\ntags: [a]\n---\n";
        write(dir.path(), "x.md", original);
        let mut vault = FsVault::new(dir.path());
        vault.mutate_tags("x.md", &|tags| tags.to_vec()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("x.md")).unwrap(),
            original
        );
    }

    #[test]
    fn test_missing_note_is_error() {
        let dir = tempdir().unwrap();
        let mut vault = FsVault::new(dir.path());
        assert!(vault.mutate_tags("nope.md", &|t| t.to_vec()).is_err());
    }

    #[test]
    fn test_list_notes_skips_hidden_and_non_markdown() {
        let dir = tempdir().unwrap();
        write(dir.path(), "A/x.md", "");
        write(dir.path(), "A/B/y.md", "");
        write(dir.path(), "A/image.png", "");
        write(dir.path(), ".foldertag/state.json", "{}");
        let vault = FsVault::new(dir.path());
        assert_eq!(vault.list_notes("").unwrap(), vec!["A/B/y.md", "A/x.md"]);
        assert_eq!(vault.list_notes("A/x.md").unwrap(), vec!["A/x.md"]);
    }

    #[test]
    fn test_move_and_prune_operations() {
        let dir = tempdir().unwrap();
        write(dir.path(), "A/x.md", "");
        let mut vault = FsVault::new(dir.path());
        vault.create_dir_all("B/C").unwrap();
        vault.move_file("A/x.md", "B/C/x.md").unwrap();
        assert_eq!(vault.list_dir("A").unwrap(), Some(vec![]));
        vault.remove_dir("A").unwrap();
        assert!(!vault.exists("A"));
        assert!(vault.list_dir("A").unwrap().is_none());
    }
}
