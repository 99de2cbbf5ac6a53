use crate::error::{FolderTagError, Result};
use crate::paths::normalize_path;
use crate::vault::Vault;
use crate::workspace::Workspace;

/// Expands user targets into note paths: folders become every note under
/// them, notes stay as they are. Ignored paths are dropped. Order is kept,
/// duplicates removed.
pub fn expand_targets<V: Vault>(ws: &Workspace, vault: &V, targets: &[String]) -> Result<Vec<String>> {
    let tagger = ws.tagger();
    let mut notes: Vec<String> = Vec::new();
    for target in targets {
        let target = normalize_path(target);
        let found = if target.is_empty() || vault.is_folder(&target) {
            vault.list_notes(&target)?
        } else {
            vec![target]
        };
        for note in found {
            if !tagger.is_ignored(&note) && !notes.contains(&note) {
                notes.push(note);
            }
        }
    }
    Ok(notes)
}

/// Attributes a vault failure to `path`, keeping existing attribution.
pub fn mutation_error(path: &str, err: FolderTagError) -> FolderTagError {
    match err {
        FolderTagError::Mutation { .. } => err,
        other => FolderTagError::mutation(path, other),
    }
}
