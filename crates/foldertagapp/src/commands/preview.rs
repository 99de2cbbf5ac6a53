use super::helpers::{expand_targets, mutation_error};
use super::CmdResult;
use crate::error::Result;
use crate::ledger::ProvenanceLedger;
use crate::tagger::LevelTags;
use crate::vault::Vault;
use crate::workspace::Workspace;
use serde::Serialize;

/// What applying the rules to one file would do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub path: String,
    pub current_tags: Vec<String>,
    /// Tags the ledger attributes to this engine.
    pub auto_tags: Vec<String>,
    pub tags_by_level: Vec<LevelTags>,
    pub desired_tags: Vec<String>,
    pub to_add: Vec<String>,
}

pub fn preview_file<V: Vault>(ws: &Workspace, vault: &V, path: &str) -> Result<FilePreview> {
    let tagger = ws.tagger();
    let current_tags = vault
        .read_tags(path)
        .map_err(|e| mutation_error(path, e))?;
    let desired_tags = tagger.resolve(path);
    let diff = ProvenanceLedger::diff_for_apply(&desired_tags, &current_tags);
    Ok(FilePreview {
        path: path.to_string(),
        auto_tags: ws.ledger.auto_tags(path).into_iter().collect(),
        tags_by_level: tagger.resolve_by_level(path),
        current_tags,
        desired_tags,
        to_add: diff.to_add,
    })
}

pub fn run<V: Vault>(ws: &Workspace, vault: &V, targets: &[String]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for path in expand_targets(ws, vault, targets)? {
        result.previews.push(preview_file(ws, vault, &path)?);
    }
    Ok(result)
}
