//! Tag mutation: apply, remove, revert.
//!
//! [`commit`] is the single write path. For each file in order it clamps the
//! requested removals to what the ledger may remove, rewrites the note, and
//! only then updates the ledger with the tags it actually added or removed.
//! A file whose tags end up unchanged is skipped and not recorded.
//!
//! If a write fails the commit stops with [`FolderTagError::Mutation`]. Files
//! already written keep their new tags and ledger entries, and no history
//! entry is recorded.

use super::helpers::{expand_targets, mutation_error};
use super::{CmdMessage, CmdResult};
use crate::error::{FolderTagError, Result};
use crate::ledger::ProvenanceLedger;
use crate::model::{OperationFileState, OperationKind};
use crate::paths::normalize_path;
use crate::tags::{normalize_all, normalize_tag};
use crate::vault::Vault;
use crate::workspace::Workspace;
use std::collections::BTreeSet;

/// Requested change for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
    /// Ledger key the file's provenance is read from, when it differs from
    /// `path` (a moved file not yet re-keyed).
    pub tracked_from: Option<String>,
}

impl FileDiff {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            ..Default::default()
        }
    }

    pub fn adding<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to_add.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn removing<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to_remove.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn moved_from(mut self, old_path: impl AsRef<str>) -> Self {
        self.tracked_from = Some(normalize_path(old_path.as_ref()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

pub fn commit<V: Vault>(
    ws: &mut Workspace,
    vault: &mut V,
    kind: OperationKind,
    description: &str,
    diffs: &[FileDiff],
) -> Result<CmdResult> {
    let mut files = Vec::new();
    let protected = ws.settings.protected_tags.clone();

    for diff in diffs {
        let path = normalize_path(&diff.path);
        let tracked_key = diff
            .tracked_from
            .clone()
            .unwrap_or_else(|| path.clone());

        let removals: BTreeSet<String> = ws
            .ledger
            .filter_removals(&tracked_key, &diff.to_remove, &protected)
            .into_iter()
            .collect();
        let additions = normalize_all(&diff.to_add);
        let tracking_before = ws.ledger.get(&tracked_key).cloned();

        let change = vault
            .mutate_tags(&path, &|current: &[String]| {
                apply_change(current, &additions, &removals)
            })
            .map_err(|e| {
                tracing::warn!(path = %path, error = %e, "tag mutation failed; aborting commit");
                mutation_error(&path, e)
            })?;

        let before: BTreeSet<String> = change.before.iter().filter_map(|t| normalize_tag(t)).collect();
        let after: BTreeSet<String> = change.after.iter().filter_map(|t| normalize_tag(t)).collect();

        let mut auto_tags = ws.ledger.auto_tags(&tracked_key);
        auto_tags.retain(|t| !(removals.contains(t) && !after.contains(t)));
        auto_tags.extend(after.difference(&before).cloned());

        if tracked_key != path {
            ws.ledger.remove(&tracked_key);
        }
        ws.ledger.update(&path, auto_tags);

        if change.changed() {
            files.push(OperationFileState {
                path,
                tags_before: change.before,
                tags_after: change.after,
                tracking_before,
            });
        }
    }

    let mut result = CmdResult::default();
    if files.is_empty() {
        result.add_message(CmdMessage::info("Nothing to change"));
        return Ok(result);
    }

    let count = files.len();
    result.affected = files.clone();
    let id = ws.history.record(kind, description, files);
    tracing::info!(id = %id, files = count, "{}", description);
    result.operation_ids.push(id);
    result.add_message(CmdMessage::success(format!(
        "{} ({} file{})",
        description,
        count,
        if count == 1 { "" } else { "s" }
    )));
    Ok(result)
}

/// Drops `removals` from `current` and appends `additions` not already
/// present. Existing tags keep their order and spelling.
fn apply_change(current: &[String], additions: &[String], removals: &BTreeSet<String>) -> Vec<String> {
    let mut out: Vec<String> = current
        .iter()
        .filter(|t| normalize_tag(t).map_or(true, |n| !removals.contains(&n)))
        .cloned()
        .collect();
    for tag in additions {
        if !out.iter().any(|t| normalize_tag(t).as_deref() == Some(tag.as_str())) {
            out.push(tag.clone());
        }
    }
    out
}

/// Adds the tags the rules want to every target. Never removes anything.
pub fn apply_rules<V: Vault>(ws: &mut Workspace, vault: &mut V, targets: &[String]) -> Result<CmdResult> {
    let notes = expand_targets(ws, vault, targets)?;
    let tagger = ws.tagger();

    let mut diffs = Vec::new();
    for note in &notes {
        let desired = tagger.resolve(note);
        if desired.is_empty() {
            continue;
        }
        let current = vault.read_tags(note).map_err(|e| mutation_error(note, e))?;
        let diff = ProvenanceLedger::diff_for_apply(&desired, &current);
        if !diff.to_add.is_empty() {
            diffs.push(FileDiff::new(note).adding(diff.to_add));
        }
    }

    let (kind, description) = if targets.len() == 1 && notes.len() == 1 && !vault.is_folder(&targets[0]) {
        (OperationKind::Apply, format!("Applied folder rules to {}", notes[0]))
    } else {
        (
            OperationKind::Bulk,
            format!("Applied folder rules to {} file(s)", notes.len()),
        )
    };
    commit(ws, vault, kind, &description, &diffs)
}

/// Removes every tracked, unprotected auto-tag from the targets.
pub fn revert<V: Vault>(ws: &mut Workspace, vault: &mut V, targets: &[String]) -> Result<CmdResult> {
    let notes = expand_targets(ws, vault, targets)?;
    let protected = ws.settings.protected_tags.clone();

    let mut diffs = Vec::new();
    for note in &notes {
        let tracked = ws.ledger.auto_tags(note);
        if tracked.is_empty() {
            continue;
        }
        let current = vault.read_tags(note).map_err(|e| mutation_error(note, e))?;
        let to_remove = ProvenanceLedger::diff_for_revert(&tracked, &current, &protected);
        if !to_remove.is_empty() {
            diffs.push(FileDiff::new(note).removing(to_remove));
        }
    }

    commit(
        ws,
        vault,
        OperationKind::Revert,
        &format!("Reverted auto-tags on {} file(s)", notes.len()),
        &diffs,
    )
}

/// Removes specific tags from the targets, limited to auto-tags.
pub fn remove_tags<V: Vault>(
    ws: &mut Workspace,
    vault: &mut V,
    targets: &[String],
    tags: &[String],
) -> Result<CmdResult> {
    if tags.is_empty() {
        return Err(FolderTagError::Api("No tags specified".to_string()));
    }
    let notes = expand_targets(ws, vault, targets)?;
    let diffs: Vec<FileDiff> = notes
        .iter()
        .map(|note| FileDiff::new(note).removing(tags.iter().cloned()))
        .collect();
    let mut result = commit(
        ws,
        vault,
        OperationKind::Remove,
        &format!("Removed {} from {} file(s)", tags.join(", "), notes.len()),
        &diffs,
    )?;

    let removable: usize = result
        .affected
        .iter()
        .map(|f| f.tags_before.len().saturating_sub(f.tags_after.len()))
        .sum();
    if removable == 0 {
        result.add_message(CmdMessage::warning(
            "Only auto-applied, unprotected tags can be removed",
        ));
    }
    Ok(result)
}
