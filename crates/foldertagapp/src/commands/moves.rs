//! Watcher-driven commands: new files, renames and resolved move batches.
//!
//! ## Actions on a move batch
//!
//! | Action     | Files                                  | Ledger                         | History |
//! |------------|----------------------------------------|--------------------------------|---------|
//! | `Continue` | retagged for the new folder            | entry moves to the new path    | `move`  |
//! | `Leave`    | untouched                              | entry moves to the new path    | none    |
//! | `Cancel`   | moved back, emptied folders pruned     | unchanged (file is back)       | none    |
//!
//! Excluded files are never touched, but their ledger entry still follows
//! them to the new path.

use super::commit::{commit, FileDiff};
use super::helpers::mutation_error;
use super::{CmdMessage, CmdResult};
use crate::classifier::{MoveClassifier, RenameEvent, ResolvedMove};
use crate::error::Result;
use crate::ledger::ProvenanceLedger;
use crate::model::{MoveAction, MovedPath, OperationKind};
use crate::paths::{self, normalize_path};
use crate::vault::Vault;
use crate::workspace::Workspace;

const OS_ARTIFACTS: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Files the OS drops into folders on its own. They do not make a folder
/// non-empty for pruning.
pub fn is_os_artifact(name: &str) -> bool {
    OS_ARTIFACTS.contains(&name) || name.starts_with("._")
}

/// Tags a newly created note if the rule governing it asks for that.
pub fn on_create<V: Vault>(ws: &mut Workspace, vault: &mut V, path: &str) -> Result<CmdResult> {
    let path = normalize_path(path);
    let tagger = ws.tagger();
    let wants_tags = matches!(tagger.nearest_rule(&path), Some((_, rule)) if rule.apply_to_new_files);
    if !wants_tags || tagger.is_ignored(&path) {
        return Ok(CmdResult::default());
    }

    let desired = tagger.resolve(&path);
    let current = vault.read_tags(&path).map_err(|e| mutation_error(&path, e))?;
    let diff = ProvenanceLedger::diff_for_apply(&desired, &current);
    if diff.to_add.is_empty() {
        return Ok(CmdResult::default());
    }
    commit(
        ws,
        vault,
        OperationKind::Apply,
        &format!("Tagged new file {}", path),
        &[FileDiff::new(&path).adding(diff.to_add)],
    )
}

/// A same-folder rename: provenance follows the file, tags stay.
pub fn on_rename(ws: &mut Workspace, event: &RenameEvent) -> CmdResult {
    let mut result = CmdResult::default();
    if ws.ledger.rekey(&event.old_path, &event.new_path) {
        tracing::debug!(from = %event.old_path, to = %event.new_path, "re-keyed tracking after rename");
        result.add_message(CmdMessage::info(format!(
            "Renamed {} to {}",
            event.old_path, event.new_path
        )));
    }
    result
}

/// Carries out a decided move batch.
pub fn apply_resolved<V: Vault>(
    ws: &mut Workspace,
    vault: &mut V,
    classifier: &mut MoveClassifier,
    resolved: &ResolvedMove,
) -> Result<CmdResult> {
    for m in &resolved.excluded {
        ws.ledger.rekey(&m.from, &m.to);
    }

    let mut result = match resolved.action {
        MoveAction::Continue => retag_moved(ws, vault, &resolved.moves)?,
        MoveAction::Leave => {
            for m in &resolved.moves {
                ws.ledger.rekey(&m.from, &m.to);
            }
            CmdResult::default().with_message(CmdMessage::info(format!(
                "Kept tags on {} moved file(s)",
                resolved.moves.len()
            )))
        }
        MoveAction::Cancel => cancel_moves(vault, classifier, &resolved.moves)?,
    };

    if !resolved.excluded.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Left {} excluded file(s) as they are",
            resolved.excluded.len()
        )));
    }
    if resolved.remember {
        ws.settings.remembered_move_action = Some(resolved.action);
        result.add_message(CmdMessage::info(format!(
            "Future moves will use '{}' automatically",
            resolved.action
        )));
    }
    tracing::debug!(batch = resolved.batch_id, action = %resolved.action, "resolved move batch");
    Ok(result)
}

fn retag_moved<V: Vault>(ws: &mut Workspace, vault: &mut V, moves: &[MovedPath]) -> Result<CmdResult> {
    let protected = ws.settings.protected_tags.clone();
    let tagger = ws.tagger();

    let mut diffs = Vec::new();
    let mut rekey_only = Vec::new();
    for m in moves {
        if tagger.is_ignored(&m.to) {
            rekey_only.push(m);
            continue;
        }
        let desired = tagger.resolve(&m.to);
        let current = vault.read_tags(&m.to).map_err(|e| mutation_error(&m.to, e))?;
        let diff = ws.ledger.diff_for_retag(&m.from, &desired, &current, &protected);
        diffs.push(
            FileDiff::new(&m.to)
                .adding(diff.to_add)
                .removing(diff.to_remove)
                .moved_from(&m.from),
        );
    }

    for m in rekey_only {
        ws.ledger.rekey(&m.from, &m.to);
    }
    commit(
        ws,
        vault,
        OperationKind::Move {
            moves: moves.to_vec(),
        },
        &format!("Retagged {} moved file(s)", moves.len()),
        &diffs,
    )
}

fn cancel_moves<V: Vault>(
    vault: &mut V,
    classifier: &mut MoveClassifier,
    moves: &[MovedPath],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for m in moves {
        vault.create_dir_all(paths::parent(&m.from))?;
        vault
            .move_file(&m.to, &m.from)
            .map_err(|e| mutation_error(&m.to, e))?;
        classifier.suppress(RenameEvent::new(&m.to, &m.from));

        let pruned = prune_empty_ancestors(vault, paths::parent(&m.to))?;
        if !pruned.is_empty() {
            tracing::debug!(folders = ?pruned, "pruned emptied folders");
        }
        result.paths.extend(pruned);
    }
    result.add_message(CmdMessage::success(format!(
        "Moved {} file(s) back",
        moves.len()
    )));
    Ok(result)
}

/// Deletes `folder` and its ancestors while they hold nothing but OS
/// artifacts. Stops below the vault root. Returns the removed folders.
pub fn prune_empty_ancestors<V: Vault>(vault: &mut V, folder: &str) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    let mut current = normalize_path(folder);
    while !current.is_empty() {
        let Some(entries) = vault.list_dir(&current)? else {
            break;
        };
        if !entries.iter().all(|name| is_os_artifact(name)) {
            break;
        }
        for name in &entries {
            vault.remove_file(&format!("{}/{}", current, name))?;
        }
        vault.remove_dir(&current)?;
        let parent = paths::parent(&current).to_string();
        removed.push(std::mem::replace(&mut current, parent));
    }
    Ok(removed)
}
