//! Undo: replay the most recent operation backwards.
//!
//! The target must be the top of the history. Files are restored in reverse
//! order: first the note's `tags_before`, then its `tracking_before` ledger
//! entry. The history entry is popped only once every file was restored, so
//! a failed undo can be retried.
//!
//! Files are not moved back. For a `Move` operation the file stays at its
//! new path, so the tracking it had under the old path is restored under
//! the new one and keeps following the file.

use super::helpers::mutation_error;
use super::{CmdMessage, CmdResult};
use crate::error::{FolderTagError, Result};
use crate::model::OperationId;
use crate::vault::Vault;
use crate::workspace::Workspace;

pub fn run<V: Vault>(ws: &mut Workspace, vault: &mut V, id: OperationId) -> Result<CmdResult> {
    let op = match ws.history.check_top(id) {
        Ok(op) => op.clone(),
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "undo rejected");
            return Err(e);
        }
    };

    let mut result = CmdResult::default();
    for file in op.files.iter().rev() {
        let restored = file.tags_before.clone();
        vault
            .mutate_tags(&file.path, &|_current: &[String]| restored.clone())
            .map_err(|e| mutation_error(&file.path, e))?;
        ws.ledger.restore(&file.path, file.tracking_before.clone());
        result.affected.push(file.clone());
    }

    ws.history.pop_top(id)?;
    tracing::info!(id = %id, files = op.files.len(), "undid operation");
    result.add_message(CmdMessage::success(format!("Undid: {}", op.description)));
    Ok(result)
}

pub fn run_last<V: Vault>(ws: &mut Workspace, vault: &mut V) -> Result<CmdResult> {
    let id = ws
        .history
        .latest()
        .map(|op| op.id)
        .ok_or_else(|| FolderTagError::UndoConflict("history is empty".to_string()))?;
    run(ws, vault, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::commit::{apply_rules, commit, FileDiff};
    use crate::model::{FolderRule, OperationKind};
    use crate::vault::memory::MemVault;
    use std::collections::BTreeSet;

    fn setup() -> (Workspace, MemVault) {
        let mut ws = Workspace::default();
        ws.rules.insert("Work".to_string(), FolderRule::new(["work"]));
        let mut vault = MemVault::new();
        vault
            .add_file("Work/a.md", ["manual"])
            .add_file("Work/b.md", Vec::<String>::new());
        (ws, vault)
    }

    #[test]
    fn test_commit_then_undo_round_trip() {
        let (mut ws, mut vault) = setup();
        let ledger_before = ws.ledger.clone();
        let vault_before = vault.clone();

        let id = apply_rules(&mut ws, &mut vault, &["Work".to_string()])
            .unwrap()
            .operation_id()
            .unwrap();
        assert_eq!(vault.tags("Work/a.md").unwrap(), &["manual", "work"].map(String::from));

        run(&mut ws, &mut vault, id).unwrap();
        assert_eq!(vault.tags("Work/a.md"), vault_before.tags("Work/a.md"));
        assert_eq!(vault.tags("Work/b.md"), vault_before.tags("Work/b.md"));
        assert_eq!(ws.ledger, ledger_before);
        assert!(ws.history.is_empty());
    }

    #[test]
    fn test_undo_non_top_changes_nothing() {
        let (mut ws, mut vault) = setup();
        let first = apply_rules(&mut ws, &mut vault, &["Work/a.md".to_string()])
            .unwrap()
            .operation_id()
            .unwrap();
        apply_rules(&mut ws, &mut vault, &["Work/b.md".to_string()]).unwrap();

        let ws_before = ws.clone();
        let vault_before = vault.clone();
        let err = run(&mut ws, &mut vault, first).unwrap_err();

        assert!(matches!(err, FolderTagError::UndoConflict(_)));
        assert_eq!(ws, ws_before);
        assert_eq!(vault.tags("Work/a.md"), vault_before.tags("Work/a.md"));
        assert_eq!(vault.tags("Work/b.md"), vault_before.tags("Work/b.md"));
    }

    #[test]
    fn test_undo_restores_tracking_entry_exactly() {
        let mut ws = Workspace::default();
        ws.ledger.update("x.md", BTreeSet::from(["a".to_string()]));
        let entry_before = ws.ledger.get("x.md").cloned();
        let mut vault = MemVault::new();
        vault.add_file("x.md", ["a"]);

        let result = commit(
            &mut ws,
            &mut vault,
            OperationKind::Apply,
            "add b",
            &[FileDiff::new("x.md").adding(["b"])],
        )
        .unwrap();
        run(&mut ws, &mut vault, result.operation_id().unwrap()).unwrap();
        assert_eq!(ws.ledger.get("x.md").cloned(), entry_before);
    }

    #[test]
    fn test_failed_undo_keeps_history_entry() {
        let (mut ws, mut vault) = setup();
        let id = apply_rules(&mut ws, &mut vault, &["Work".to_string()])
            .unwrap()
            .operation_id()
            .unwrap();
        vault.fail_on("Work/a.md");

        assert!(run(&mut ws, &mut vault, id).is_err());
        assert_eq!(ws.history.latest().map(|op| op.id), Some(id));

        vault.clear_failures();
        run(&mut ws, &mut vault, id).unwrap();
        assert!(ws.history.is_empty());
    }

    #[test]
    fn test_undo_last_on_empty_history() {
        let (mut ws, mut vault) = setup();
        assert!(matches!(
            run_last(&mut ws, &mut vault),
            Err(FolderTagError::UndoConflict(_))
        ));
    }
}
