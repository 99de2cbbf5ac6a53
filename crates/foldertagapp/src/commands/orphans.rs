//! Tracking entries whose file no longer exists.
//!
//! Orphans are only ever reported by [`list`]. They are removed by an
//! explicit [`purge`], never as a side effect.

use super::{CmdMessage, CmdResult};
use crate::vault::Vault;
use crate::workspace::Workspace;

pub fn list<V: Vault>(ws: &Workspace, vault: &V) -> CmdResult {
    let orphans = ws.ledger.orphans(|path| vault.exists(path));
    let message = if orphans.is_empty() {
        CmdMessage::info("No orphaned tracking entries")
    } else {
        CmdMessage::warning(format!(
            "{} tracked file(s) no longer exist",
            orphans.len()
        ))
    };
    CmdResult::default().with_paths(orphans).with_message(message)
}

pub fn purge<V: Vault>(ws: &mut Workspace, vault: &V) -> CmdResult {
    let orphans = ws.ledger.orphans(|path| vault.exists(path));
    let removed = ws.ledger.purge(&orphans);
    tracing::info!(removed, "purged orphaned tracking entries");
    CmdResult::default()
        .with_paths(orphans)
        .with_message(CmdMessage::success(format!(
            "Purged {} orphaned tracking entr{}",
            removed,
            if removed == 1 { "y" } else { "ies" }
        )))
}
