//! # Command Layer
//!
//! The business logic of foldertag. Each command is a plain function over a
//! [`Workspace`](crate::workspace::Workspace) and a [`Vault`](crate::vault::Vault)
//! and returns a structured [`CmdResult`].
//!
//! ## What Commands Do NOT Do
//!
//! - **Persistence**: commands mutate the in-memory workspace. Saving it is
//!   the facade's job ([`crate::api::TaggerApi`]).
//! - **Output**: no printing. Messages are data ([`CmdMessage`]); the CLI
//!   decides how to render them.
//! - **Prompting**: move batches that need a decision are returned, not
//!   asked about.
//!
//! ## Mutation Discipline
//!
//! Every tag change goes through [`commit::commit`], which is the only place
//! that writes to the vault, updates the ledger and records history. Per
//! file: mutate, then update the ledger. The history entry is recorded once,
//! after all files succeeded.
//!
//! ## Command Modules
//!
//! - [`preview`]: What applying rules would change, per file.
//! - [`commit`]: Apply, remove, revert; the mutation core.
//! - [`undo`]: Replay the most recent operation backwards.
//! - [`moves`]: Watcher-driven creates, renames and resolved move batches.
//! - [`rules`]: Rule, alias and settings management.
//! - [`orphans`]: Tracking entries whose file is gone.
//! - [`helpers`]: Target expansion and error wrapping.

use crate::classifier::PendingMoveOperation;
use crate::model::{FolderRule, OperationFileState, OperationId};
use serde::Serialize;

pub mod commit;
pub mod helpers;
pub mod moves;
pub mod orphans;
pub mod preview;
pub mod rules;
pub mod undo;

pub use commit::FileDiff;
pub use preview::FilePreview;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    /// History entries recorded by the command, in order.
    pub operation_ids: Vec<OperationId>,
    /// Files whose tags changed.
    pub affected: Vec<OperationFileState>,
    pub previews: Vec<FilePreview>,
    pub rules: Vec<(String, FolderRule)>,
    pub aliases: Vec<(String, Vec<String>)>,
    pub paths: Vec<String>,
    /// Move batches still waiting for a decision.
    pub pending: Vec<PendingMoveOperation>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// The most recent operation recorded by this command, if any.
    pub fn operation_id(&self) -> Option<OperationId> {
        self.operation_ids.last().copied()
    }

    /// Folds another result into this one, keeping order.
    pub fn merge(&mut self, other: CmdResult) {
        self.messages.extend(other.messages);
        self.operation_ids.extend(other.operation_ids);
        self.affected.extend(other.affected);
        self.previews.extend(other.previews);
        self.rules.extend(other.rules);
        self.aliases.extend(other.aliases);
        self.paths.extend(other.paths);
        self.pending.extend(other.pending);
    }
}
