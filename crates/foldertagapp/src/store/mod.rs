//! # State Persistence
//!
//! The engine's durable state is one blob:
//!
//! ```text
//! {
//!   "settings":          { inherit_depth, ignore_paths, protected_tags, remembered_move_action },
//!   "tag_tracking":      { "<path>": { auto_tags, last_updated } },
//!   "operation_history": [ TagOperation, ... ],   // oldest first
//!   "folder_rules":      { "<folder>": FolderRule },
//!   "folder_aliases":    { "<folder>": ["tag", ...] }
//! }
//! ```
//!
//! Every field defaults, so state written by an older version (or an empty
//! object) still loads. The blob is loaded once at startup, mutated in
//! memory, and saved after each mutating call.
//!
//! ## Implementations
//!
//! - [`fs::FsStateStore`]: JSON file, written atomically.
//! - [`memory::MemStateStore`]: for tests, with write-failure simulation.

use crate::error::Result;
use crate::ledger::ProvenanceLedger;
use crate::model::{Settings, TagOperation};
use crate::rules::{FolderAliases, FolderRules};
use serde::{Deserialize, Serialize};

pub mod fs;
pub mod memory;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub settings: Settings,
    pub tag_tracking: ProvenanceLedger,
    pub operation_history: Vec<TagOperation>,
    pub folder_rules: FolderRules,
    pub folder_aliases: FolderAliases,
}

pub trait StateStore {
    /// Loads the saved state, or the default state if nothing was saved yet.
    fn load(&self) -> Result<PersistedState>;

    fn save(&mut self, state: &PersistedState) -> Result<()>;
}
