//! # Domain Model
//!
//! Persistent data types shared by every layer: folder rules, plugin
//! settings, provenance entries and operation records. All of them are
//! serde types because they round-trip through the state blob (see
//! [`crate::store`]).
//!
//! ## Paths
//!
//! Every path in the model is **vault-relative** and uses `/` separators with
//! no leading or trailing slash (`"Health/Therapy/session.md"`). Folder paths
//! follow the same convention; the vault root is the empty string.
//! [`crate::paths::normalize_path`] produces this form from user input.
//!
//! ## Operation Records
//!
//! A [`TagOperation`] is an immutable envelope (`id`, `description`,
//! `timestamp`, `files`) around a closed set of kinds ([`OperationKind`]).
//! Each affected file carries a before/after snapshot so an undo can replay
//! the exact prior state without recomputing anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type OperationId = Uuid;

/// How far down a rule's tags propagate below the rule folder.
///
/// Level 1 means files directly inside the rule folder, level 2 files one
/// folder below, and so on. Serialized as the string `"all"` or a list of
/// levels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ApplyDownRepr", into = "ApplyDownRepr")]
pub enum ApplyDownLevels {
    #[default]
    All,
    Levels(Vec<u32>),
}

impl ApplyDownLevels {
    pub fn admits(&self, level: usize) -> bool {
        match self {
            ApplyDownLevels::All => true,
            ApplyDownLevels::Levels(levels) => levels.iter().any(|l| *l as usize == level),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ApplyDownRepr {
    Keyword(String),
    Levels(Vec<u32>),
}

impl TryFrom<ApplyDownRepr> for ApplyDownLevels {
    type Error = String;

    fn try_from(repr: ApplyDownRepr) -> Result<Self, Self::Error> {
        match repr {
            ApplyDownRepr::Keyword(word) if word.eq_ignore_ascii_case("all") => {
                Ok(ApplyDownLevels::All)
            }
            ApplyDownRepr::Keyword(word) => Err(format!(
                "apply_down_levels must be \"all\" or a list of levels, found \"{}\"",
                word
            )),
            ApplyDownRepr::Levels(levels) => Ok(ApplyDownLevels::Levels(levels)),
        }
    }
}

impl From<ApplyDownLevels> for ApplyDownRepr {
    fn from(value: ApplyDownLevels) -> Self {
        match value {
            ApplyDownLevels::All => ApplyDownRepr::Keyword("all".to_string()),
            ApplyDownLevels::Levels(levels) => ApplyDownRepr::Levels(levels),
        }
    }
}

/// Explicit tagging rule attached to one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRule {
    /// Tags applied verbatim to every file the rule reaches.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Which folders contribute their name as a tag: 1 is the rule folder
    /// itself, 2 its parent, and so on towards the vault root.
    #[serde(default)]
    pub folder_tag_levels: Vec<u32>,
    #[serde(default)]
    pub apply_down_levels: ApplyDownLevels,
    /// Also pull in the tags of the next rule up the folder chain.
    #[serde(default)]
    pub inherit_from_ancestors: bool,
    /// Tag files as soon as they are created under this folder.
    #[serde(default)]
    pub apply_to_new_files: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FolderRule {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            folder_tag_levels: Vec::new(),
            apply_down_levels: ApplyDownLevels::All,
            inherit_from_ancestors: false,
            apply_to_new_files: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_folder_tag_levels(mut self, levels: Vec<u32>) -> Self {
        self.folder_tag_levels = levels;
        self
    }

    pub fn with_apply_down(mut self, levels: ApplyDownLevels) -> Self {
        self.apply_down_levels = levels;
        self
    }

    pub fn inheriting(mut self) -> Self {
        self.inherit_from_ancestors = true;
        self
    }

    pub fn for_new_files(mut self) -> Self {
        self.apply_to_new_files = true;
        self
    }
}

/// What to do with the tags of files that moved to another folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAction {
    /// Recompute tags for the new location.
    Continue,
    /// Keep tags as they are.
    Leave,
    /// Move the files back where they came from.
    Cancel,
}

impl std::fmt::Display for MoveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveAction::Continue => write!(f, "continue"),
            MoveAction::Leave => write!(f, "leave"),
            MoveAction::Cancel => write!(f, "cancel"),
        }
    }
}

impl std::str::FromStr for MoveAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continue" | "retag" => Ok(MoveAction::Continue),
            "leave" | "keep" => Ok(MoveAction::Leave),
            "cancel" => Ok(MoveAction::Cancel),
            other => Err(format!("unknown move action '{}'", other)),
        }
    }
}

fn default_inherit_depth() -> usize {
    10
}

/// Plugin-wide settings, persisted with the rest of the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Only the top N folder levels are considered when looking for rules.
    #[serde(default = "default_inherit_depth")]
    pub inherit_depth: usize,
    /// Folders (and files) excluded from tagging, matched by path prefix.
    #[serde(default)]
    pub ignore_paths: Vec<String>,
    /// Tags that removal operations never take off a file.
    #[serde(default)]
    pub protected_tags: Vec<String>,
    #[serde(default)]
    pub remembered_move_action: Option<MoveAction>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inherit_depth: default_inherit_depth(),
            ignore_paths: Vec::new(),
            protected_tags: Vec::new(),
            remembered_move_action: None,
        }
    }
}

/// Provenance record for one file: the tags this engine put there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub auto_tags: BTreeSet<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedPath {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationKind {
    Apply,
    Remove,
    Bulk,
    Move { moves: Vec<MovedPath> },
    Revert,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Apply => "apply",
            OperationKind::Remove => "remove",
            OperationKind::Bulk => "bulk",
            OperationKind::Move { .. } => "move",
            OperationKind::Revert => "revert",
        }
    }
}

/// Snapshot of one file taken around a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFileState {
    pub path: String,
    pub tags_before: Vec<String>,
    pub tags_after: Vec<String>,
    /// Ledger entry for `path` before the mutation (`None` if untracked).
    pub tracking_before: Option<TrackingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOperation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<OperationFileState>,
}

/// Raw notification from the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Create { path: String },
    Rename { old_path: String, path: String },
}
