//! Folder rules and aliases, and the validation that guards them.
//!
//! Rules are validated once, when saved. Everything downstream (notably
//! [`crate::tagger`]) assumes well-formed rules and never re-checks them.

use crate::model::{ApplyDownLevels, FolderRule, MoveAction, Settings};
use crate::paths::normalize_path;
use crate::tags::{normalize_tag, validate_tag_name, TagValidationError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rules keyed by vault-relative folder path.
pub type FolderRules = BTreeMap<String, FolderRule>;

/// Folder path to the tags that replace its derived folder-name tag.
pub type FolderAliases = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rules must target a folder, not the vault root")]
    RootFolder,

    #[error("{field} for '{folder}' contains level 0 (levels start at 1)")]
    NonPositiveLevel { folder: String, field: &'static str },

    #[error("{field} for '{folder}' lists level {level} more than once")]
    DuplicateLevel {
        folder: String,
        field: &'static str,
        level: u32,
    },

    #[error("apply_down_levels for '{0}' is an empty list (use \"all\" or at least one level)")]
    EmptyApplyDown(String),

    #[error("invalid tag '{tag}': {reason}")]
    InvalidTag {
        tag: String,
        reason: TagValidationError,
    },

    #[error("tag '{tag}' is listed more than once for '{folder}'")]
    DuplicateTag { folder: String, tag: String },

    #[error("alias for '{0}' has no usable tags")]
    EmptyAlias(String),

    #[error("inherit_depth must be at least 1")]
    ZeroInheritDepth,

    #[error("'{0}' cannot be remembered as the default move action")]
    UnrememberableAction(MoveAction),
}

/// Validates a rule before it is stored. Returns the canonical folder key.
pub fn validate_rule(folder: &str, rule: &FolderRule) -> Result<String, ConfigError> {
    let folder = normalize_path(folder);
    if folder.is_empty() {
        return Err(ConfigError::RootFolder);
    }

    check_levels(&folder, "folder_tag_levels", &rule.folder_tag_levels)?;
    if let ApplyDownLevels::Levels(levels) = &rule.apply_down_levels {
        if levels.is_empty() {
            return Err(ConfigError::EmptyApplyDown(folder));
        }
        check_levels(&folder, "apply_down_levels", levels)?;
    }

    let mut seen: Vec<&str> = Vec::new();
    for tag in &rule.tags {
        validate_tag_name(tag).map_err(|reason| ConfigError::InvalidTag {
            tag: tag.clone(),
            reason,
        })?;
        if seen.contains(&tag.as_str()) {
            return Err(ConfigError::DuplicateTag {
                folder,
                tag: tag.clone(),
            });
        }
        seen.push(tag);
    }

    Ok(folder)
}

fn check_levels(folder: &str, field: &'static str, levels: &[u32]) -> Result<(), ConfigError> {
    let mut seen = Vec::new();
    for &level in levels {
        if level == 0 {
            return Err(ConfigError::NonPositiveLevel {
                folder: folder.to_string(),
                field,
            });
        }
        if seen.contains(&level) {
            return Err(ConfigError::DuplicateLevel {
                folder: folder.to_string(),
                field,
                level,
            });
        }
        seen.push(level);
    }
    Ok(())
}

/// Normalizes alias tags; an alias must keep at least one tag.
pub fn validate_alias(folder: &str, tags: &[String]) -> Result<(String, Vec<String>), ConfigError> {
    let folder = normalize_path(folder);
    if folder.is_empty() {
        return Err(ConfigError::RootFolder);
    }
    let mut normalized = Vec::new();
    for tag in tags {
        if let Some(tag) = normalize_tag(tag) {
            if !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }
    }
    if normalized.is_empty() {
        return Err(ConfigError::EmptyAlias(folder));
    }
    Ok((folder, normalized))
}

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.inherit_depth == 0 {
        return Err(ConfigError::ZeroInheritDepth);
    }
    if let Some(action @ MoveAction::Cancel) = settings.remembered_move_action {
        return Err(ConfigError::UnrememberableAction(action));
    }
    for tag in &settings.protected_tags {
        validate_tag_name(tag).map_err(|reason| ConfigError::InvalidTag {
            tag: tag.clone(),
            reason,
        })?;
    }
    Ok(())
}
