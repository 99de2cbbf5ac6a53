//! Rule, alias and settings management.
//!
//! Everything is validated on the way in; stored rules are trusted. Changing
//! a rule never retags existing files by itself; run apply for that.

use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{FolderRule, Settings};
use crate::paths::normalize_path;
use crate::rules::{validate_alias, validate_rule, validate_settings};
use crate::workspace::Workspace;
use chrono::Utc;

pub fn set_rule(ws: &mut Workspace, folder: &str, mut rule: FolderRule) -> Result<CmdResult> {
    let folder = validate_rule(folder, &rule)?;
    let now = Utc::now();
    let message = match ws.rules.get(&folder) {
        Some(existing) => {
            rule.created_at = existing.created_at;
            format!("Updated rule for {}", folder)
        }
        None => format!("Added rule for {}", folder),
    };
    rule.updated_at = now;
    ws.rules.insert(folder, rule);
    Ok(CmdResult::default().with_message(CmdMessage::success(message)))
}

pub fn remove_rule(ws: &mut Workspace, folder: &str) -> Result<CmdResult> {
    let folder = normalize_path(folder);
    let message = match ws.rules.remove(&folder) {
        Some(_) => CmdMessage::success(format!("Removed rule for {}", folder)),
        None => CmdMessage::warning(format!("No rule for {}", folder)),
    };
    Ok(CmdResult::default().with_message(message))
}

pub fn list_rules(ws: &Workspace) -> CmdResult {
    CmdResult {
        rules: ws
            .rules
            .iter()
            .map(|(folder, rule)| (folder.clone(), rule.clone()))
            .collect(),
        aliases: ws
            .aliases
            .iter()
            .map(|(folder, tags)| (folder.clone(), tags.clone()))
            .collect(),
        ..Default::default()
    }
}

pub fn set_alias(ws: &mut Workspace, folder: &str, tags: &[String]) -> Result<CmdResult> {
    let (folder, tags) = validate_alias(folder, tags)?;
    let message = format!("{} now tags as {}", folder, tags.join(", "));
    ws.aliases.insert(folder, tags);
    Ok(CmdResult::default().with_message(CmdMessage::success(message)))
}

pub fn remove_alias(ws: &mut Workspace, folder: &str) -> Result<CmdResult> {
    let folder = normalize_path(folder);
    let message = match ws.aliases.remove(&folder) {
        Some(_) => CmdMessage::success(format!("Removed alias for {}", folder)),
        None => CmdMessage::warning(format!("No alias for {}", folder)),
    };
    Ok(CmdResult::default().with_message(message))
}

pub fn update_settings(ws: &mut Workspace, settings: Settings) -> Result<CmdResult> {
    validate_settings(&settings)?;
    ws.settings = settings;
    Ok(CmdResult::default().with_message(CmdMessage::success("Settings updated")))
}

pub fn forget_move_action(ws: &mut Workspace) -> CmdResult {
    match ws.settings.remembered_move_action.take() {
        Some(action) => CmdResult::default().with_message(CmdMessage::success(format!(
            "Forgot remembered move action '{}'",
            action
        ))),
        None => CmdResult::default().with_message(CmdMessage::info("No move action remembered")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolderTagError;
    use crate::model::MoveAction;
    use crate::rules::ConfigError;

    #[test]
    fn test_set_rule_keeps_created_at_on_update() {
        let mut ws = Workspace::default();
        set_rule(&mut ws, "Work/", FolderRule::new(["work"])).unwrap();
        let created = ws.rules["Work"].created_at;

        set_rule(&mut ws, "Work", FolderRule::new(["job"])).unwrap();
        assert_eq!(ws.rules.len(), 1);
        assert_eq!(ws.rules["Work"].tags, vec!["job"]);
        assert_eq!(ws.rules["Work"].created_at, created);
        assert!(ws.rules["Work"].updated_at >= created);
    }

    #[test]
    fn test_invalid_rule_is_rejected_and_not_stored() {
        let mut ws = Workspace::default();
        let err = set_rule(
            &mut ws,
            "Work",
            FolderRule::new(["work"]).with_folder_tag_levels(vec![0]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FolderTagError::Config(ConfigError::NonPositiveLevel { .. })
        ));
        assert!(ws.rules.is_empty());
    }

    #[test]
    fn test_remove_missing_rule_warns() {
        let mut ws = Workspace::default();
        let result = remove_rule(&mut ws, "Nope").unwrap();
        assert_eq!(result.messages[0].level, crate::commands::MessageLevel::Warning);
    }

    #[test]
    fn test_alias_round_trip() {
        let mut ws = Workspace::default();
        set_alias(&mut ws, "Work", &["Job".to_string()]).unwrap();
        assert_eq!(ws.aliases["Work"], vec!["job"]);
        remove_alias(&mut ws, "Work").unwrap();
        assert!(ws.aliases.is_empty());
    }

    #[test]
    fn test_settings_validation_and_forget() {
        let mut ws = Workspace::default();
        let bad = Settings {
            remembered_move_action: Some(MoveAction::Cancel),
            ..Default::default()
        };
        assert!(update_settings(&mut ws, bad).is_err());

        let good = Settings {
            remembered_move_action: Some(MoveAction::Continue),
            ..Default::default()
        };
        update_settings(&mut ws, good).unwrap();
        forget_move_action(&mut ws);
        assert!(ws.settings.remembered_move_action.is_none());
    }

    #[test]
    fn test_list_rules() {
        let mut ws = Workspace::default();
        set_rule(&mut ws, "B", FolderRule::new(["b"])).unwrap();
        set_rule(&mut ws, "A", FolderRule::new(["a"])).unwrap();
        let result = list_rules(&ws);
        let folders: Vec<&str> = result.rules.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(folders, vec!["A", "B"]);
    }
}
