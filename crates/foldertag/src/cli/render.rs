//! Terminal output. Every function takes plain data from a `CmdResult` and
//! prints it; formatting is kept in `format_*` helpers so it can be tested
//! without capturing stdout.

use chrono::{DateTime, Local, Utc};
use colored::*;
use foldertagapp::classifier::PendingMoveOperation;
use foldertagapp::commands::{CmdMessage, CmdResult, FilePreview, MessageLevel};
use foldertagapp::model::{ApplyDownLevels, FolderRule, Settings, TagOperation};

const SHORT_ID: usize = 8;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// Changed files first, then messages.
pub fn print_result(result: &CmdResult) {
    for file in &result.affected {
        println!(
            "{} {}",
            file.path.bold(),
            format_change(&file.tags_before, &file.tags_after)
        );
    }
    for folder in &result.paths {
        println!("{} {}", "removed".dimmed(), folder);
    }
    print_messages(&result.messages);
}

pub fn print_tags(path: &str, tags: &[String]) {
    if tags.is_empty() {
        println!("{} {}", path.bold(), "(no tags)".dimmed());
    } else {
        println!("{} {}", path.bold(), format_tags(tags).cyan());
    }
}

pub fn print_previews(previews: &[FilePreview]) {
    for preview in previews {
        println!("{}", preview.path.bold());
        for level in &preview.tags_by_level {
            println!(
                "  {:<24} {}",
                level.folder.dimmed(),
                format_tags(&level.tags)
            );
        }
        if preview.to_add.is_empty() {
            println!("  {}", "up to date".dimmed());
        } else {
            println!("  {} {}", "+".green(), format_tags(&preview.to_add).green());
        }
    }
}

pub fn print_history(operations: &[TagOperation]) {
    if operations.is_empty() {
        println!("{}", "No operations to undo".dimmed());
        return;
    }
    for op in operations {
        println!("{}", format_operation(op));
    }
}

pub fn print_rules(result: &CmdResult) {
    if result.rules.is_empty() && result.aliases.is_empty() {
        println!("{}", "No rules yet. Add one with `foldertag rule set`.".dimmed());
        return;
    }
    for (folder, rule) in &result.rules {
        println!("{} {}", folder.bold(), format_rule(rule));
    }
    if !result.aliases.is_empty() {
        println!();
        for (folder, tags) in &result.aliases {
            println!("{} {} {}", folder.bold(), "→".dimmed(), format_tags(tags));
        }
    }
}

pub fn print_settings(settings: &Settings) {
    println!("{:<22} {}", "inherit depth", settings.inherit_depth);
    println!(
        "{:<22} {}",
        "ignored paths",
        join_or_none(&settings.ignore_paths)
    );
    println!(
        "{:<22} {}",
        "protected tags",
        join_or_none(&settings.protected_tags)
    );
    println!(
        "{:<22} {}",
        "remembered move action",
        settings
            .remembered_move_action
            .map(|a| a.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
}

pub fn print_pending(batches: &[PendingMoveOperation]) {
    for batch in batches {
        println!(
            "{}",
            format!("Batch {} needs a decision:", batch.batch_id).yellow()
        );
        for m in &batch.moves {
            println!("  {} {} {}", m.from, "→".dimmed(), m.to);
        }
        println!(
            "{}",
            "Re-run with --action continue|leave|cancel".dimmed()
        );
    }
}

pub fn print_paths(paths: &[String]) {
    for path in paths {
        println!("{}", path);
    }
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// `+added -removed`, plain text.
fn format_change(before: &[String], after: &[String]) -> String {
    let added = after.iter().filter(|t| !before.contains(t)).map(|t| format!("+{}", t));
    let removed = before.iter().filter(|t| !after.contains(t)).map(|t| format!("-{}", t));
    added.chain(removed).collect::<Vec<_>>().join(" ")
}

fn format_rule(rule: &FolderRule) -> String {
    let mut parts = vec![format_tags(&rule.tags)];
    if !rule.folder_tag_levels.is_empty() {
        let levels: Vec<String> = rule.folder_tag_levels.iter().map(u32::to_string).collect();
        parts.push(format!("names@{}", levels.join(",")));
    }
    if let ApplyDownLevels::Levels(levels) = &rule.apply_down_levels {
        let levels: Vec<String> = levels.iter().map(u32::to_string).collect();
        parts.push(format!("down@{}", levels.join(",")));
    }
    if rule.inherit_from_ancestors {
        parts.push("inherit".to_string());
    }
    if rule.apply_to_new_files {
        parts.push("new-files".to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts.join("  ")
}

fn format_operation(op: &TagOperation) -> String {
    let id = op.id.to_string();
    format!(
        "{}  {:<7} {}  {} ({} file{})",
        id[..SHORT_ID].to_string().yellow(),
        op.kind.label(),
        format_time(op.timestamp).dimmed(),
        op.description,
        op.files.len(),
        if op.files.len() == 1 { "" } else { "s" }
    )
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
