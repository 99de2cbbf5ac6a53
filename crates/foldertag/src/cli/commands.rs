//! # CLI Layer
//!
//! Turns parsed arguments into [`TaggerApi`] calls and hands the results to
//! `render`. Responsibilities:
//!
//! 1. **Logging**: install the tracing subscriber
//! 2. **Context Setup**: load [`FolderTagConfig`], open the vault and state
//! 3. **Dispatch**: one match arm per command
//! 4. **Output**: print through `render`

use super::render;
use super::setup::{AliasCommands, Cli, Commands, RuleCommands};
use clap::Parser;
use foldertagapp::api::TaggerApi;
use foldertagapp::classifier::{MoveDecision, RenameEvent};
use foldertagapp::config::FolderTagConfig;
use foldertagapp::error::{FolderTagError, Result};
use foldertagapp::model::{
    ApplyDownLevels, FolderRule, MoveAction, OperationId, WatchEvent,
};
use foldertagapp::store::fs::FsStateStore;
use foldertagapp::vault::fs::FsVault;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

type Api = TaggerApi<FsVault, FsStateStore>;

const LOG_ENV: &str = "FOLDERTAG_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = FolderTagConfig::load(cli.vault.as_deref())?;
    tracing::debug!(vault = %config.vault_root().display(), state = %config.state_file().display(), "opening vault");
    let mut api = TaggerApi::with_config(
        FsVault::new(config.vault_root()),
        FsStateStore::new(config.state_file()),
        &config,
    )?;

    dispatch(&mut api, cli.command)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore a second init (tests may call run twice in one process).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(api: &mut Api, command: Commands) -> Result<()> {
    match command {
        Commands::Resolve { path } => {
            render::print_tags(&path, &api.resolve_tags_for_path(&path));
        }
        Commands::Preview { targets, json } => {
            let result = api.preview_diff(&targets)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.previews)?);
            } else {
                render::print_previews(&result.previews);
                render::print_messages(&result.messages);
            }
        }
        Commands::Apply { targets } => {
            render::print_result(&api.apply_rules(&targets)?);
        }
        Commands::Revert { targets } => {
            render::print_result(&api.revert(&targets)?);
        }
        Commands::Remove { targets, tags } => {
            render::print_result(&api.remove_tags(&targets, &tags)?);
        }
        Commands::Undo { id } => {
            let result = match id {
                Some(id) => {
                    let id = find_operation(api, &id)?;
                    api.undo(id)?
                }
                None => api.undo_last()?,
            };
            render::print_result(&result);
        }
        Commands::History => render::print_history(&api.history()),
        Commands::Rule { action } => handle_rule(api, action)?,
        Commands::Alias { action } => {
            let result = match action {
                AliasCommands::Set { folder, tags } => api.set_alias(&folder, &tags)?,
                AliasCommands::Remove { folder } => api.remove_alias(&folder)?,
            };
            render::print_messages(&result.messages);
        }
        Commands::Settings {
            inherit_depth,
            ignore_paths,
            protected_tags,
            forget_move_action,
        } => {
            if forget_move_action {
                render::print_messages(&api.forget_move_action()?.messages);
            }
            let mut settings = api.settings().clone();
            let mut changed = false;
            if let Some(depth) = inherit_depth {
                settings.inherit_depth = depth;
                changed = true;
            }
            if !ignore_paths.is_empty() {
                settings.ignore_paths = ignore_paths;
                changed = true;
            }
            if !protected_tags.is_empty() {
                settings.protected_tags = protected_tags;
                changed = true;
            }
            if changed {
                render::print_messages(&api.update_settings(settings)?.messages);
            }
            render::print_settings(api.settings());
        }
        Commands::Moved {
            old_path,
            new_path,
            action,
            remember,
            exclude,
        } => {
            let now = Instant::now();
            api.handle_event(
                WatchEvent::Rename {
                    old_path,
                    path: new_path,
                },
                now,
            )?;
            let mut result = api.flush()?;
            if let Some(action) = action {
                let mut decision = MoveDecision::new(MoveAction::from(action)).excluding(exclude);
                if remember {
                    decision = decision.remembered();
                }
                for batch in std::mem::take(&mut result.pending) {
                    result.merge(api.resolve_batch(batch.batch_id, decision.clone())?);
                }
            }
            render::print_result(&result);
            render::print_pending(&result.pending);
        }
        Commands::Created { path } => {
            render::print_result(&api.handle_event(WatchEvent::Create { path }, Instant::now())?);
        }
        Commands::Orphans { purge } => {
            let result = if purge {
                api.purge_orphans()?
            } else {
                api.orphaned_paths()
            };
            render::print_paths(&result.paths);
            render::print_messages(&result.messages);
        }
    }
    Ok(())
}

fn handle_rule(api: &mut Api, action: RuleCommands) -> Result<()> {
    match action {
        RuleCommands::Set {
            folder,
            tags,
            levels,
            apply_down,
            inherit,
            new_files,
        } => {
            let mut rule = FolderRule::new(tags)
                .with_folder_tag_levels(levels)
                .with_apply_down(parse_apply_down(&apply_down)?);
            if inherit {
                rule = rule.inheriting();
            }
            if new_files {
                rule = rule.for_new_files();
            }
            render::print_messages(&api.set_rule(&folder, rule)?.messages);
        }
        RuleCommands::Remove { folder } => {
            render::print_messages(&api.remove_rule(&folder)?.messages);
        }
        RuleCommands::List => render::print_rules(&api.list_rules()),
    }
    Ok(())
}

/// `"all"` or a comma-separated list of levels.
fn parse_apply_down(raw: &str) -> Result<ApplyDownLevels> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(ApplyDownLevels::All);
    }
    raw.split(',')
        .map(|part| {
            part.trim().parse::<u32>().map_err(|_| {
                FolderTagError::Api(format!(
                    "apply-down must be \"all\" or levels like 1,2 (got \"{}\")",
                    raw
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(ApplyDownLevels::Levels)
}

/// Accepts a full operation id or an unambiguous prefix of one.
fn find_operation(api: &Api, needle: &str) -> Result<OperationId> {
    if let Ok(id) = needle.parse::<OperationId>() {
        return Ok(id);
    }
    let matches: Vec<OperationId> = api
        .history()
        .iter()
        .map(|op| op.id)
        .filter(|id| id.to_string().starts_with(needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(FolderTagError::Api(format!("No operation matches {}", needle))),
        _ => Err(FolderTagError::Api(format!(
            "{} matches {} operations, use more characters",
            needle,
            matches.len()
        ))),
    }
}
