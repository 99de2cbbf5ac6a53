//! # API Facade
//!
//! [`TaggerApi`] is the single entry point for every foldertag operation,
//! whatever the UI. It owns the vault, the state store, the in-memory
//! [`Workspace`] and the [`MoveClassifier`], and wires them together:
//!
//! ```text
//! watcher event ─▶ MoveClassifier ─▶ decision ─▶ commands::moves ─┐
//! apply / revert / undo ─────────────────────────▶ commands::*  ──┼─▶ Vault
//!                                                                 └─▶ Workspace ─▶ StateStore
//! ```
//!
//! ## Lifecycle
//!
//! State is loaded once in [`TaggerApi::new`], mutated in memory by the
//! command layer, and saved after every call that may have changed it, even
//! when the call itself failed part-way (a partially applied commit has
//! already updated the ledger for the files it wrote).
//!
//! ## Move Decisions
//!
//! When a move batch is ready the facade resolves it with, in order: the
//! remembered move action from settings, then the configured
//! [`DecisionSource`]. If neither answers, the batch is parked and returned
//! in [`CmdResult::pending`] until [`TaggerApi::resolve_batch`] is called.
//!
//! ## Generic Over Vault and Store
//!
//! - Production: `TaggerApi<FsVault, FsStateStore>`
//! - Testing: `TaggerApi<MemVault, MemStateStore>`

use crate::classifier::{
    ClassifierOutput, DecisionSource, DeferredDecisions, MoveClassifier, MoveDecision,
    PendingMoveOperation, RenameEvent,
};
use crate::commands::{self, CmdMessage, CmdResult, FileDiff};
use crate::config::FolderTagConfig;
use crate::error::Result;
use crate::history::HISTORY_LIMIT;
use crate::model::{FolderRule, OperationId, OperationKind, Settings, TagOperation, WatchEvent};
use crate::store::StateStore;
use crate::vault::Vault;
use crate::workspace::Workspace;
use std::time::Instant;

pub struct TaggerApi<V: Vault, S: StateStore> {
    vault: V,
    store: S,
    workspace: Workspace,
    classifier: MoveClassifier,
    decisions: Box<dyn DecisionSource>,
}

impl<V: Vault, S: StateStore> TaggerApi<V, S> {
    /// Loads state from `store` with default timing and history limit.
    pub fn new(vault: V, store: S) -> Result<Self> {
        Self::build(vault, store, HISTORY_LIMIT, MoveClassifier::new())
    }

    pub fn with_config(vault: V, store: S, config: &FolderTagConfig) -> Result<Self> {
        let classifier = MoveClassifier::with_windows(config.debounce(), config.batch_window());
        Self::build(vault, store, config.history_limit, classifier)
    }

    fn build(vault: V, store: S, history_limit: usize, classifier: MoveClassifier) -> Result<Self> {
        let state = store.load()?;
        Ok(Self {
            vault,
            store,
            workspace: Workspace::from_persisted(state, history_limit),
            classifier,
            decisions: Box::new(DeferredDecisions),
        })
    }

    pub fn with_decision_source(mut self, source: Box<dyn DecisionSource>) -> Self {
        self.decisions = source;
        self
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn settings(&self) -> &Settings {
        &self.workspace.settings
    }

    fn save(&mut self) -> Result<()> {
        self.store.save(&self.workspace.to_persisted())
    }

    /// Saves, then hands back `result`. A command error wins over a save
    /// error.
    fn persist<T>(&mut self, result: Result<T>) -> Result<T> {
        let saved = self.save();
        let value = result?;
        saved?;
        Ok(value)
    }

    // --- Resolution & preview ---

    pub fn resolve_tags_for_path(&self, path: &str) -> Vec<String> {
        self.workspace.tagger().resolve(path)
    }

    pub fn preview_diff(&self, paths: &[String]) -> Result<CmdResult> {
        commands::preview::run(&self.workspace, &self.vault, paths)
    }

    // --- Mutation ---

    pub fn commit(
        &mut self,
        kind: OperationKind,
        description: &str,
        diffs: &[FileDiff],
    ) -> Result<CmdResult> {
        let result = commands::commit::commit(
            &mut self.workspace,
            &mut self.vault,
            kind,
            description,
            diffs,
        );
        self.persist(result)
    }

    pub fn apply_rules(&mut self, paths: &[String]) -> Result<CmdResult> {
        let result = commands::commit::apply_rules(&mut self.workspace, &mut self.vault, paths);
        self.persist(result)
    }

    pub fn revert(&mut self, paths: &[String]) -> Result<CmdResult> {
        let result = commands::commit::revert(&mut self.workspace, &mut self.vault, paths);
        self.persist(result)
    }

    pub fn remove_tags(&mut self, paths: &[String], tags: &[String]) -> Result<CmdResult> {
        let result =
            commands::commit::remove_tags(&mut self.workspace, &mut self.vault, paths, tags);
        self.persist(result)
    }

    pub fn undo(&mut self, id: OperationId) -> Result<CmdResult> {
        let result = commands::undo::run(&mut self.workspace, &mut self.vault, id);
        self.persist(result)
    }

    pub fn undo_last(&mut self) -> Result<CmdResult> {
        let result = commands::undo::run_last(&mut self.workspace, &mut self.vault);
        self.persist(result)
    }

    /// Most recent first.
    pub fn history(&self) -> Vec<TagOperation> {
        self.workspace.history.iter().rev().cloned().collect()
    }

    // --- Watcher events ---

    /// Feeds one watcher event in at `now` and processes whatever timers
    /// are due.
    pub fn handle_event(&mut self, event: WatchEvent, now: Instant) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match event {
            WatchEvent::Create { path } => {
                let created = commands::moves::on_create(&mut self.workspace, &mut self.vault, &path);
                result.merge(self.persist(created)?);
            }
            WatchEvent::Rename { old_path, path } => {
                self.submit_move_event(RenameEvent::new(old_path, path), now);
            }
        }
        result.merge(self.advance(now)?);
        Ok(result)
    }

    pub fn submit_move_event(&mut self, event: RenameEvent, now: Instant) {
        self.classifier.submit(event, now);
    }

    /// Fires due timers and acts on renames and ready batches.
    pub fn advance(&mut self, now: Instant) -> Result<CmdResult> {
        let outputs = self.classifier.advance(now);
        self.process(outputs)
    }

    /// Fires every pending timer now, regardless of deadline.
    pub fn flush(&mut self) -> Result<CmdResult> {
        let outputs = self.classifier.drain();
        self.process(outputs)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.classifier.next_deadline()
    }

    /// Handles every output even when one batch fails; the first error is
    /// returned after the rest have been applied and saved.
    fn process(&mut self, outputs: Vec<ClassifierOutput>) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        let mut dirty = false;
        let mut first_error = None;
        for output in outputs {
            match output {
                ClassifierOutput::Renamed(event) => {
                    result.merge(commands::moves::on_rename(&mut self.workspace, &event));
                    dirty = true;
                }
                ClassifierOutput::BatchReady(batch) => {
                    let decision = match self.workspace.settings.remembered_move_action {
                        Some(action) => Some(MoveDecision::new(action)),
                        None => self.decisions.decide(&batch),
                    };
                    match decision {
                        Some(decision) => match self.resolve_batch(batch.batch_id, decision) {
                            Ok(resolved) => result.merge(resolved),
                            Err(e) => {
                                tracing::warn!(batch = batch.batch_id, error = %e, "move batch failed");
                                first_error.get_or_insert(e);
                            }
                        },
                        None => {
                            result.add_message(CmdMessage::info(format!(
                                "{} moved file(s) awaiting a decision (batch {})",
                                batch.moves.len(),
                                batch.batch_id
                            )));
                            result.pending.push(batch);
                        }
                    }
                }
            }
        }
        let saved = if dirty { self.save() } else { Ok(()) };
        if let Some(e) = first_error {
            return Err(e);
        }
        saved?;
        Ok(result)
    }

    /// Applies a decision to a parked move batch. If applying fails the
    /// batch stays parked, so the same call can be retried.
    pub fn resolve_batch(&mut self, batch_id: u64, decision: MoveDecision) -> Result<CmdResult> {
        let parked = self.classifier.awaiting_batch(batch_id).cloned();
        let resolved = self.classifier.resolve(batch_id, &decision)?;
        let result = commands::moves::apply_resolved(
            &mut self.workspace,
            &mut self.vault,
            &mut self.classifier,
            &resolved,
        );
        if let (Err(_), Some(batch)) = (&result, parked) {
            self.classifier.restore(batch);
        }
        self.persist(result)
    }

    pub fn pending_batches(&self) -> Vec<&PendingMoveOperation> {
        self.classifier.awaiting().collect()
    }

    // --- Rules & settings ---

    pub fn set_rule(&mut self, folder: &str, rule: FolderRule) -> Result<CmdResult> {
        let result = commands::rules::set_rule(&mut self.workspace, folder, rule);
        self.persist(result)
    }

    pub fn remove_rule(&mut self, folder: &str) -> Result<CmdResult> {
        let result = commands::rules::remove_rule(&mut self.workspace, folder);
        self.persist(result)
    }

    pub fn list_rules(&self) -> CmdResult {
        commands::rules::list_rules(&self.workspace)
    }

    pub fn set_alias(&mut self, folder: &str, tags: &[String]) -> Result<CmdResult> {
        let result = commands::rules::set_alias(&mut self.workspace, folder, tags);
        self.persist(result)
    }

    pub fn remove_alias(&mut self, folder: &str) -> Result<CmdResult> {
        let result = commands::rules::remove_alias(&mut self.workspace, folder);
        self.persist(result)
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<CmdResult> {
        let result = commands::rules::update_settings(&mut self.workspace, settings);
        self.persist(result)
    }

    pub fn forget_move_action(&mut self) -> Result<CmdResult> {
        let result = commands::rules::forget_move_action(&mut self.workspace);
        self.persist(Ok(result))
    }

    // --- Orphans ---

    pub fn orphaned_paths(&self) -> CmdResult {
        commands::orphans::list(&self.workspace, &self.vault)
    }

    pub fn purge_orphans(&mut self) -> Result<CmdResult> {
        let result = commands::orphans::purge(&mut self.workspace, &self.vault);
        self.persist(Ok(result))
    }
}
