//! # Move Classifier
//!
//! Turns the watcher's raw two-path rename notifications into either a plain
//! *rename* (same folder, new basename) or a *move* (different folder), and
//! groups moves that happen close together into one batch that needs a
//! single decision.
//!
//! ## Pipeline
//!
//! ```text
//! submit(event) ──debounce 100ms per destination──▶ classify
//!                                                    │
//!                         rename ◀───────────────────┤
//!                                                    ▼
//!                         open batch (300ms from first move) ──▶ BatchReady
//!                                                                   │
//!                               resolve(batch_id, decision) ◀───────┘
//! ```
//!
//! - **Debounce** is keyed by destination path. A newer notification for the
//!   same destination replaces the pending one and re-arms the timer. A
//!   notification whose source is a pending destination chains onto it, so
//!   `a→b` followed by `b→c` is seen as `a→c`.
//! - **Batching** is by classification time: a move joins the open batch if
//!   its debounce fired no later than `opened_at + window`. The batch timer
//!   fires at exactly that instant. At equal deadlines debounce timers fire
//!   before batch timers, so a move landing on the boundary still joins.
//! - **Suppression**: renames the engine performs itself (undoing a move)
//!   are registered with [`MoveClassifier::suppress`] and swallowed once.
//!
//! Nothing here reads the clock. Callers pass `now` to
//! [`MoveClassifier::submit`] and [`MoveClassifier::advance`].

use crate::error::{FolderTagError, Result};
use crate::model::{MoveAction, MovedPath};
use crate::paths::{self, normalize_path};
use crate::rules::ConfigError;
use crate::timers::Timers;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEBOUNCE: Duration = Duration::from_millis(100);
pub const BATCH_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEvent {
    pub old_path: String,
    pub new_path: String,
}

impl RenameEvent {
    pub fn new(old_path: impl AsRef<str>, new_path: impl AsRef<str>) -> Self {
        Self {
            old_path: normalize_path(old_path.as_ref()),
            new_path: normalize_path(new_path.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Move,
    Rename,
}

/// Folder changed means move, even when the basename changed too. Identical
/// paths classify as nothing.
pub fn classify(event: &RenameEvent) -> Option<MoveKind> {
    let old = normalize_path(&event.old_path);
    let new = normalize_path(&event.new_path);
    if old == new {
        None
    } else if paths::parent(&old) != paths::parent(&new) {
        Some(MoveKind::Move)
    } else {
        Some(MoveKind::Rename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKey {
    Debounce(String),
    Batch(u64),
}

/// Moves collected into one batch, waiting for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMoveOperation {
    pub batch_id: u64,
    pub moves: Vec<MovedPath>,
    pub opened_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDecision {
    pub action: MoveAction,
    /// Destination (or source) paths to leave out of the action.
    pub excluded_paths: Vec<String>,
    /// Persist `action` as the default for future batches.
    pub remember: bool,
}

impl MoveDecision {
    pub fn new(action: MoveAction) -> Self {
        Self {
            action,
            excluded_paths: Vec::new(),
            remember: false,
        }
    }

    pub fn excluding<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_paths
            .extend(paths.into_iter().map(|p| normalize_path(p.as_ref())));
        self
    }

    pub fn remembered(mut self) -> Self {
        self.remember = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierOutput {
    Renamed(RenameEvent),
    BatchReady(PendingMoveOperation),
}

/// A batch with its decision applied: which moves to act on and which to
/// leave alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    pub batch_id: u64,
    pub action: MoveAction,
    pub moves: Vec<MovedPath>,
    pub excluded: Vec<MovedPath>,
    pub remember: bool,
}

/// Supplies decisions for ready batches. Returning `None` defers: the batch
/// stays parked until [`MoveClassifier::resolve`] is called.
pub trait DecisionSource {
    fn decide(&mut self, batch: &PendingMoveOperation) -> Option<MoveDecision>;
}

/// Always defers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredDecisions;

impl DecisionSource for DeferredDecisions {
    fn decide(&mut self, _batch: &PendingMoveOperation) -> Option<MoveDecision> {
        None
    }
}

/// Answers every batch with the same decision.
#[derive(Debug, Clone)]
pub struct FixedDecision(pub MoveDecision);

impl DecisionSource for FixedDecision {
    fn decide(&mut self, _batch: &PendingMoveOperation) -> Option<MoveDecision> {
        Some(self.0.clone())
    }
}

#[derive(Debug)]
pub struct MoveClassifier {
    debounce: Duration,
    window: Duration,
    timers: Timers<TimerKey>,
    pending: BTreeMap<String, RenameEvent>,
    open_batch: Option<PendingMoveOperation>,
    awaiting: BTreeMap<u64, PendingMoveOperation>,
    suppressed: Vec<RenameEvent>,
    next_batch_id: u64,
}

impl Default for MoveClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveClassifier {
    pub fn new() -> Self {
        Self::with_windows(DEBOUNCE, BATCH_WINDOW)
    }

    pub fn with_windows(debounce: Duration, window: Duration) -> Self {
        Self {
            debounce,
            window,
            timers: Timers::new(),
            pending: BTreeMap::new(),
            open_batch: None,
            awaiting: BTreeMap::new(),
            suppressed: Vec::new(),
            next_batch_id: 1,
        }
    }

    /// Accepts a raw rename notification received at `now`.
    pub fn submit(&mut self, event: RenameEvent, now: Instant) {
        let mut event = RenameEvent::new(&event.old_path, &event.new_path);

        if let Some(idx) = self.suppressed.iter().position(|s| *s == event) {
            self.suppressed.remove(idx);
            tracing::debug!(from = %event.old_path, to = %event.new_path, "suppressed self-inflicted rename");
            return;
        }

        if let Some(prior) = self.pending.remove(&event.old_path) {
            self.timers
                .cancel(&TimerKey::Debounce(event.old_path.clone()));
            tracing::debug!(
                from = %prior.old_path,
                via = %event.old_path,
                to = %event.new_path,
                "chained rename onto pending notification"
            );
            event.old_path = prior.old_path;
        }

        let key = event.new_path.clone();
        if self.pending.insert(key.clone(), event).is_some() {
            tracing::debug!(path = %key, "superseded pending notification");
        }
        self.timers
            .arm(TimerKey::Debounce(key), now + self.debounce);
    }

    /// Registers a rename the engine is about to perform so its echo from
    /// the watcher is ignored.
    pub fn suppress(&mut self, event: RenameEvent) {
        self.suppressed
            .push(RenameEvent::new(&event.old_path, &event.new_path));
    }

    /// Fires every timer due at `now`, in deadline order.
    pub fn advance(&mut self, now: Instant) -> Vec<ClassifierOutput> {
        let mut out = Vec::new();
        while let Some((key, fired_at)) = self.timers.pop_due(now) {
            match key {
                TimerKey::Debounce(dest) => {
                    if let Some(event) = self.pending.remove(&dest) {
                        self.flush_event(event, fired_at, &mut out);
                    }
                }
                TimerKey::Batch(id) => {
                    if self.open_batch.as_ref().map(|b| b.batch_id) == Some(id) {
                        self.close_batch(&mut out);
                    }
                }
            }
        }
        out
    }

    /// Fires every armed timer regardless of its deadline.
    pub fn drain(&mut self) -> Vec<ClassifierOutput> {
        let mut out = Vec::new();
        while let Some(deadline) = self.timers.next_deadline() {
            out.extend(self.advance(deadline));
        }
        out
    }

    fn flush_event(&mut self, event: RenameEvent, fired_at: Instant, out: &mut Vec<ClassifierOutput>) {
        match classify(&event) {
            None => {
                tracing::debug!(path = %event.new_path, "rename returned to its origin; dropped");
            }
            Some(MoveKind::Rename) => {
                tracing::debug!(from = %event.old_path, to = %event.new_path, "classified as rename");
                out.push(ClassifierOutput::Renamed(event));
            }
            Some(MoveKind::Move) => {
                tracing::debug!(from = %event.old_path, to = %event.new_path, "classified as move");
                self.add_move(event, fired_at, out);
            }
        }
    }

    fn add_move(&mut self, event: RenameEvent, fired_at: Instant, out: &mut Vec<ClassifierOutput>) {
        let expired = self
            .open_batch
            .as_ref()
            .is_some_and(|b| fired_at > b.opened_at + self.window);
        if expired {
            self.close_batch(out);
        }

        if self.open_batch.is_none() {
            let batch_id = self.next_batch_id;
            self.next_batch_id += 1;
            self.timers
                .arm(TimerKey::Batch(batch_id), fired_at + self.window);
            self.open_batch = Some(PendingMoveOperation {
                batch_id,
                moves: Vec::new(),
                opened_at: fired_at,
            });
        }

        let Some(batch) = self.open_batch.as_mut() else {
            return;
        };
        // A file moved twice inside one batch keeps a single entry.
        if let Some(idx) = batch.moves.iter().position(|m| m.to == event.old_path) {
            if batch.moves[idx].from == event.new_path {
                batch.moves.remove(idx);
            } else {
                batch.moves[idx].to = event.new_path;
            }
            return;
        }
        batch.moves.push(MovedPath {
            from: event.old_path,
            to: event.new_path,
        });
    }

    fn close_batch(&mut self, out: &mut Vec<ClassifierOutput>) {
        let Some(batch) = self.open_batch.take() else {
            return;
        };
        self.timers.cancel(&TimerKey::Batch(batch.batch_id));
        if batch.moves.is_empty() {
            return;
        }
        tracing::debug!(batch = batch.batch_id, moves = batch.moves.len(), "move batch ready");
        self.awaiting.insert(batch.batch_id, batch.clone());
        out.push(ClassifierOutput::BatchReady(batch));
    }

    /// Applies `decision` to a parked batch and releases it.
    pub fn resolve(&mut self, batch_id: u64, decision: &MoveDecision) -> Result<ResolvedMove> {
        if decision.remember && decision.action == MoveAction::Cancel {
            return Err(ConfigError::UnrememberableAction(decision.action).into());
        }
        let batch = self
            .awaiting
            .remove(&batch_id)
            .ok_or(FolderTagError::BatchNotFound(batch_id))?;

        let excluded_paths: Vec<String> = decision
            .excluded_paths
            .iter()
            .map(|p| normalize_path(p))
            .collect();
        let (excluded, moves): (Vec<MovedPath>, Vec<MovedPath>) =
            batch.moves.into_iter().partition(|m| {
                excluded_paths
                    .iter()
                    .any(|p| *p == m.to || *p == m.from)
            });

        Ok(ResolvedMove {
            batch_id,
            action: decision.action,
            moves,
            excluded,
            remember: decision.remember,
        })
    }

    /// Parks `batch` again, e.g. after its resolution could not be applied.
    pub fn restore(&mut self, batch: PendingMoveOperation) {
        tracing::debug!(batch = batch.batch_id, "move batch back to awaiting a decision");
        self.awaiting.insert(batch.batch_id, batch);
    }

    /// Batches handed over for a decision and not yet resolved.
    pub fn awaiting(&self) -> impl Iterator<Item = &PendingMoveOperation> {
        self.awaiting.values()
    }

    pub fn awaiting_batch(&self, batch_id: u64) -> Option<&PendingMoveOperation> {
        self.awaiting.get(&batch_id)
    }

    /// True while any debounce or batch timer is armed.
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn batches(out: &[ClassifierOutput]) -> Vec<&PendingMoveOperation> {
        out.iter()
            .filter_map(|o| match o {
                ClassifierOutput::BatchReady(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_classify_move_vs_rename() {
        assert_eq!(
            classify(&RenameEvent::new("A/x.md", "B/x.md")),
            Some(MoveKind::Move)
        );
        assert_eq!(
            classify(&RenameEvent::new("A/x.md", "A/y.md")),
            Some(MoveKind::Rename)
        );
        assert_eq!(
            classify(&RenameEvent::new("A/x.md", "B/y.md")),
            Some(MoveKind::Move)
        );
        assert_eq!(classify(&RenameEvent::new("A/x.md", "A/x.md")), None);
    }

    #[test]
    fn test_rename_emitted_after_debounce() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "A/y.md"), t0);
        assert!(classifier.advance(t0 + ms(99)).is_empty());

        let out = classifier.advance(t0 + ms(100));
        assert_eq!(
            out,
            vec![ClassifierOutput::Renamed(RenameEvent::new("A/x.md", "A/y.md"))]
        );
        assert!(!classifier.has_pending());
    }

    #[test]
    fn test_moves_50ms_apart_share_one_batch() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("A/y.md", "B/y.md"), t0 + ms(50));

        let out = classifier.advance(t0 + ms(1000));
        let ready = batches(&out);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].moves.len(), 2);
        assert_eq!(classifier.awaiting().count(), 1);
    }

    #[test]
    fn test_moves_400ms_apart_get_separate_batches() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("A/y.md", "B/y.md"), t0 + ms(400));

        let out = classifier.advance(t0 + ms(2000));
        let ready = batches(&out);
        assert_eq!(ready.len(), 2);
        assert_ne!(ready[0].batch_id, ready[1].batch_id);
        assert_eq!(ready[0].moves[0].from, "A/x.md");
        assert_eq!(ready[1].moves[0].from, "A/y.md");
    }

    #[test]
    fn test_mixed_stream_splits_at_window() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("A/y.md", "B/y.md"), t0 + ms(50));
        classifier.submit(RenameEvent::new("A/z.md", "B/z.md"), t0 + ms(400));

        let out = classifier.advance(t0 + ms(2000));
        let sizes: Vec<usize> = batches(&out).iter().map(|b| b.moves.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(batches(&out)[1].moves[0].from, "A/z.md");
    }

    #[test]
    fn test_batch_fires_at_window_end() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        // Debounce fires at 100ms, batch opens then and closes at 400ms.
        assert!(batches(&classifier.advance(t0 + ms(399))).is_empty());
        assert_eq!(batches(&classifier.advance(t0 + ms(400))).len(), 1);
    }

    #[test]
    fn test_newer_notification_supersedes_pending() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("C/x.md", "B/x.md"), t0 + ms(80));
        // The first timer was re-armed: nothing at 100ms.
        assert!(classifier.advance(t0 + ms(150)).is_empty());

        let out = classifier.advance(t0 + ms(1000));
        let ready = batches(&out);
        assert_eq!(ready.len(), 1);
        assert_eq!(
            ready[0].moves,
            vec![MovedPath {
                from: "C/x.md".into(),
                to: "B/x.md".into()
            }]
        );
    }

    #[test]
    fn test_chained_notifications_collapse() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("B/x.md", "C/x.md"), t0 + ms(20));
        let out = classifier.drain();
        let ready = batches(&out);
        assert_eq!(ready[0].moves.len(), 1);
        assert_eq!(ready[0].moves[0].from, "A/x.md");
        assert_eq!(ready[0].moves[0].to, "C/x.md");
    }

    #[test]
    fn test_round_trip_rename_is_dropped() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("B/x.md", "A/x.md"), t0 + ms(20));
        assert!(classifier.drain().is_empty());
        assert_eq!(classifier.awaiting().count(), 0);
    }

    #[test]
    fn test_suppressed_event_is_swallowed_once() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.suppress(RenameEvent::new("B/x.md", "A/x.md"));
        classifier.submit(RenameEvent::new("B/x.md", "A/x.md"), t0);
        assert!(!classifier.has_pending());

        classifier.submit(RenameEvent::new("B/x.md", "A/x.md"), t0);
        assert!(classifier.has_pending());
    }

    #[test]
    fn test_resolve_partitions_exclusions() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        classifier.submit(RenameEvent::new("A/y.md", "B/y.md"), t0);
        let out = classifier.drain();
        let batch_id = batches(&out)[0].batch_id;

        let decision = MoveDecision::new(MoveAction::Continue).excluding(["B/y.md"]);
        let resolved = classifier.resolve(batch_id, &decision).unwrap();
        assert_eq!(resolved.moves.len(), 1);
        assert_eq!(resolved.moves[0].to, "B/x.md");
        assert_eq!(resolved.excluded[0].to, "B/y.md");

        let err = classifier.resolve(batch_id, &decision).unwrap_err();
        assert!(matches!(err, FolderTagError::BatchNotFound(id) if id == batch_id));
    }

    #[test]
    fn test_remembering_cancel_is_rejected_without_consuming_batch() {
        let t0 = Instant::now();
        let mut classifier = MoveClassifier::new();
        classifier.submit(RenameEvent::new("A/x.md", "B/x.md"), t0);
        let out = classifier.drain();
        let batch_id = batches(&out)[0].batch_id;

        let decision = MoveDecision::new(MoveAction::Cancel).remembered();
        assert!(matches!(
            classifier.resolve(batch_id, &decision),
            Err(FolderTagError::Config(_))
        ));
        assert!(classifier.awaiting_batch(batch_id).is_some());
    }

    #[test]
    fn test_decision_sources() {
        let batch = PendingMoveOperation {
            batch_id: 1,
            moves: Vec::new(),
            opened_at: Instant::now(),
        };
        assert!(DeferredDecisions.decide(&batch).is_none());
        let mut fixed = FixedDecision(MoveDecision::new(MoveAction::Leave));
        assert_eq!(fixed.decide(&batch).unwrap().action, MoveAction::Leave);
    }
}
