//! # Operation History
//!
//! Bounded, append-only log of reversible tag operations.
//!
//! - `record` appends and silently evicts the oldest entry past the limit.
//! - Undo follows strict stack discipline: only the most recent entry can be
//!   undone. Any other id (or one already evicted or undone) is an
//!   [`FolderTagError::UndoConflict`] and changes nothing.
//!
//! The history never touches files. It stores the before/after snapshots the
//! caller computed; replaying them is the command layer's job (see
//! [`crate::commands::undo`]).

use crate::error::{FolderTagError, Result};
use crate::model::{OperationFileState, OperationId, OperationKind, TagOperation};
use chrono::Utc;
use std::collections::VecDeque;
use uuid::Uuid;

pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHistory {
    entries: VecDeque<TagOperation>,
    limit: usize,
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// The limit is clamped to `1..=HISTORY_LIMIT`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.clamp(1, HISTORY_LIMIT),
        }
    }

    /// Rebuilds a history from persisted entries (oldest first), trimming to
    /// the limit.
    pub fn from_entries(entries: Vec<TagOperation>, limit: usize) -> Self {
        let mut history = Self::with_limit(limit);
        history.entries = entries.into();
        history.evict();
        history
    }

    pub fn record(
        &mut self,
        kind: OperationKind,
        description: impl Into<String>,
        files: Vec<OperationFileState>,
    ) -> OperationId {
        let mut timestamp = Utc::now();
        if let Some(last) = self.entries.back() {
            timestamp = timestamp.max(last.timestamp);
        }
        let id = Uuid::new_v4();
        self.entries.push_back(TagOperation {
            id,
            kind,
            description: description.into(),
            timestamp,
            files,
        });
        self.evict();
        id
    }

    fn evict(&mut self) {
        while self.entries.len() > self.limit {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(id = %evicted.id, "evicted oldest operation from history");
            }
        }
    }

    /// Returns the entry if `id` is the most recent one.
    pub fn check_top(&self, id: OperationId) -> Result<&TagOperation> {
        match self.entries.back() {
            Some(top) if top.id == id => Ok(top),
            _ if self.get(id).is_some() => Err(FolderTagError::UndoConflict(format!(
                "operation {} is not the most recent operation",
                id
            ))),
            _ => Err(FolderTagError::UndoConflict(format!(
                "operation {} not found in history",
                id
            ))),
        }
    }

    /// Removes and returns the top entry if it is `id`.
    pub fn pop_top(&mut self, id: OperationId) -> Result<TagOperation> {
        self.check_top(id)?;
        self.entries
            .pop_back()
            .ok_or_else(|| FolderTagError::UndoConflict("history is empty".to_string()))
    }

    pub fn latest(&self) -> Option<&TagOperation> {
        self.entries.back()
    }

    pub fn get(&self, id: OperationId) -> Option<&TagOperation> {
        self.entries.iter().find(|op| op.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TagOperation> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<TagOperation> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_n(history: &mut OperationHistory, n: usize) -> Vec<OperationId> {
        (0..n)
            .map(|i| history.record(OperationKind::Apply, format!("op {}", i), Vec::new()))
            .collect()
    }

    #[test]
    fn test_record_returns_unique_ids() {
        let mut history = OperationHistory::new();
        let ids = record_n(&mut history, 3);
        assert_eq!(history.len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_eq!(history.latest().unwrap().id, ids[2]);
    }

    #[test]
    fn test_eviction_keeps_most_recent_fifty() {
        let mut history = OperationHistory::new();
        let ids = record_n(&mut history, 57);
        assert_eq!(history.len(), HISTORY_LIMIT);

        let kept: Vec<OperationId> = history.iter().map(|op| op.id).collect();
        assert_eq!(kept, ids[7..].to_vec());

        let timestamps: Vec<_> = history.iter().map(|op| op.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(history.get(ids[0]).is_none());
    }

    #[test]
    fn test_pop_top_succeeds_for_latest() {
        let mut history = OperationHistory::new();
        let ids = record_n(&mut history, 2);
        let popped = history.pop_top(ids[1]).unwrap();
        assert_eq!(popped.id, ids[1]);
        assert_eq!(history.latest().unwrap().id, ids[0]);
    }

    #[test]
    fn test_pop_non_top_is_conflict_without_change() {
        let mut history = OperationHistory::new();
        let ids = record_n(&mut history, 2);
        let before = history.clone();

        let err = history.pop_top(ids[0]).unwrap_err();
        assert!(matches!(err, FolderTagError::UndoConflict(_)));
        assert!(err.to_string().contains("not the most recent"));
        assert_eq!(history, before);
    }

    #[test]
    fn test_pop_unknown_or_twice_is_conflict() {
        let mut history = OperationHistory::new();
        let ids = record_n(&mut history, 1);
        history.pop_top(ids[0]).unwrap();

        let err = history.pop_top(ids[0]).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_entries_trims_to_limit() {
        let mut source = OperationHistory::with_limit(10);
        record_n(&mut source, 10);
        let restored = OperationHistory::from_entries(source.to_vec(), 4);
        assert_eq!(restored.len(), 4);
        assert_eq!(restored.latest(), source.latest());
    }

    #[test]
    fn test_limit_never_exceeds_fifty() {
        let mut history = OperationHistory::with_limit(80);
        record_n(&mut history, 60);
        assert_eq!(history.len(), HISTORY_LIMIT);

        let mut history = OperationHistory::with_limit(0);
        record_n(&mut history, 3);
        assert_eq!(history.len(), 1);
    }
}
