//! # Provenance Ledger
//!
//! Records which tags on which file were put there by this engine. The ledger
//! is the *only* authority for removal: a tag that is not tracked here is a
//! manual tag and no code path ever removes it. Protected tags are excluded
//! from every removal computation but may still be added.
//!
//! An entry exists only while it holds at least one auto-tag; updating an
//! entry to the empty set deletes it.

use crate::model::TrackingEntry;
use crate::tags::normalize_tag;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tags to add to and remove from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceLedger {
    entries: BTreeMap<String, TrackingEntry>,
}

impl ProvenanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&TrackingEntry> {
        self.entries.get(path)
    }

    /// Auto-tags tracked for `path` (empty when untracked).
    pub fn auto_tags(&self, path: &str) -> BTreeSet<String> {
        self.entries
            .get(path)
            .map(|e| e.auto_tags.clone())
            .unwrap_or_default()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diff for a pure apply: add what is missing, never remove.
    pub fn diff_for_apply(desired: &[String], current: &[String]) -> TagDiff {
        let current = normalized_set(current);
        TagDiff {
            to_add: desired
                .iter()
                .filter(|t| !current.contains(t.as_str()))
                .cloned()
                .collect(),
            to_remove: Vec::new(),
        }
    }

    /// Tracked, unprotected tags still present on the file.
    pub fn diff_for_revert(
        tracked: &BTreeSet<String>,
        current: &[String],
        protected: &[String],
    ) -> Vec<String> {
        let current = normalized_set(current);
        tracked
            .iter()
            .filter(|t| !is_protected(t, protected) && current.contains(t.as_str()))
            .cloned()
            .collect()
    }

    /// Resync diff: add missing desired tags, and drop tracked tags the rules
    /// no longer want (protected and manual tags stay).
    pub fn diff_for_resync(
        tracked: &BTreeSet<String>,
        desired: &[String],
        current: &[String],
        protected: &[String],
    ) -> TagDiff {
        let mut diff = Self::diff_for_apply(desired, current);
        let current = normalized_set(current);
        diff.to_remove = tracked
            .iter()
            .filter(|t| {
                !desired.contains(t) && !is_protected(t, protected) && current.contains(t.as_str())
            })
            .cloned()
            .collect();
        diff
    }

    /// [`Self::diff_for_resync`] against the entry tracked for `path`.
    pub fn diff_for_retag(
        &self,
        path: &str,
        desired: &[String],
        current: &[String],
        protected: &[String],
    ) -> TagDiff {
        Self::diff_for_resync(&self.auto_tags(path), desired, current, protected)
    }

    /// Clamps an arbitrary removal request to what the ledger may remove.
    pub fn filter_removals(&self, path: &str, requested: &[String], protected: &[String]) -> Vec<String> {
        let tracked = self.auto_tags(path);
        let mut out = Vec::new();
        for tag in requested {
            let Some(tag) = normalize_tag(tag) else {
                continue;
            };
            if tracked.contains(&tag) && !is_protected(&tag, protected) && !out.contains(&tag) {
                out.push(tag);
            }
        }
        out
    }

    /// Replaces the entry for `path`; an empty set deletes it.
    pub fn update(&mut self, path: &str, auto_tags: BTreeSet<String>) {
        if auto_tags.is_empty() {
            self.entries.remove(path);
        } else {
            self.entries.insert(
                path.to_string(),
                TrackingEntry {
                    auto_tags,
                    last_updated: Utc::now(),
                },
            );
        }
    }

    /// Puts back an exact earlier entry (or its absence).
    pub fn restore(&mut self, path: &str, entry: Option<TrackingEntry>) {
        match entry {
            Some(entry) if !entry.auto_tags.is_empty() => {
                self.entries.insert(path.to_string(), entry);
            }
            _ => {
                self.entries.remove(path);
            }
        }
    }

    /// Moves an entry to a new key unchanged. Returns false if `old` was
    /// untracked.
    pub fn rekey(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.entries.contains_key(old);
        }
        match self.entries.remove(old) {
            Some(entry) => {
                self.entries.insert(new.to_string(), entry);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<TrackingEntry> {
        self.entries.remove(path)
    }

    /// Tracked paths for which `exists` reports false.
    pub fn orphans<F>(&self, exists: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.entries
            .keys()
            .filter(|p| !exists(p))
            .cloned()
            .collect()
    }

    pub fn purge(&mut self, paths: &[String]) -> usize {
        paths
            .iter()
            .filter(|p| self.entries.remove(p.as_str()).is_some())
            .count()
    }
}

fn normalized_set(tags: &[String]) -> BTreeSet<String> {
    tags.iter().filter_map(|t| normalize_tag(t)).collect()
}

fn is_protected(tag: &str, protected: &[String]) -> bool {
    protected
        .iter()
        .any(|p| normalize_tag(p).as_deref() == Some(tag))
}
