//! Cancellable scheduled callbacks as plain data.
//!
//! A [`Timers`] maps a key to a deadline. Arming a key that is already armed
//! replaces its deadline (the earlier callback is cancelled). Nothing runs on
//! its own: the owner passes the current time to [`Timers::pop_due`] and
//! handles whatever fired, which keeps every debounce and batching decision
//! deterministic under test.

use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Timers<K: Ord + Clone> {
    deadlines: BTreeMap<K, Instant>,
}

impl<K: Ord + Clone> Default for Timers<K> {
    fn default() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `key` to fire at `deadline`. Returns true if a pending timer for
    /// the same key was replaced.
    pub fn arm(&mut self, key: K, deadline: Instant) -> bool {
        self.deadlines.insert(key, deadline).is_some()
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns the earliest timer due at `now`, with its deadline.
    /// Ties fire in key order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(K, Instant)> {
        let (key, at) = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(k, at)| (k.clone(), *at))?;
        self.deadlines.remove(&key);
        Some((key, at))
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
