//! # Foldertag Architecture
//!
//! Foldertag tags notes according to the folder they live in. Rules are
//! explicit and per folder; every tag the engine writes is recorded in a
//! provenance ledger so it can later be removed without touching tags the
//! user added by hand. Each batch of tag changes is undoable.
//!
//! Like its CLI, the engine is UI-agnostic: a vault plugin, a file watcher
//! daemon or a test harness drive it through the same facade.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (foldertag crate)                                      │
//! │  - Parses arguments, renders results, owns exit codes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Facade over commands, persists state after mutations     │
//! │  - Routes watcher events through the MoveClassifier         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Preview, commit, undo, moves, rules, orphans             │
//! │  - Pure logic over Workspace + Vault                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (tagger, ledger, history, classifier)               │
//! │  - Rule resolution, provenance, undo log, move batching     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (vault/, store/)                                   │
//! │  - Vault: note files and their frontmatter tags             │
//! │  - StateStore: rules, settings, ledger, history             │
//! │  - Fs* for production, Mem* for tests                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing from `api.rs` inward prints, exits, or reads the clock on its
//! own. Time comes in as an [`std::time::Instant`] argument, which keeps
//! the debounce and batching logic deterministic under test.
//!
//! ## Testing Strategy
//!
//! 1. **Engine and commands**: unit tests against [`vault::memory::MemVault`].
//! 2. **API**: dispatch and persistence tests against
//!    [`store::memory::MemStateStore`].
//! 3. **Integration** (`tests/`): real files in a temp dir via `test_utils`.
//!
//! ## Module Overview
//!
//! - [`api`]: The facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`tagger`]: Resolves tags for a path from folder rules
//! - [`ledger`]: Which tags were applied automatically, per file
//! - [`history`]: Bounded undo log
//! - [`classifier`]: Debounces rename events and batches moves
//! - [`rules`]: Rule and settings validation
//! - [`vault`]: Note storage and frontmatter tags
//! - [`store`]: Persisted engine state
//! - [`config`]: Process configuration
//! - [`error`]: Error types

pub mod api;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod model;
pub mod paths;
pub mod rules;
pub mod store;
pub mod tagger;
pub mod tags;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod timers;
pub mod vault;
pub mod workspace;
