//! # Foldertag CLI
//!
//! The binary is thin: everything lives in `src/cli/`, and this file only
//! calls `cli::run()` and turns an error into an exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/foldertag/src/cli/)                      │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering with colored (render.rs)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  foldertagapp::api::TaggerApi                               │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI is one-shot: a move batch that needs a decision must be given
//! one on the same invocation (`foldertag moved --action ...`), unless a
//! move action has been remembered.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
