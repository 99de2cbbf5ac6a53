//! # CLI Behavior
//!
//! One possible client of foldertagapp. This is the only place that knows
//! about stdout, stderr and exit codes.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing-subscriber`. The filter comes
//! from `FOLDERTAG_LOG` (same syntax as `RUST_LOG`); without it the level is
//! `warn`, or `debug` with `-v`.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Context setup and dispatch to the API
//! - `render`: Output formatting

mod commands;
mod render;
pub mod setup;

pub use commands::run;
