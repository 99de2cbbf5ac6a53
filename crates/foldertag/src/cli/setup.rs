use clap::{Parser, Subcommand, ValueEnum};
use foldertagapp::model::MoveAction;
use std::path::PathBuf;

/// Returns the version string, with git hash and commit date for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "foldertag",
    bin_name = "foldertag",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Tag notes by the folders they live in", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root (defaults to FOLDERTAG_VAULT or the current directory)
    #[arg(long, global = true, help_heading = "Options")]
    pub vault: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tags the rules give a path
    #[command(display_order = 1)]
    Resolve { path: String },

    /// Show what applying the rules would change
    #[command(display_order = 2)]
    Preview {
        /// Notes or folders
        #[arg(required = true, num_args = 1..)]
        targets: Vec<String>,

        /// Print previews as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add the tags the rules want
    #[command(display_order = 3)]
    Apply {
        #[arg(required = true, num_args = 1..)]
        targets: Vec<String>,
    },

    /// Remove automatically applied tags
    #[command(display_order = 4)]
    Revert {
        #[arg(required = true, num_args = 1..)]
        targets: Vec<String>,
    },

    /// Remove specific automatically applied tags
    #[command(alias = "rm", display_order = 5)]
    Remove {
        #[arg(required = true, num_args = 1..)]
        targets: Vec<String>,

        /// Tag to remove (repeatable)
        #[arg(short, long = "tag", required = true)]
        tags: Vec<String>,
    },

    /// Undo an operation (the latest one by default)
    #[command(display_order = 6)]
    Undo { id: Option<String> },

    /// List undoable operations, newest first
    #[command(alias = "log", display_order = 7)]
    History,

    /// Manage folder rules
    #[command(display_order = 10)]
    Rule {
        #[command(subcommand)]
        action: RuleCommands,
    },

    /// Manage folder aliases
    #[command(display_order = 11)]
    Alias {
        #[command(subcommand)]
        action: AliasCommands,
    },

    /// Show or change settings
    #[command(display_order = 12)]
    Settings {
        /// Only the top N folder levels are searched for rules
        #[arg(long)]
        inherit_depth: Option<usize>,

        /// Replace ignored paths (repeatable)
        #[arg(long = "ignore")]
        ignore_paths: Vec<String>,

        /// Replace protected tags (repeatable)
        #[arg(long = "protect")]
        protected_tags: Vec<String>,

        /// Forget the remembered move action
        #[arg(long)]
        forget_move_action: bool,
    },

    /// Report a file that moved (as a watcher would)
    #[command(display_order = 20)]
    Moved {
        old_path: String,
        new_path: String,

        /// What to do if the move needs a decision
        #[arg(long, value_enum)]
        action: Option<ActionArg>,

        /// Use this action for future moves too
        #[arg(long, requires = "action")]
        remember: bool,

        /// Leave these moved files alone (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Report a newly created note (as a watcher would)
    #[command(display_order = 21)]
    Created { path: String },

    /// List tracking entries for files that no longer exist
    #[command(display_order = 30)]
    Orphans {
        /// Delete them
        #[arg(long)]
        purge: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// Add or replace the rule for a folder
    Set {
        folder: String,

        /// Tag to apply (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Folder levels whose names become tags, 1 being the rule folder
        #[arg(long, value_delimiter = ',')]
        levels: Vec<u32>,

        /// "all" or comma-separated levels below the rule folder
        #[arg(long, default_value = "all")]
        apply_down: String,

        /// Also collect tags from ancestor rules
        #[arg(long)]
        inherit: bool,

        /// Tag notes created in this folder
        #[arg(long)]
        new_files: bool,
    },

    /// Delete the rule for a folder
    #[command(alias = "rm")]
    Remove { folder: String },

    /// List rules and aliases
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// Use these tags instead of the folder name
    Set {
        folder: String,
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    #[command(alias = "rm")]
    Remove { folder: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Continue,
    Leave,
    Cancel,
}

impl From<ActionArg> for MoveAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Continue => MoveAction::Continue,
            ActionArg::Leave => MoveAction::Leave,
            ActionArg::Cancel => MoveAction::Cancel,
        }
    }
}
