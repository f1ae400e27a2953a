use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tdl", about = concat!("todoliez v", env!("CARGO_PKG_VERSION"), " - tasks with deadlines"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new todoliez project in the current directory
    Init(InitArgs),
    /// List tasks with their countdowns
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Change a task's text or deadline
    Edit(EditArgs),
    /// Flip a task between open and done
    Toggle(ToggleArgs),
    /// Delete a task
    Rm(RmArgs),
    /// View or prune the sync log of failed store operations
    Log(LogCmd),
    /// Change project settings
    Config(ConfigCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Document store backend (file, memory, firestore)
    #[arg(long)]
    pub backend: Option<String>,
    /// Reinitialize even if todoliez/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Order: insertion, name, remaining (default: from config)
    #[arg(long)]
    pub sort: Option<String>,
    /// Only tasks whose text matches this regex
    #[arg(long = "match", value_name = "REGEX")]
    pub pattern: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Deadline as local date-time, e.g. 2025-01-01T10:00
    pub deadline: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New text
    #[arg(long)]
    pub text: Option<String>,
    /// New deadline
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args)]
pub struct LogCmd {
    #[command(subcommand)]
    pub action: Option<LogAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show entries after this timestamp (RFC 3339)
    #[arg(long)]
    pub since: Option<String>,
}

#[derive(Subcommand)]
pub enum LogAction {
    /// Remove old entries
    Prune(LogPruneArgs),
    /// Print the absolute path to the sync log
    Path,
}

#[derive(Args)]
pub struct LogPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set the document store backend
    Backend {
        /// file, memory or firestore
        value: String,
    },
    /// Set the default sort order
    Sort {
        /// insertion, name or remaining
        value: String,
    },
}
