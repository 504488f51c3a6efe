use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Kanban task board with drag-and-drop semantics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the task data file
    #[arg(long, short, value_name = "FILE", env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Project whose board to operate on
    #[arg(long, env = "TASKBOARD_PROJECT", default_value = "default")]
    pub project: String,

    /// Workspace the project belongs to
    #[arg(long, env = "TASKBOARD_WORKSPACE", default_value = "default")]
    pub workspace: String,

    /// Actor recorded on completions (defaults to config, then $USER)
    #[arg(long, env = "TASKBOARD_ACTOR")]
    pub actor: Option<String>,

    /// Config file to use instead of the user config location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board as six ordered columns
    Board,
    /// Column and completion counts
    Summary,
    /// List tasks with exact-match filters
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Move a task to a column position, as a drag would
    Move(MoveArgs),
    /// Move a task to the end of the done column
    Complete {
        #[arg(long)]
        id: String,
    },
    /// Set or clear the CEO-question flag
    Ceo {
        #[arg(long)]
        id: String,
        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },
    /// Delete a task
    Rm {
        #[arg(long)]
        id: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,
    /// Only tasks flagged as CEO questions
    #[arg(long)]
    pub ceo: bool,
    /// Sort key such as `order` or `-created_at`
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value = "backlog")]
    pub status: String,
    /// Position in the column (defaults to the end)
    #[arg(long)]
    pub order: Option<i32>,
    #[arg(long = "assignee")]
    pub assignees: Vec<String>,
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
    #[arg(long)]
    pub ceo: bool,
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(long)]
    pub id: String,
    /// Destination column
    #[arg(long)]
    pub to: String,
    /// Destination index (defaults to the end of the column)
    #[arg(long)]
    pub index: Option<usize>,
}
