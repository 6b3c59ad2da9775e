use clap::{Args, Parser, Subcommand};

use crate::model::priority::Priority;
use crate::ops::classify::DateFilter;

#[derive(Parser)]
#[command(name = "td", about = concat!("td v", env!("CARGO_PKG_VERSION"), " - the week ahead from your task tracker"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print tables without priority colors
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks due within the next week
    List(ListArgs),
    /// List tasks due today (including overdue)
    Today(ProjectArgs),
    /// List tasks due tomorrow
    Tomorrow(ProjectArgs),
    /// Add a task
    Add(AddArgs),
    /// Change fields on existing tasks
    Update(UpdateArgs),
    /// Mark tasks complete
    Complete(TaskArgs),
    /// Delete tasks
    Delete(TaskArgs),
    /// List all projects
    Projects,
    /// Show the notes on tasks
    Comments(TaskArgs),
    /// Pull a fresh copy of everything from the remote
    Sync,
    /// Start an interactive session (the default)
    Interactive,
    /// Anything else is ignored
    #[command(external_subcommand)]
    Other(Vec<String>),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Only show this project
    #[arg(short, long)]
    pub project: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only show this project
    #[arg(short, long)]
    pub project: Option<String>,
    /// Narrow to "today" or "tomorrow"
    #[arg(short, long)]
    pub date: Option<DateFilter>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
pub struct TaskArgs {
    /// Task IDs in hex, as shown in the ID column
    #[arg(short = 't', long = "task", num_args = 1.., value_parser = parse_task_id)]
    pub tasks: Vec<i64>,
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Task text
    #[arg(short, long)]
    pub content: String,
    /// Project name (default: the remote's inbox)
    #[arg(short, long)]
    pub project: Option<String>,
    /// Due date in the remote's natural language ("tomorrow", "fri 5pm")
    #[arg(short, long)]
    pub date: Option<String>,
    /// Label names
    #[arg(short, long, num_args = 1..)]
    pub labels: Vec<String>,
    /// Priority, 1 (most urgent) to 4
    #[arg(short = 'P', long)]
    pub priority: Option<Priority>,
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Task IDs in hex
    #[arg(short = 't', long = "task", num_args = 1.., value_parser = parse_task_id)]
    pub tasks: Vec<i64>,
    /// New task text
    #[arg(short, long)]
    pub content: Option<String>,
    /// New due date
    #[arg(short, long)]
    pub date: Option<String>,
    /// Replace labels with these
    #[arg(short, long, num_args = 1..)]
    pub labels: Vec<String>,
    /// New priority, 1 (most urgent) to 4
    #[arg(short = 'P', long)]
    pub priority: Option<Priority>,
}

/// Parse a task ID as shown in the ID column: lowercase hex, `0x` optional.
pub fn parse_task_id(s: &str) -> Result<i64, String> {
    let digits = s.trim();
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    i64::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a hex task id", s))
}
