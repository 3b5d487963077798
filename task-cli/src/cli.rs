use crate::error::{Error, Result};
use crate::storage::TaskStore;
use crate::task::{Status, Task};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Track tasks in a JSON file in the working directory
#[derive(Parser, Debug)]
#[command(name = "task-cli", version, arg_required_else_help = true)]
pub struct Cli {
    /// Task file to use instead of the configured one
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand, PartialEq)]
pub enum Commands {
    /// Add a new task
    Add { description: String },
    /// Update a task's description
    Update {
        #[arg(value_parser = parse_id)]
        id: u32,
        description: String,
    },
    /// Delete a task
    Delete {
        #[arg(value_parser = parse_id)]
        id: u32,
    },
    /// Mark a task with a status (todo, doing, done)
    Mark {
        #[arg(value_parser = parse_status)]
        status: Status,
        #[arg(value_parser = parse_id)]
        id: u32,
    },
    /// List all tasks or only those with a status (todo, doing, done)
    List {
        #[arg(value_parser = parse_status)]
        status: Option<Status>,
    },
}

fn parse_id(s: &str) -> Result<u32> {
    match s.parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::Validation(format!("invalid task ID '{s}'"))),
    }
}

fn parse_status(s: &str) -> Result<Status> {
    s.parse()
}

impl Commands {
    fn is_mutating(&self) -> bool {
        !matches!(self, Commands::List { .. })
    }
}

/// Runs one command against `store`: load, apply, save if anything changed,
/// then report on `out`.
pub fn run(command: Commands, store: &impl TaskStore, out: &mut impl Write) -> Result<()> {
    let mut tasks = store.load()?;
    let saves = command.is_mutating();

    let report = match command {
        Commands::Add { description } => {
            let id = tasks.add(description)?;
            info!(id, "task added");
            format!("Task added successfully (ID: {id})\n")
        }
        Commands::Update { id, description } => {
            tasks.update(id, description)?;
            info!(id, "task updated");
            format!("Task ID {id} updated successfully\n")
        }
        Commands::Delete { id } => {
            tasks.delete(id)?;
            info!(id, "task deleted");
            format!("Task ID {id} deleted successfully\n")
        }
        Commands::Mark { status, id } => {
            tasks.mark(id, status)?;
            info!(id, %status, "task marked");
            format!("Task ID {id} marked as {status}.\n")
        }
        Commands::List { status } => format_list(&tasks.list(status), status),
    };

    if saves {
        store.save(&tasks)?;
    }
    write_report(out, &report)
}

fn write_report(out: &mut impl Write, report: &str) -> Result<()> {
    out.write_all(report.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| Error::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
}

fn format_list(tasks: &[&Task], filter: Option<Status>) -> String {
    if tasks.is_empty() {
        let status = filter.map_or("all", |status| status.as_str());
        return format!("No tasks found with status: {status}\n");
    }

    let mut report = String::from("--- Task List ---\n");
    for task in tasks {
        let created = task.created_at().with_timezone(&chrono::Local);
        let updated = task.updated_at().with_timezone(&chrono::Local);
        report.push_str(&format!(
            "[ID: {}] [{}] {}\n  Created: {} | Updated: {}\n",
            task.id(),
            task.status(),
            task.description(),
            created.format(TIMESTAMP_FORMAT),
            updated.format(TIMESTAMP_FORMAT),
        ));
    }
    report.push_str("-----------------\n");
    report
}
