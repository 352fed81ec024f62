use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::*;

use crate::{
    models::task::local_today,
    services::{
        reports::{
            DEFAULT_EXPORT_FILE, ReportError, default_report_file, write_csv, write_daily_report,
        },
        tasks::{
            AddTaskError, AddTaskParameters, EditTaskError, EditTaskParameters, RemoveTaskError,
            add_task, edit_task, parse_date, remove_task, toggle_task,
        },
    },
    storage::{StorageError, json::JsonFileStorage},
    todo_list::{TodoList, ToggleTaskError},
};

mod models;
mod services;
mod storage;
mod todo_list;
mod ui;

#[derive(Parser)]
#[command(name = "todo", about = "A small to-do list kept in a JSON file")]
struct Cli {
    /// Path to the task file
    #[arg(long, short, global = true, env = "TODO_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    List {
        #[command(flatten)]
        filter: ListFilter,
    },

    /// Show tasks created today
    Today,

    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Priority (higher is more important)
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<i32>,

        /// Due date (YYYY-MM-DD), today or later
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Toggle a task between done and pending
    Done { id: String },

    /// Change a task's title, priority or due date
    Edit {
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New priority
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<i32>,

        /// New due date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "no_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        no_due: bool,
    },

    /// Delete a task
    Remove { id: String },

    /// Write a plain-text report of the tasks created on a date
    Report {
        /// Report date (YYYY-MM-DD)
        date: String,

        /// Output file (defaults to report_<date>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export every task to CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
}

#[derive(Args, Default)]
#[group(multiple = false)]
struct ListFilter {
    /// Sort by creation date
    #[arg(long)]
    sorted: bool,

    /// Only tasks with at least this priority
    #[arg(long, allow_negative_numbers = true)]
    min_priority: Option<i32>,

    /// Only tasks created on this date (YYYY-MM-DD)
    #[arg(long)]
    created: Option<String>,

    /// Only tasks due on this date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<String>,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todo")
        .join("tasks.json")
}

fn parse_date_or_exit(input: &str) -> jiff::civil::Date {
    parse_date(input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-03-01)");
        std::process::exit(1);
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let storage_path = cli.file.unwrap_or_else(default_store_path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error: Failed to create data directory: {}", e);
            std::process::exit(1);
        });
    }

    let mut todo = TodoList::new(JsonFileStorage::new(storage_path));

    match todo.load() {
        Ok(_) => {}
        Err(e @ StorageError::ParseFailed { .. }) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            eprintln!(
                "Starting with an empty list. '{}' is copied to backups/ on the next change.",
                todo.storage().path().display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    let today = local_today();

    match cli.command.unwrap_or(Commands::List {
        filter: ListFilter::default(),
    }) {
        Commands::List { filter } => {
            let (title, tasks) = if filter.sorted {
                ("Tasks by creation date".to_string(), todo.list_sorted_by_creation())
            } else if let Some(threshold) = filter.min_priority {
                (
                    format!("Priority ≥ {}", threshold),
                    todo.tasks_with_min_priority(threshold),
                )
            } else if let Some(created) = filter.created {
                let date = parse_date_or_exit(&created);
                (format!("Created on {}", date), todo.tasks_on_date(date))
            } else if let Some(due) = filter.due {
                let date = parse_date_or_exit(&due);
                (format!("Due on {}", date), todo.tasks_due_on(date))
            } else {
                ("Tasks".to_string(), todo.list_all().iter().collect())
            };

            ui::render_task_list(&title, &tasks, today, "No tasks found");
            if !tasks.is_empty() && tasks.len() != todo.len() {
                ui::render_total_footer(todo.len());
            }
        }
        Commands::Today => {
            let tasks = todo.tasks_on_date(today);
            ui::render_task_list(
                &format!("Today ({})", today.strftime("%b %d")),
                &tasks,
                today,
                "No tasks created today",
            );
        }
        Commands::Add {
            title,
            priority,
            due,
        } => {
            let params = AddTaskParameters {
                title,
                priority,
                due_date: due,
            };

            match add_task(&mut todo, params, today) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!("  #{}", task.id);
                }
                Err(AddTaskError::EmptyTitle) => {
                    eprintln!("Error: Task title cannot be empty");
                    std::process::exit(1);
                }
                Err(AddTaskError::InvalidDueDate(e)) => {
                    eprintln!("Error: {}", e);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-03-01)");
                    std::process::exit(1);
                }
                Err(AddTaskError::DueDateInPast { due, today }) => {
                    eprintln!(
                        "Error: Due date {} is in the past. It should be today ({}) or later.",
                        due, today
                    );
                    std::process::exit(1);
                }
                Err(AddTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Done { id } => match toggle_task(&mut todo, &id) {
            Ok(task) if task.is_done => {
                println!("✓ Task completed: {}", task.title);
            }
            Ok(task) => {
                println!("○ Task reopened: {}", task.title);
            }
            Err(ToggleTaskError::TaskNotFound(id)) => {
                eprintln!("Error: Task '{}' not found", id);
                std::process::exit(1);
            }
            Err(ToggleTaskError::Storage(e)) => {
                eprintln!("Error: Failed to save task: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Edit {
            id,
            title,
            priority,
            due,
            no_due,
        } => {
            let params = EditTaskParameters {
                id,
                title,
                priority,
                due_date: due,
                clear_due_date: no_due,
            };

            match edit_task(&mut todo, params) {
                Ok(task) => {
                    println!("✓ Task updated");
                    println!("  {}", task);
                }
                Err(EditTaskError::TaskNotFound(id)) => {
                    eprintln!("Error: Task '{}' not found", id);
                    std::process::exit(1);
                }
                Err(EditTaskError::EmptyTitle) => {
                    eprintln!("Error: Task title cannot be empty");
                    std::process::exit(1);
                }
                Err(EditTaskError::InvalidDueDate(e)) => {
                    eprintln!("Error: {}", e);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-03-01)");
                    std::process::exit(1);
                }
                Err(EditTaskError::NothingToChange(id)) => {
                    eprintln!("Error: Nothing to change for task '{}'", id);
                    eprintln!("\nUse --title, --priority, --due or --no-due.");
                    std::process::exit(1);
                }
                Err(EditTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Remove { id } => match remove_task(&mut todo, &id) {
            Ok(_) => {
                println!("✓ Task deleted: #{}", id);
            }
            Err(RemoveTaskError::TaskNotFound(id)) => {
                eprintln!("Error: Task '{}' not found", id);
                std::process::exit(1);
            }
            Err(RemoveTaskError::Storage(e)) => {
                eprintln!("Error: Failed to delete task: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Report { date, output } => {
            let date = parse_date_or_exit(&date);
            let path = output.unwrap_or_else(|| default_report_file(date));
            let tasks = todo.tasks_on_date(date);

            match write_daily_report(&path, date, &tasks) {
                Ok(()) => {
                    println!("✓ Report written: {}", path.display());
                    println!("  {} task(s) created on {}", tasks.len(), date);
                }
                Err(ReportError::WriteFailed { path, source }) => {
                    eprintln!("Error: Failed to write report '{}': {}", path.display(), source);
                    std::process::exit(1);
                }
            }
        }
        Commands::Export { output } => match write_csv(&output, todo.list_all()) {
            Ok(()) if todo.is_empty() => {
                println!("✓ No tasks yet, wrote header only to {}", output.display());
            }
            Ok(()) => {
                println!("✓ Exported {} task(s) to {}", todo.len(), output.display());
            }
            Err(ReportError::WriteFailed { path, source }) => {
                eprintln!("Error: Failed to write CSV '{}': {}", path.display(), source);
                std::process::exit(1);
            }
        },
    }
}
