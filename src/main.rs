use anyhow::Result;
use clap::{Parser, Subcommand};

use zenfocus::app::{run_focus, view, App, FocusExit, TaskLookup};
use zenfocus::config::{self, Config};
use zenfocus::focus_timing::stats::format_minutes;
use zenfocus::focus_timing::{FinishOutcome, StatsWindow};
use zenfocus::logging;
use zenfocus::task::{Category, Priority, TaskId, ESTIMATE_PRESETS};

#[derive(Parser)]
#[command(name = "zenfocus", version)]
#[command(about = "Calm task capture, focus timer and time-tracking statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title
        #[arg(required = true)]
        title: Vec<String>,
        /// Priority: A (critical), B (important) or C (optional)
        #[arg(short, long, default_value = "B")]
        priority: Priority,
        /// Category: work or personal
        #[arg(short, long, default_value = "work")]
        category: Category,
        /// Estimate in minutes (15, 25, 45 and 60 are the usual picks)
        #[arg(short, long)]
        estimate: Option<u32>,
    },
    /// List open tasks by priority
    List {
        /// Also list completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task completed without recording time
    Done {
        /// Task id or unique prefix
        id: String,
    },
    /// Change a task's estimate
    Estimate {
        /// Task id or unique prefix
        id: String,
        /// New estimate in minutes
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Split a task into small steps with the assistant
    Breakdown {
        /// Task id or unique prefix
        id: String,
    },
    /// Tick a step off (or back on)
    Subtask {
        /// Task id or unique prefix
        id: String,
        /// Step number as listed
        step: usize,
    },
    /// Run a focus session on a task
    Focus {
        /// Task id or unique prefix
        id: String,
    },
    /// Show focus statistics
    Stats {
        /// Window: today, week or month
        #[arg(short, long, default_value = "week")]
        window: StatsWindow,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ensure data directory exists (creates logs dir too)
    config::ensure_directories()?;
    let config = Config::load()?;

    // Initialize file logging BEFORE any tracing calls
    let log_file_info = logging::init_file_logging(config::logs_dir())?;

    match logging::cleanup_old_logs(&config::logs_dir(), config.log_retention_days) {
        Ok(count) if count > 0 => tracing::info!("Cleaned up {} old log files", count),
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to clean up old logs: {:#}", e),
    }

    tracing::info!("Logging to: {}", log_file_info.path.display());

    let mut app = App::new(config)?;
    let command = cli.command.unwrap_or(Commands::List { all: false });
    run(&mut app, command).await
}

async fn run(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            title,
            priority,
            category,
            estimate,
        } => match app.add_task(&title.join(" "), priority, category, estimate) {
            Some(id) => {
                if let Some(task) = app.state().task(id) {
                    println!("Added {}", view::render_task_line(task));
                }
            }
            None => println!("Title cannot be empty."),
        },
        Commands::List { all } => {
            let state = app.state();
            let completed = if all {
                state.completed_tasks()
            } else {
                Vec::new()
            };
            print!("{}", view::render_task_list(&state.active_tasks(), &completed));
        }
        Commands::Done { id } => {
            if let Some(id) = resolve(app, &id) {
                match app.quick_complete(id) {
                    FinishOutcome::TaskNotFound => println!("No such task."),
                    _ => println!("Marked done."),
                }
            }
        }
        Commands::Estimate { id, minutes } => {
            if let Some(id) = resolve(app, &id) {
                if app.set_estimate(id, minutes) {
                    println!("Estimate set to {} min.", minutes);
                } else {
                    let presets: Vec<String> =
                        ESTIMATE_PRESETS.iter().map(|m| m.to_string()).collect();
                    println!(
                        "Estimate unchanged. Use a positive number of minutes, e.g. {}.",
                        presets.join(", ")
                    );
                }
            }
        }
        Commands::Breakdown { id } => {
            if let Some(id) = resolve(app, &id) {
                if !app.assistant().is_online() {
                    println!("No assistant key configured, using generic steps.");
                }
                if app.break_down(id).await.is_some() {
                    if let Some(task) = app.state().task(id) {
                        println!("{}", view::render_task_detail(task));
                    }
                }
            }
        }
        Commands::Subtask { id, step } => {
            if let Some(id) = resolve(app, &id) {
                if app.toggle_sub_task(id, step) {
                    if let Some(task) = app.state().task(id) {
                        println!("{}", view::render_task_detail(task));
                    }
                } else {
                    println!("No step {} on that task.", step);
                }
            }
        }
        Commands::Focus { id } => {
            if let Some(id) = resolve(app, &id) {
                report_focus_exit(run_focus(app, id).await?);
            }
        }
        Commands::Stats { window } => {
            let now = chrono::Local::now();
            print!("{}", view::render_stats(&app.state().stats(window, &now)));
        }
    }
    Ok(())
}

/// Resolve a typed id, telling the user when it does not pick out one task
fn resolve(app: &App, prefix: &str) -> Option<TaskId> {
    match app.state().resolve(prefix) {
        TaskLookup::Found(id) => Some(id),
        TaskLookup::NotFound => {
            println!("No task matches '{}'.", prefix);
            None
        }
        TaskLookup::Ambiguous(count) => {
            println!("'{}' matches {} tasks; type more of the id.", prefix, count);
            None
        }
    }
}

fn report_focus_exit(exit: FocusExit) {
    match exit {
        FocusExit::Finished(FinishOutcome::Recorded(session)) => println!(
            "Nice work. Logged {} on {}.",
            format_minutes(u64::from(session.duration_minutes)),
            session.task_title
        ),
        FocusExit::Finished(FinishOutcome::CompletedWithoutRecord) => {
            println!("Marked done. No time was logged.")
        }
        FocusExit::Finished(FinishOutcome::TaskNotFound) | FocusExit::TaskNotFound => {
            println!("That task is not open.")
        }
        FocusExit::Cancelled => println!("Session ended. Nothing was logged."),
    }
}
