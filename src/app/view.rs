//! Plain-text rendering for the terminal front end

use std::fmt::Write;

use crate::focus_timing::stats::{format_minutes, StatsReport};
use crate::task::Task;

use super::session::FocusSession;

/// Characters of the task id shown in listings
const SHORT_ID_LEN: usize = 8;

/// Width of the progress bar in the session status line
const PROGRESS_WIDTH: usize = 20;

/// Leading characters of a task id, enough to address it
pub fn short_id(task: &Task) -> String {
    task.id.to_string()[..SHORT_ID_LEN].to_string()
}

/// One line describing a task
pub fn render_task_line(task: &Task) -> String {
    let mut line = format!(
        "{}  [{}] {:<8} {}  ({} min)",
        short_id(task),
        task.priority.badge(),
        task.category.display_name(),
        task.title,
        task.estimated_minutes
    );
    if !task.sub_tasks.is_empty() {
        let _ = write!(line, "  {}/{} steps", task.sub_tasks_done(), task.sub_tasks.len());
    }
    line
}

/// A task followed by its numbered subtasks
pub fn render_task_detail(task: &Task) -> String {
    let mut out = render_task_line(task);
    for (index, sub_task) in task.sub_tasks.iter().enumerate() {
        let mark = if sub_task.completed { "x" } else { " " };
        let _ = write!(out, "\n    {}. [{}] {}", index + 1, mark, sub_task.title);
    }
    out
}

/// Active tasks, then optionally the completed ones
pub fn render_task_list(active: &[&Task], completed: &[&Task]) -> String {
    let mut out = String::new();

    if active.is_empty() {
        out.push_str("No open tasks. Add one with `zenfocus add <title>`.\n");
    } else {
        for task in active {
            let _ = writeln!(out, "{}", render_task_detail(task));
        }
    }

    if !completed.is_empty() {
        let _ = writeln!(out, "\nCompleted ({})", completed.len());
        for task in completed {
            let _ = writeln!(out, "{}  {}", short_id(task), task.title);
        }
    }

    out
}

/// Single status line for a running session
pub fn render_session_status(session: &FocusSession) -> String {
    let clock = session.clock();
    let filled = (clock.progress_ratio() * PROGRESS_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_WIDTH);
    let state = if session.is_expired() {
        "time's up"
    } else if clock.is_running() {
        "focusing"
    } else {
        "paused"
    };

    format!(
        "{:>6} [{}{}] {}",
        clock.format_remaining(),
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        state
    )
}

/// Statistics for one window
pub fn render_stats(report: &StatsReport<'_>) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "{} ({})", report.window.display_name(), report.window.short_label());
    let _ = writeln!(
        out,
        "Total focus: {} across {} sessions",
        summary.format_total(),
        summary.session_count
    );

    if report.is_empty() {
        out.push_str("No sessions recorded in this period.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Work: {} ({}%)  Personal: {} ({}%)",
        format_minutes(summary.work_minutes),
        summary.work_percentage(),
        format_minutes(summary.personal_minutes),
        summary.personal_percentage()
    );

    for day in &report.days {
        let _ = writeln!(out, "\n{}  {}", day.label, format_minutes(day.total_minutes()));
        for session in &day.sessions {
            let _ = writeln!(
                out,
                "  {:<8} {}  {}",
                session.category.display_name(),
                session.task_title,
                format_minutes(u64::from(session.duration_minutes))
            );
        }
    }

    out
}
