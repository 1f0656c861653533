//! Derived task lists
//!
//! Both views borrow from the task slice and never reorder the source.

use super::Task;

/// Open tasks, most important first
///
/// `sort_by_key` is stable, so tasks sharing a priority keep their
/// insertion order.
pub fn active_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut active: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    active.sort_by_key(|t| t.priority.rank());
    active
}

/// Completed tasks, most recently created first
///
/// Ordered by creation time: tasks carry no completion timestamp of their own.
pub fn completed_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut completed: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();
    completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    completed
}
