//! Application state management
//!
//! Contains the task list and the session history, plus the operations the
//! front end performs on them. Nothing here touches disk; the [`App`] wrapper
//! persists after each mutation.
//!
//! [`App`]: super::App

use chrono::{DateTime, TimeZone, Utc};

use crate::focus_timing::{self, CompletedSession, FinishOutcome, StatsReport, StatsWindow};
use crate::task::{self, Category, Priority, SubTaskId, Task, TaskId};

/// Result of resolving a user-typed task id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLookup {
    /// Exactly one task matched
    Found(TaskId),
    /// No task id starts with the given text
    NotFound,
    /// More than one task id starts with the given text
    Ambiguous(usize),
}

/// Main application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// All tasks, in creation order
    pub tasks: Vec<Task>,
    /// All completed sessions, in recording order
    pub history: Vec<CompletedSession>,
}

impl AppState {
    /// Create state from loaded collections
    pub fn new(tasks: Vec<Task>, history: Vec<CompletedSession>) -> Self {
        Self { tasks, history }
    }

    /// Add a task; returns its id, or `None` when the title is blank
    pub fn add_task(
        &mut self,
        title: &str,
        priority: Priority,
        category: Category,
        estimated_minutes: u32,
    ) -> Option<TaskId> {
        let task = Task::new(title, priority, category, estimated_minutes)?;
        let id = task.id;
        tracing::info!(task = %task.title, priority = %task.priority, "Task added");
        self.tasks.push(task);
        Some(id)
    }

    /// Get a task by id
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Resolve a full id or any unique prefix of one
    pub fn resolve(&self, prefix: &str) -> TaskLookup {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return TaskLookup::NotFound;
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix));

        match (matches.next(), matches.count()) {
            (None, _) => TaskLookup::NotFound,
            (Some(task), 0) => TaskLookup::Found(task.id),
            (Some(_), rest) => TaskLookup::Ambiguous(rest + 1),
        }
    }

    /// Update a task's estimate
    ///
    /// Non-positive values and unknown ids are no-ops. Returns true if the
    /// estimate changed.
    pub fn set_estimate(&mut self, id: TaskId, minutes: i64) -> bool {
        self.task_mut(id)
            .map(|task| task.set_estimate(minutes))
            .unwrap_or(false)
    }

    /// Flip a subtask's completed flag
    ///
    /// Returns false if either the task or the subtask does not exist.
    pub fn toggle_sub_task(&mut self, task_id: TaskId, sub_task_id: SubTaskId) -> bool {
        self.task_mut(task_id)
            .map(|task| task.toggle_sub_task(sub_task_id))
            .unwrap_or(false)
    }

    /// Replace a task's subtasks with generated steps
    ///
    /// Returns false (and changes nothing) if the task no longer exists.
    pub fn apply_breakdown(&mut self, task_id: TaskId, steps: Vec<String>) -> bool {
        match self.task_mut(task_id) {
            Some(task) => {
                task.replace_sub_tasks(steps);
                true
            }
            None => {
                tracing::debug!(%task_id, "Dropping breakdown for missing task");
                false
            }
        }
    }

    /// Complete a task and record `elapsed_secs` against it
    pub fn finish_task(
        &mut self,
        task_id: TaskId,
        elapsed_secs: u64,
        now: DateTime<Utc>,
    ) -> FinishOutcome {
        focus_timing::finish(&mut self.tasks, &mut self.history, task_id, elapsed_secs, now)
    }

    /// Complete a task without a timer run; no history record is made
    pub fn quick_complete(&mut self, task_id: TaskId) -> FinishOutcome {
        self.finish_task(task_id, 0, task::now_millis())
    }

    /// Open tasks, highest priority first
    pub fn active_tasks(&self) -> Vec<&Task> {
        task::active_tasks(&self.tasks)
    }

    /// Completed tasks, most recently created first
    pub fn completed_tasks(&self) -> Vec<&Task> {
        task::completed_tasks(&self.tasks)
    }

    /// Statistics for `window` as seen at `now`
    pub fn stats<Tz: TimeZone>(&self, window: StatsWindow, now: &DateTime<Tz>) -> StatsReport<'_> {
        StatsReport::build(&self.history, window, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn state_with_tasks() -> (AppState, TaskId, TaskId) {
        let mut state = AppState::default();
        let write = state
            .add_task("Write report", Priority::Important, Category::Work, 25)
            .unwrap();
        let walk = state
            .add_task("Walk", Priority::Critical, Category::Personal, 15)
            .unwrap();
        (state, write, walk)
    }

    #[test]
    fn test_add_task_rejects_blank_title() {
        let mut state = AppState::default();
        assert!(state
            .add_task("   ", Priority::Important, Category::Work, 25)
            .is_none());
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn test_resolve_by_prefix() {
        let (state, write, _) = state_with_tasks();

        let full = write.to_string();
        assert_eq!(state.resolve(&full), TaskLookup::Found(write));
        assert_eq!(state.resolve(&full[..8].to_uppercase()), TaskLookup::Found(write));
        assert_eq!(state.resolve(""), TaskLookup::NotFound);
        assert_eq!(state.resolve("zzzz"), TaskLookup::NotFound);
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let mut state = AppState::default();
        for title in ["a", "b", "c"] {
            state.add_task(title, Priority::Important, Category::Work, 25);
        }
        for task in &mut state.tasks {
            let rest = task.id.to_string()[4..].to_string();
            task.id = Uuid::parse_str(&format!("abcd{}", rest)).unwrap();
        }

        assert_eq!(state.resolve("abcd"), TaskLookup::Ambiguous(3));
        let third = state.tasks[2].id;
        assert_eq!(state.resolve(&third.to_string()), TaskLookup::Found(third));
    }

    #[test]
    fn test_set_estimate_unknown_or_invalid_is_noop() {
        let (mut state, write, _) = state_with_tasks();

        assert!(!state.set_estimate(write, 0));
        assert!(!state.set_estimate(write, -5));
        assert!(!state.set_estimate(Uuid::new_v4(), 30));
        assert_eq!(state.task(write).unwrap().estimated_minutes, 25);

        assert!(state.set_estimate(write, 40));
        assert_eq!(state.task(write).unwrap().estimated_minutes, 40);
    }

    #[test]
    fn test_breakdown_for_missing_task_is_dropped() {
        let (mut state, write, _) = state_with_tasks();

        assert!(!state.apply_breakdown(Uuid::new_v4(), vec!["x".to_string()]));
        assert!(state.apply_breakdown(write, vec!["one".to_string(), "two".to_string()]));

        let task = state.task(write).unwrap();
        assert_eq!(task.sub_tasks.len(), 2);

        let first = task.sub_tasks[0].id;
        assert!(state.toggle_sub_task(write, first));
        assert_eq!(state.task(write).unwrap().sub_tasks_done(), 1);
        assert!(!state.task(write).unwrap().completed);
    }

    #[test]
    fn test_finish_moves_task_between_views() {
        let (mut state, write, walk) = state_with_tasks();
        assert_eq!(state.active_tasks()[0].id, walk);

        let outcome = state.finish_task(write, 90, task::now_millis());
        assert_eq!(outcome.record().unwrap().duration_minutes, 2);
        assert_eq!(state.history.len(), 1);

        let active: Vec<_> = state.active_tasks().iter().map(|t| t.id).collect();
        assert_eq!(active, vec![walk]);
        assert_eq!(state.completed_tasks()[0].id, write);
    }

    #[test]
    fn test_quick_complete_records_nothing() {
        let (mut state, _, walk) = state_with_tasks();

        let outcome = state.quick_complete(walk);
        assert_eq!(outcome, FinishOutcome::CompletedWithoutRecord);
        assert!(state.task(walk).unwrap().completed);
        assert!(state.history.is_empty());

        assert_eq!(state.quick_complete(Uuid::new_v4()), FinishOutcome::TaskNotFound);
    }

    #[test]
    fn test_stats_reflect_finished_sessions() {
        let (mut state, write, walk) = state_with_tasks();
        let now = Utc::now();
        state.finish_task(write, 30 * 60, now);
        state.finish_task(walk, 10 * 60, now);

        let report = state.stats(StatsWindow::Today, &now);
        assert_eq!(report.summary.total_minutes, 40);
        assert_eq!(report.summary.work_minutes, 30);
        assert_eq!(report.summary.work_percentage(), 75);
    }
}
