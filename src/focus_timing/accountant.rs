//! Session accounting
//!
//! Turns a finished (or skipped) timer run into at most one history record
//! and flags the task completed.

use chrono::{DateTime, Utc};

use crate::task::{Task, TaskId};

use super::stats::CompletedSession;

/// What `finish` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Task flagged completed and a history record appended
    Recorded(CompletedSession),
    /// Task flagged completed; no time was spent, so nothing was recorded
    CompletedWithoutRecord,
    /// No task with that id; nothing changed
    TaskNotFound,
}

impl FinishOutcome {
    /// The appended record, if any
    pub fn record(&self) -> Option<&CompletedSession> {
        match self {
            FinishOutcome::Recorded(session) => Some(session),
            _ => None,
        }
    }

    /// Check if the task was found and flagged
    pub fn is_completed(&self) -> bool {
        !matches!(self, FinishOutcome::TaskNotFound)
    }
}

/// Whole minutes charged for `elapsed_secs`
///
/// Rounds up, so any nonzero time counts as at least a minute.
pub fn minutes_spent(elapsed_secs: u64) -> u32 {
    u32::try_from(elapsed_secs.div_ceil(60)).unwrap_or(u32::MAX)
}

/// Complete a task and record the time spent on it
///
/// `elapsed_secs` of zero is the quick-complete path: the task is flagged but
/// no record is made. Calling this twice for the same task appends a second
/// record; callers are expected not to.
pub fn finish(
    tasks: &mut [Task],
    history: &mut Vec<CompletedSession>,
    task_id: TaskId,
    elapsed_secs: u64,
    now: DateTime<Utc>,
) -> FinishOutcome {
    let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
        tracing::debug!(%task_id, "Finish requested for unknown task");
        return FinishOutcome::TaskNotFound;
    };

    let minutes = minutes_spent(elapsed_secs);
    let record = CompletedSession::from_task(task, minutes, now);
    task.completed = true;

    match record {
        Some(session) => {
            tracing::info!(
                task = %task.title,
                minutes = session.duration_minutes,
                "Recorded focus session"
            );
            history.push(session.clone());
            FinishOutcome::Recorded(session)
        }
        None => {
            tracing::info!(task = %task.title, "Task completed without tracked time");
            FinishOutcome::CompletedWithoutRecord
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Priority};
    use uuid::Uuid;

    fn setup() -> (Vec<Task>, Vec<CompletedSession>) {
        let tasks = vec![
            Task::new("Write docs", Priority::Important, Category::Work, 25).unwrap(),
            Task::new("Stretch", Priority::Optional, Category::Personal, 10).unwrap(),
        ];
        (tasks, Vec::new())
    }

    #[test]
    fn test_minutes_spent_rounds_up() {
        assert_eq!(minutes_spent(0), 0);
        assert_eq!(minutes_spent(1), 1);
        assert_eq!(minutes_spent(59), 1);
        assert_eq!(minutes_spent(60), 1);
        assert_eq!(minutes_spent(61), 2);
        assert_eq!(minutes_spent(1500), 25);
    }

    #[test]
    fn test_minutes_spent_at_least_one_for_any_time() {
        for secs in 1..=600 {
            let minutes = minutes_spent(secs);
            assert!(minutes >= 1);
            assert_eq!(u64::from(minutes), (secs + 59) / 60);
        }
    }

    #[test]
    fn test_finish_records_session() {
        let (mut tasks, mut history) = setup();
        let id = tasks[0].id;
        let now = Utc::now();

        let outcome = finish(&mut tasks, &mut history, id, 61, now);

        let session = outcome.record().unwrap();
        assert_eq!(session.duration_minutes, 2);
        assert_eq!(session.task_id, id);
        assert_eq!(session.task_title, "Write docs");
        assert_eq!(session.category, Category::Work);
        assert_eq!(session.completed_at, now);
        assert_eq!(history.len(), 1);
        assert_eq!(&history[0], session);
        assert!(tasks[0].completed);
        assert!(!tasks[1].completed);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn test_finish_zero_elapsed_completes_without_record() {
        let (mut tasks, mut history) = setup();
        let id = tasks[1].id;

        let outcome = finish(&mut tasks, &mut history, id, 0, Utc::now());

        assert_eq!(outcome, FinishOutcome::CompletedWithoutRecord);
        assert!(outcome.is_completed());
        assert!(history.is_empty());
        assert!(tasks[1].completed);
    }

    #[test]
    fn test_finish_unknown_task_is_noop() {
        let (mut tasks, mut history) = setup();
        let before = tasks.clone();

        let outcome = finish(&mut tasks, &mut history, Uuid::new_v4(), 300, Utc::now());

        assert_eq!(outcome, FinishOutcome::TaskNotFound);
        assert!(!outcome.is_completed());
        assert!(history.is_empty());
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_record_snapshot_survives_task_edits() {
        let (mut tasks, mut history) = setup();
        let id = tasks[0].id;
        finish(&mut tasks, &mut history, id, 120, Utc::now());

        tasks[0].title = "Renamed".to_string();
        tasks[0].category = Category::Personal;

        assert_eq!(history[0].task_title, "Write docs");
        assert_eq!(history[0].category, Category::Work);
    }

    #[test]
    fn test_finish_twice_appends_second_record() {
        let (mut tasks, mut history) = setup();
        let id = tasks[0].id;

        finish(&mut tasks, &mut history, id, 600, Utc::now());
        let second = finish(&mut tasks, &mut history, id, 30, Utc::now());

        assert!(tasks[0].completed);
        assert_eq!(second.record().map(|s| s.duration_minutes), Some(1));
        assert_eq!(history.len(), 2);
    }
}
