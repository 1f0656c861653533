//! Focus session host
//!
//! Pairs a task snapshot with its countdown clock and the quote shown while
//! focusing. Each session gets a fresh id; collaborator results addressed to
//! any other id are stale and dropped.

use std::sync::Arc;

use uuid::Uuid;

use crate::assist::DEFAULT_QUOTE;
use crate::focus_timing::{SessionClock, TickNotifier, TickOutcome, TickScheduler};
use crate::task::{Task, TaskId};

/// Token identifying one focus session
pub type FocusSessionId = Uuid;

/// Commands accepted while a session is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCommand {
    /// Start or pause the clock
    Toggle,
    /// Add one adjustment step
    Extend,
    /// Remove one adjustment step
    Shorten,
    /// Flip the n-th subtask (1-based)
    ToggleSubTask(usize),
    /// Finish the task and record the time spent
    Done,
    /// Leave without recording anything
    Cancel,
}

impl FocusCommand {
    /// Parse one line of input; unknown input yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" | "p" | "P" => Some(FocusCommand::Toggle),
            "+" => Some(FocusCommand::Extend),
            "-" => Some(FocusCommand::Shorten),
            "d" | "D" => Some(FocusCommand::Done),
            "q" | "Q" => Some(FocusCommand::Cancel),
            _ => line
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(FocusCommand::ToggleSubTask),
        }
    }
}

/// One run of the focus timer against a single task
#[derive(Debug)]
pub struct FocusSession {
    id: FocusSessionId,
    task: Task,
    clock: SessionClock,
    quote: String,
    expired: bool,
}

impl FocusSession {
    /// Open a session for `task` with a paused clock set to its estimate
    pub fn new(task: Task, scheduler: Arc<dyn TickScheduler>, on_tick: TickNotifier) -> Self {
        let clock = SessionClock::new(task.estimated_secs(), scheduler, on_tick);
        Self {
            id: Uuid::new_v4(),
            task,
            clock,
            quote: DEFAULT_QUOTE.to_string(),
            expired: false,
        }
    }

    /// Session token
    pub fn id(&self) -> FocusSessionId {
        self.id
    }

    /// Snapshot of the task taken when the session opened
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Id of the task being focused on
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    /// Refresh the task snapshot, e.g. after a subtask toggle
    pub fn refresh_task(&mut self, task: &Task) {
        if task.id == self.task.id {
            self.task = task.clone();
        }
    }

    /// The countdown
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Mutable access to the countdown
    pub fn clock_mut(&mut self) -> &mut SessionClock {
        &mut self.clock
    }

    /// Quote currently shown
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Check if the clock has run out since the session opened
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Accept a quote addressed to `session_id`
    ///
    /// Returns false and keeps the current quote if the result is stale.
    pub fn accept_quote(&mut self, session_id: FocusSessionId, quote: String) -> bool {
        if session_id != self.id {
            tracing::debug!(%session_id, "Discarding quote for a previous session");
            return false;
        }
        self.quote = quote;
        true
    }

    /// Deliver one scheduler tick, tagged with the run that produced it
    pub fn handle_tick(&mut self, generation: u64) -> TickOutcome {
        let outcome = self.clock.tick(generation);
        if outcome == TickOutcome::Expired {
            self.mark_expired();
        }
        outcome
    }

    /// Shift the clock by whole minutes; returns true if this expired it
    pub fn adjust(&mut self, delta_minutes: i64) -> bool {
        let expired = self.clock.adjust(delta_minutes);
        if expired {
            self.mark_expired();
        }
        expired
    }

    fn mark_expired(&mut self) {
        self.expired = true;
        tracing::info!(task = %self.task.title, "Focus timer expired");
    }

    /// Seconds to charge if the session were finished now
    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus_timing::scheduler::testing::ManualScheduler;
    use crate::task::{Category, Priority};

    fn session(minutes: u32, scheduler: &ManualScheduler) -> FocusSession {
        let task = Task::new("Deep work", Priority::Critical, Category::Work, minutes).unwrap();
        FocusSession::new(task, Arc::new(scheduler.clone()), Arc::new(|_: u64| {}))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(FocusCommand::parse(""), Some(FocusCommand::Toggle));
        assert_eq!(FocusCommand::parse(" p "), Some(FocusCommand::Toggle));
        assert_eq!(FocusCommand::parse("+"), Some(FocusCommand::Extend));
        assert_eq!(FocusCommand::parse("-"), Some(FocusCommand::Shorten));
        assert_eq!(FocusCommand::parse("d"), Some(FocusCommand::Done));
        assert_eq!(FocusCommand::parse("q"), Some(FocusCommand::Cancel));
        assert_eq!(FocusCommand::parse("2"), Some(FocusCommand::ToggleSubTask(2)));
        assert_eq!(FocusCommand::parse("0"), None);
        assert_eq!(FocusCommand::parse("later"), None);
    }

    #[test]
    fn test_new_session_is_paused_at_estimate() {
        let scheduler = ManualScheduler::new();
        let session = session(25, &scheduler);

        assert!(!session.clock().is_running());
        assert_eq!(session.clock().remaining_secs(), 1500);
        assert_eq!(session.quote(), DEFAULT_QUOTE);
        assert!(!session.is_expired());
        assert_eq!(scheduler.scheduled(), 0);
    }

    #[test]
    fn test_stale_quote_is_discarded() {
        let scheduler = ManualScheduler::new();
        let mut session = session(25, &scheduler);

        assert!(!session.accept_quote(Uuid::new_v4(), "Old news.".to_string()));
        assert_eq!(session.quote(), DEFAULT_QUOTE);

        let id = session.id();
        assert!(session.accept_quote(id, "Now or never.".to_string()));
        assert_eq!(session.quote(), "Now or never.");
    }

    #[test]
    fn test_ticks_to_expiry() {
        let scheduler = ManualScheduler::new();
        let mut session = session(1, &scheduler);
        session.clock_mut().start();
        let run = session.clock().generation();

        for _ in 0..59 {
            assert_eq!(session.handle_tick(run), TickOutcome::Counted);
        }
        assert_eq!(session.handle_tick(run), TickOutcome::Expired);
        assert!(session.is_expired());
        assert_eq!(session.elapsed_secs(), 60);
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_adjust_to_zero_while_running_expires() {
        let scheduler = ManualScheduler::new();
        let mut session = session(5, &scheduler);
        session.clock_mut().start();
        let run = session.clock().generation();
        session.handle_tick(run);

        assert!(session.adjust(-10));
        assert!(session.is_expired());
        assert!(!session.clock().is_running());
    }

    #[test]
    fn test_dropping_session_cancels_ticks() {
        let scheduler = ManualScheduler::new();
        {
            let mut session = session(25, &scheduler);
            session.clock_mut().start();
            assert_eq!(scheduler.active(), 1);
        }
        assert_eq!(scheduler.active(), 0);
    }
}
