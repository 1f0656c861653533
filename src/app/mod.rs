//! Application state and main event loop
//!
//! This module contains the central application state, the focus session
//! host, and the event loop that drives a session from terminal input, clock
//! ticks and assistant results.

// Submodules
mod event_loop;
mod session;
mod state;
pub mod view;

// Re-exports from submodules
pub use event_loop::{handle_focus_command, run_focus, FocusExit};
pub use session::{FocusCommand, FocusSession, FocusSessionId};
pub use state::{AppState, TaskLookup};

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::assist::Assistant;
use crate::config::Config;
use crate::focus_timing::{FinishOutcome, HistoryStore, TickNotifier, TickScheduler, TokioScheduler};
use crate::task::{self, Category, Priority, TaskId, TaskStore};

/// Main application struct
pub struct App {
    /// Application configuration
    pub(crate) config: Config,
    /// Tasks and history
    pub(crate) state: AppState,
    /// Task persistence
    task_store: TaskStore,
    /// History persistence
    history_store: HistoryStore,
    /// AI collaborator, shared with spawned requests
    assistant: Arc<Assistant>,
    /// Drives session clocks
    scheduler: Arc<dyn TickScheduler>,
}

impl App {
    /// Create the application from the default data directory
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let scheduler = TokioScheduler::current().context("No tokio runtime for the focus clock")?;
        let assistant = Assistant::from_config(&config.assist);

        Self::with_parts(
            config,
            TaskStore::new(),
            HistoryStore::new(),
            assistant,
            Arc::new(scheduler),
        )
    }

    /// Create the application from explicit collaborators
    pub fn with_parts(
        config: Config,
        task_store: TaskStore,
        history_store: HistoryStore,
        assistant: Assistant,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Result<Self> {
        let tasks = task_store.load()?;
        let history = history_store.load()?;
        tracing::debug!(
            "Loaded {} tasks, {} history records",
            tasks.len(),
            history.len()
        );

        Ok(Self {
            config,
            state: AppState::new(tasks, history),
            task_store,
            history_store,
            assistant: Arc::new(assistant),
            scheduler,
        })
    }

    /// Current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the assistant
    pub fn assistant(&self) -> Arc<Assistant> {
        Arc::clone(&self.assistant)
    }

    /// Add a task and persist; `None` when the title is blank
    pub fn add_task(
        &mut self,
        title: &str,
        priority: Priority,
        category: Category,
        estimated_minutes: Option<u32>,
    ) -> Option<TaskId> {
        let minutes = estimated_minutes.unwrap_or(self.config.default_focus_minutes);
        let id = self.state.add_task(title, priority, category, minutes)?;
        self.save_tasks();
        Some(id)
    }

    /// Update an estimate and persist if it changed
    pub fn set_estimate(&mut self, task_id: TaskId, minutes: i64) -> bool {
        let changed = self.state.set_estimate(task_id, minutes);
        if changed {
            self.save_tasks();
        }
        changed
    }

    /// Toggle the `position`-th subtask (1-based) and persist
    pub fn toggle_sub_task(&mut self, task_id: TaskId, position: usize) -> bool {
        let sub_task_id = self
            .state
            .task(task_id)
            .and_then(|t| t.sub_tasks.get(position.checked_sub(1)?))
            .map(|st| st.id);

        let toggled = sub_task_id
            .map(|id| self.state.toggle_sub_task(task_id, id))
            .unwrap_or(false);
        if toggled {
            self.save_tasks();
        }
        toggled
    }

    /// Ask the assistant for steps and store them on the task
    ///
    /// Returns the number of steps stored, or `None` if the task disappeared
    /// while waiting.
    pub async fn break_down(&mut self, task_id: TaskId) -> Option<usize> {
        let title = self.state.task(task_id)?.title.clone();
        let steps = self.assistant.break_down_task(&title).await;
        let count = steps.len();

        if self.state.apply_breakdown(task_id, steps) {
            self.save_tasks();
            Some(count)
        } else {
            None
        }
    }

    /// Mark a task completed without recording time
    pub fn quick_complete(&mut self, task_id: TaskId) -> FinishOutcome {
        let outcome = self.state.quick_complete(task_id);
        if outcome.is_completed() {
            self.save_tasks();
        }
        outcome
    }

    /// Complete a task, recording `elapsed_secs` against it
    pub fn finish_task(&mut self, task_id: TaskId, elapsed_secs: u64) -> FinishOutcome {
        let outcome = self
            .state
            .finish_task(task_id, elapsed_secs, task::now_millis());
        if outcome.is_completed() {
            self.save_tasks();
        }
        if outcome.record().is_some() {
            self.save_history();
        }
        outcome
    }

    /// Open a focus session for an open task
    pub fn open_session(&self, task_id: TaskId, on_tick: TickNotifier) -> Option<FocusSession> {
        let task = self.state.task(task_id).filter(|t| !t.completed)?;
        tracing::info!(
            task = %task.title,
            minutes = task.estimated_minutes,
            "Focus session opened"
        );
        Some(FocusSession::new(
            task.clone(),
            Arc::clone(&self.scheduler),
            on_tick,
        ))
    }

    /// Signal timer expiry to the user
    pub fn alert(&self) {
        if self.config.bell_enabled() {
            print!("\x07");
            if let Err(e) = std::io::Write::flush(&mut std::io::stdout()) {
                tracing::debug!("Failed to ring bell: {}", e);
            }
        }
    }

    fn save_tasks(&self) {
        if let Err(e) = self.task_store.save(&self.state.tasks) {
            tracing::error!("Failed to save tasks: {:#}", e);
        }
    }

    fn save_history(&self) {
        if let Err(e) = self.history_store.save(&self.state.history) {
            tracing::error!("Failed to save history: {:#}", e);
        }
    }
}
