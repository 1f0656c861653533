//! Focus timing module for countdown sessions and their history
//!
//! This module provides functionality for:
//! - A per-task countdown clock driven by an injected tick scheduler
//! - Turning a finished run into a history record
//! - Windowed statistics over the recorded history

pub mod accountant;
pub mod scheduler;
pub mod stats;
pub mod store;

pub use accountant::{finish, minutes_spent, FinishOutcome};
pub use scheduler::{TickCallback, TickHandle, TickScheduler, TokioScheduler};
pub use stats::{CompletedSession, SessionId, StatsReport, StatsWindow};
pub use store::HistoryStore;

use std::sync::Arc;

/// Called from the scheduler on every tick with the generation of the run
/// that produced it; should hand both back to the event loop that owns the
/// clock
pub type TickNotifier = Arc<dyn Fn(u64) + Send + Sync + 'static>;

/// Observable state of a session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Counting down
    Running,
    /// Stopped, either by the user or by reaching zero
    Paused,
}

/// Result of delivering one tick to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock was paused, already at zero, or the tick came from an earlier
    /// run; nothing changed
    Ignored,
    /// One second was taken off, time remains
    Counted,
    /// This tick reached zero and the clock paused itself
    Expired,
}

/// Countdown for a single focus session
///
/// Holds a tick handle exactly while running. Pausing, expiring and dropping
/// the clock all release it, which stops the scheduler's callback. Each start
/// bumps the generation, so ticks already queued by a cancelled run are
/// rejected after a resume.
pub struct SessionClock {
    remaining_secs: u64,
    initial_secs: u64,
    generation: u64,
    ticker: Option<TickHandle>,
    scheduler: Arc<dyn TickScheduler>,
    on_tick: TickNotifier,
}

impl SessionClock {
    /// Create a paused clock with `initial_secs` on it
    pub fn new(
        initial_secs: u64,
        scheduler: Arc<dyn TickScheduler>,
        on_tick: TickNotifier,
    ) -> Self {
        Self {
            remaining_secs: initial_secs,
            initial_secs,
            generation: 0,
            ticker: None,
            scheduler,
            on_tick,
        }
    }

    /// Create a paused clock for a task estimate in minutes
    pub fn for_minutes(
        minutes: u32,
        scheduler: Arc<dyn TickScheduler>,
        on_tick: TickNotifier,
    ) -> Self {
        Self::new(u64::from(minutes) * 60, scheduler, on_tick)
    }

    /// Start counting down
    ///
    /// Does nothing if already running or if no time is left. Returns true if
    /// the clock was started by this call.
    pub fn start(&mut self) -> bool {
        if self.ticker.is_some() || self.remaining_secs == 0 {
            return false;
        }

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let on_tick = Arc::clone(&self.on_tick);
        self.ticker = Some(
            self.scheduler
                .schedule_every_second(Box::new(move || on_tick(generation))),
        );
        true
    }

    /// Stop counting down; always valid
    pub fn pause(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    /// Start if paused, pause if running
    ///
    /// Returns whether the clock is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.pause();
        } else {
            self.start();
        }
        self.is_running()
    }

    /// Take one second off the clock for a tick from run `generation`
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if !self.is_running() || self.remaining_secs == 0 {
            return TickOutcome::Ignored;
        }
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "Dropping stale tick");
            return TickOutcome::Ignored;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.pause();
            TickOutcome::Expired
        } else {
            TickOutcome::Counted
        }
    }

    /// Add or remove whole minutes
    ///
    /// Remaining time clamps at zero. Extending past the baseline raises the
    /// baseline so progress never exceeds 100%. Returns true if this drove a
    /// running clock to zero, which counts as expiry.
    pub fn adjust(&mut self, delta_minutes: i64) -> bool {
        let current = i64::try_from(self.remaining_secs).unwrap_or(i64::MAX);
        let adjusted = current.saturating_add(delta_minutes.saturating_mul(60)).max(0);
        // adjusted is non-negative here
        self.remaining_secs = adjusted as u64;

        if self.remaining_secs > self.initial_secs {
            self.initial_secs = self.remaining_secs;
        }

        if self.remaining_secs == 0 && self.is_running() {
            self.pause();
            return true;
        }
        false
    }

    /// Check if the clock is counting down
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Generation of the current (or most recent) run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current state
    pub fn state(&self) -> ClockState {
        if self.is_running() {
            ClockState::Running
        } else {
            ClockState::Paused
        }
    }

    /// Seconds left on the clock
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Baseline the progress and elapsed time are measured against
    pub fn initial_secs(&self) -> u64 {
        self.initial_secs
    }

    /// Time spent so far, as measured against the baseline
    pub fn elapsed_secs(&self) -> u64 {
        self.initial_secs.saturating_sub(self.remaining_secs)
    }

    /// Fraction of the baseline used up, in [0, 1]
    pub fn progress_ratio(&self) -> f64 {
        if self.initial_secs == 0 {
            return 0.0;
        }
        self.elapsed_secs() as f64 / self.initial_secs as f64
    }

    /// Format remaining time as M:SS
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

impl std::fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClock")
            .field("remaining_secs", &self.remaining_secs)
            .field("initial_secs", &self.initial_secs)
            .field("generation", &self.generation)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Format seconds as M:SS with unpadded minutes
pub fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
