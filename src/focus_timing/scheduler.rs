//! One-second tick scheduling for the session clock
//!
//! The clock never spawns timers itself; it is handed a [`TickScheduler`] and
//! keeps the returned [`TickHandle`] for as long as it is running. Dropping or
//! cancelling the handle stops further callbacks.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Cadence of clock ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Callback invoked on every tick
pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Cancellation handle for a scheduled tick stream
///
/// Cancels on drop, so a handle can never leak a running tick source.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TickHandle {
    /// Create a handle that runs `cancel` exactly once
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the tick stream now
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Capability to run a callback once per second until cancelled
pub trait TickScheduler: Send + Sync {
    /// Start invoking `callback` every second; the first call happens one
    /// period from now
    fn schedule_every_second(&self, callback: TickCallback) -> TickHandle;
}

/// Scheduler backed by a tokio interval task
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler that spawns onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime the caller is running on
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule_every_second(&self, mut callback: TickCallback) -> TickHandle {
        let task = self.handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            // After a stall, keep one-second spacing instead of bursting
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                callback();
            }
        });

        TickHandle::new(move || task.abort())
    }
}
