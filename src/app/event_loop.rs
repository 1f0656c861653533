//! Main event loop
//!
//! Runs one focus session: terminal input lines, clock ticks and quote
//! results all arrive on this loop, so the session is only ever touched from
//! one place.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::assist::Assistant;
use crate::focus_timing::{FinishOutcome, TickNotifier, TickOutcome};
use crate::task::TaskId;

use super::session::{FocusCommand, FocusSession, FocusSessionId};
use super::view::{render_session_status, render_task_detail};
use super::App;

/// How a focus session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusExit {
    /// The task was completed; carries what the accountant did
    Finished(FinishOutcome),
    /// The user left without completing the task
    Cancelled,
    /// No open task with that id
    TaskNotFound,
}

const HELP: &str = "Enter/p: start or pause   +/-: adjust   1-9: tick a step   d: done   q: quit";

/// Apply one command to the session
///
/// Returns `Some` when the command ends the session.
pub fn handle_focus_command(
    app: &mut App,
    session: &mut FocusSession,
    command: FocusCommand,
) -> Option<FocusExit> {
    match command {
        FocusCommand::Toggle => {
            let running = session.clock_mut().toggle();
            tracing::debug!(running, "Focus clock toggled");
        }
        FocusCommand::Extend | FocusCommand::Shorten => {
            let step = i64::from(app.config.adjust_step_minutes);
            let delta = if command == FocusCommand::Extend {
                step
            } else {
                -step
            };
            if session.adjust(delta) {
                app.alert();
            }
        }
        FocusCommand::ToggleSubTask(position) => {
            let task_id = session.task_id();
            if app.toggle_sub_task(task_id, position) {
                if let Some(task) = app.state.task(task_id) {
                    session.refresh_task(task);
                }
            }
        }
        FocusCommand::Done => {
            session.clock_mut().pause();
            let outcome = app.finish_task(session.task_id(), session.elapsed_secs());
            return Some(FocusExit::Finished(outcome));
        }
        FocusCommand::Cancel => {
            session.clock_mut().pause();
            tracing::info!(task = %session.task().title, "Focus session cancelled");
            return Some(FocusExit::Cancelled);
        }
    }
    None
}

/// Fetch a quote in the background and address it to `session_id`
fn spawn_quote(
    assistant: Arc<Assistant>,
    session_id: FocusSessionId,
    tx: mpsc::UnboundedSender<(FocusSessionId, String)>,
) {
    tokio::spawn(async move {
        let quote = assistant.quote().await;
        // Receiver is gone once the session has ended
        let _ = tx.send((session_id, quote));
    });
}

fn print_status(session: &FocusSession) {
    print!("\r{}   ", render_session_status(session));
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("Failed to flush status line: {}", e);
    }
}

/// Run an interactive focus session for `task_id`
pub async fn run_focus(app: &mut App, task_id: TaskId) -> Result<FocusExit> {
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<u64>();
    let on_tick: TickNotifier = Arc::new(move |generation: u64| {
        let _ = tick_tx.send(generation);
    });

    let Some(mut session) = app.open_session(task_id, on_tick) else {
        return Ok(FocusExit::TaskNotFound);
    };

    let (quote_tx, mut quote_rx) = mpsc::unbounded_channel();
    spawn_quote(app.assistant(), session.id(), quote_tx);

    println!("{}", render_task_detail(session.task()));
    println!("\"{}\"", session.quote());
    println!("{}", HELP);

    session.clock_mut().start();
    print_status(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    tracing::info!("Input closed, leaving focus session");
                    return Ok(FocusExit::Cancelled);
                };

                match FocusCommand::parse(&line) {
                    Some(command) => {
                        if let Some(exit) = handle_focus_command(app, &mut session, command) {
                            println!();
                            return Ok(exit);
                        }
                        if matches!(command, FocusCommand::ToggleSubTask(_)) {
                            println!("{}", render_task_detail(session.task()));
                        }
                    }
                    None => println!("{}", HELP),
                }
                print_status(&session);
            }
            Some(generation) = tick_rx.recv() => {
                match session.handle_tick(generation) {
                    TickOutcome::Expired => {
                        app.alert();
                        print_status(&session);
                        println!("\nTime's up. Press d to record it, or + to keep going.");
                    }
                    TickOutcome::Counted => print_status(&session),
                    TickOutcome::Ignored => {}
                }
            }
            Some((session_id, quote)) = quote_rx.recv() => {
                if session.accept_quote(session_id, quote) {
                    println!("\n\"{}\"", session.quote());
                    print_status(&session);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.clock_mut().pause();
                tracing::info!("Interrupted, leaving focus session");
                println!();
                return Ok(FocusExit::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::test_app;
    use crate::focus_timing::scheduler::testing::ManualScheduler;
    use crate::task::{Category, Priority};
    use tempfile::TempDir;

    fn open(app: &mut App, minutes: u32) -> FocusSession {
        let id = app
            .add_task("Focus target", Priority::Critical, Category::Work, Some(minutes))
            .unwrap();
        app.open_session(id, Arc::new(|_: u64| {})).unwrap()
    }

    #[test]
    fn test_done_after_ticks_records_rounded_minutes() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        let mut session = open(&mut app, 25);

        assert!(handle_focus_command(&mut app, &mut session, FocusCommand::Toggle).is_none());
        assert!(session.clock().is_running());
        let run = session.clock().generation();
        for _ in 0..61 {
            session.handle_tick(run);
        }

        let exit = handle_focus_command(&mut app, &mut session, FocusCommand::Done).unwrap();
        match exit {
            FocusExit::Finished(FinishOutcome::Recorded(record)) => {
                assert_eq!(record.duration_minutes, 2);
                assert_eq!(record.task_title, "Focus target");
            }
            other => panic!("unexpected exit: {:?}", other),
        }
        assert_eq!(scheduler.active(), 0);
        assert_eq!(app.state().history.len(), 1);
    }

    #[test]
    fn test_done_without_elapsed_time_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        let mut session = open(&mut app, 25);

        let exit = handle_focus_command(&mut app, &mut session, FocusCommand::Done);
        assert_eq!(
            exit,
            Some(FocusExit::Finished(FinishOutcome::CompletedWithoutRecord))
        );
        assert!(app.state().history.is_empty());
        assert!(app.state().task(session.task_id()).unwrap().completed);
    }

    #[test]
    fn test_cancel_leaves_task_open() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        let mut session = open(&mut app, 25);
        handle_focus_command(&mut app, &mut session, FocusCommand::Toggle);
        let run = session.clock().generation();
        session.handle_tick(run);

        let exit = handle_focus_command(&mut app, &mut session, FocusCommand::Cancel);
        assert_eq!(exit, Some(FocusExit::Cancelled));
        assert_eq!(scheduler.active(), 0);
        assert!(!app.state().task(session.task_id()).unwrap().completed);
        assert!(app.state().history.is_empty());
    }

    #[test]
    fn test_pause_resume_drops_tick_from_paused_run() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        let mut session = open(&mut app, 1);

        handle_focus_command(&mut app, &mut session, FocusCommand::Toggle);
        let paused_run = session.clock().generation();
        handle_focus_command(&mut app, &mut session, FocusCommand::Toggle);
        handle_focus_command(&mut app, &mut session, FocusCommand::Toggle);
        assert!(session.clock().is_running());

        // Tick queued before the pause, read after the resume
        assert_eq!(session.handle_tick(paused_run), TickOutcome::Ignored);
        assert_eq!(session.clock().remaining_secs(), 60);
        assert_eq!(session.elapsed_secs(), 0);

        let run = session.clock().generation();
        assert_eq!(session.handle_tick(run), TickOutcome::Counted);
        assert_eq!(session.clock().remaining_secs(), 59);
    }

    #[test]
    fn test_adjust_uses_configured_step() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        app.config.adjust_step_minutes = 10;
        let mut session = open(&mut app, 25);

        handle_focus_command(&mut app, &mut session, FocusCommand::Extend);
        assert_eq!(session.clock().remaining_secs(), 35 * 60);
        assert_eq!(session.clock().initial_secs(), 35 * 60);

        for _ in 0..4 {
            handle_focus_command(&mut app, &mut session, FocusCommand::Shorten);
        }
        assert_eq!(session.clock().remaining_secs(), 0);
        // Paused clock reaching zero is not an expiry
        assert!(!session.is_expired());
    }

    #[test]
    fn test_sub_task_toggle_refreshes_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);
        let id = app
            .add_task("Tidy desk", Priority::Optional, Category::Personal, Some(15))
            .unwrap();
        tokio_test::block_on(app.break_down(id));
        let mut session = app.open_session(id, Arc::new(|_: u64| {})).unwrap();

        handle_focus_command(&mut app, &mut session, FocusCommand::ToggleSubTask(1));
        assert!(session.task().sub_tasks[0].completed);
        assert!(app.state().task(id).unwrap().sub_tasks[0].completed);
    }

    #[tokio::test]
    async fn test_run_focus_unknown_task() {
        let temp_dir = TempDir::new().unwrap();
        let scheduler = ManualScheduler::new();
        let mut app = test_app(&temp_dir, &scheduler);

        let exit = run_focus(&mut app, uuid::Uuid::new_v4()).await.unwrap();
        assert_eq!(exit, FocusExit::TaskNotFound);
    }
}
