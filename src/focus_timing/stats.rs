//! Statistics calculations for focus history
//!
//! Provides the history record type, calendar windows over the history, and
//! the per-category totals and per-day grouping shown for a window.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{Category, Task, TaskId};

/// Unique identifier for a history record
pub type SessionId = Uuid;

/// A completed focus session record
///
/// Title and category are copied from the task when the record is made and do
/// not follow later edits. The task reference is weak: the task may change or
/// disappear without invalidating the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    /// Unique identifier for this record
    pub id: SessionId,
    /// Task the time was spent on
    pub task_id: TaskId,
    /// Task title at completion time
    pub task_title: String,
    /// Task category at completion time
    pub category: Category,
    /// Whole minutes spent, at least 1
    pub duration_minutes: u32,
    /// When the session was recorded
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub completed_at: DateTime<Utc>,
}

impl CompletedSession {
    /// Snapshot a task into a new record
    ///
    /// Returns `None` for a zero duration; such completions are not recorded.
    pub fn from_task(task: &Task, duration_minutes: u32, completed_at: DateTime<Utc>) -> Option<Self> {
        if duration_minutes == 0 {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            task_id: task.id,
            task_title: task.title.clone(),
            category: task.category,
            duration_minutes,
            completed_at,
        })
    }
}

/// Relative calendar period for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatsWindow {
    /// Since local midnight
    Today,
    /// Today and the six days before it
    #[default]
    Last7Days,
    /// Today and the 29 days before it
    Last30Days,
}

impl StatsWindow {
    /// Whole days before today included in the window
    pub fn days_before_today(&self) -> i64 {
        match self {
            StatsWindow::Today => 0,
            StatsWindow::Last7Days => 6,
            StatsWindow::Last30Days => 29,
        }
    }

    /// Earliest instant included in the window
    pub fn start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        start_of_day(now) - Duration::days(self.days_before_today())
    }

    /// Check if a timestamp falls inside the window
    pub fn contains<Tz: TimeZone>(&self, at: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        at >= self.start(now)
    }

    /// Short label (1D/7D/30D)
    pub fn short_label(&self) -> &'static str {
        match self {
            StatsWindow::Today => "1D",
            StatsWindow::Last7Days => "7D",
            StatsWindow::Last30Days => "30D",
        }
    }

    /// Get the display name for this window
    pub fn display_name(&self) -> &'static str {
        match self {
            StatsWindow::Today => "Today",
            StatsWindow::Last7Days => "Last 7 days",
            StatsWindow::Last30Days => "Last 30 days",
        }
    }
}

impl FromStr for StatsWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "day" | "1d" => Ok(StatsWindow::Today),
            "week" | "7d" => Ok(StatsWindow::Last7Days),
            "month" | "30d" => Ok(StatsWindow::Last30Days),
            other => Err(format!(
                "unknown window '{}' (expected today, week or month)",
                other
            )),
        }
    }
}

impl std::fmt::Display for StatsWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Local midnight of the day `now` falls on, as a UTC instant
///
/// When a DST jump skips midnight, the day starts at the first local minute
/// that exists after the gap.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let tz = now.timezone();
    (0..MINUTES_PER_DAY)
        .map(|minute| midnight + Duration::minutes(minute))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}

/// Records inside the window, newest first
pub fn filter_window<'a, Tz: TimeZone>(
    history: &'a [CompletedSession],
    window: StatsWindow,
    now: &DateTime<Tz>,
) -> Vec<&'a CompletedSession> {
    let start = window.start(now);
    let mut sessions: Vec<&CompletedSession> =
        history.iter().filter(|s| s.completed_at >= start).collect();
    sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    sessions
}

/// Totals over a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    /// Number of records
    pub session_count: usize,
    /// Minutes across all records
    pub total_minutes: u64,
    /// Minutes in Work records
    pub work_minutes: u64,
    /// Minutes in Personal records
    pub personal_minutes: u64,
}

impl PeriodSummary {
    /// Add a record to the totals
    pub fn add_session(&mut self, session: &CompletedSession) {
        let minutes = u64::from(session.duration_minutes);
        self.session_count += 1;
        self.total_minutes += minutes;
        match session.category {
            Category::Work => self.work_minutes += minutes,
            Category::Personal => self.personal_minutes += minutes,
        }
    }

    /// Sum a sequence of records
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a CompletedSession>,
    {
        let mut summary = Self::default();
        for session in sessions {
            summary.add_session(session);
        }
        summary
    }

    /// Fraction of the time spent on work, 0 when nothing was recorded
    pub fn work_share(&self) -> f64 {
        if self.total_minutes == 0 {
            return 0.0;
        }
        self.work_minutes as f64 / self.total_minutes as f64
    }

    /// Work share as a whole percentage
    pub fn work_percentage(&self) -> u32 {
        (self.work_share() * 100.0).round() as u32
    }

    /// Personal share as a whole percentage
    ///
    /// Complements [`work_percentage`](Self::work_percentage) so the two
    /// always add up to 100 when anything was recorded.
    pub fn personal_percentage(&self) -> u32 {
        if self.total_minutes == 0 {
            return 0;
        }
        100u32.saturating_sub(self.work_percentage())
    }

    /// Format the total as a human-readable string
    pub fn format_total(&self) -> String {
        format_minutes(self.total_minutes)
    }
}

/// Records completed on one local calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup<'a> {
    /// Local calendar day
    pub date: NaiveDate,
    /// "Today", "Yesterday", or weekday plus date
    pub label: String,
    /// Records of that day, in input order
    pub sessions: Vec<&'a CompletedSession>,
}

impl DayGroup<'_> {
    /// Minutes recorded on this day
    pub fn total_minutes(&self) -> u64 {
        self.sessions
            .iter()
            .map(|s| u64::from(s.duration_minutes))
            .sum()
    }
}

/// Label for a calendar day relative to today
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%A %-d %b").to_string()
    }
}

/// Bucket records by the local calendar day they were completed on
///
/// Buckets appear in the order their first record appears, so a newest-first
/// input yields newest-day-first buckets.
pub fn group_by_day<'a, Tz: TimeZone>(
    sessions: &[&'a CompletedSession],
    now: &DateTime<Tz>,
) -> Vec<DayGroup<'a>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut groups: Vec<DayGroup<'a>> = Vec::new();

    for &session in sessions {
        let date = session.completed_at.with_timezone(&tz).date_naive();
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.sessions.push(session),
            None => groups.push(DayGroup {
                date,
                label: day_label(date, today),
                sessions: vec![session],
            }),
        }
    }

    groups
}

/// Everything the statistics view shows for one window
#[derive(Debug, Clone)]
pub struct StatsReport<'a> {
    /// Window the report covers
    pub window: StatsWindow,
    /// Records in the window, newest first
    pub sessions: Vec<&'a CompletedSession>,
    /// Totals over `sessions`
    pub summary: PeriodSummary,
    /// `sessions` bucketed by day, newest day first
    pub days: Vec<DayGroup<'a>>,
}

impl<'a> StatsReport<'a> {
    /// Build the report for `window` as seen at `now`
    pub fn build<Tz: TimeZone>(
        history: &'a [CompletedSession],
        window: StatsWindow,
        now: &DateTime<Tz>,
    ) -> Self {
        let sessions = filter_window(history, window, now);
        let summary = PeriodSummary::from_sessions(sessions.iter().copied());
        let days = group_by_day(&sessions, now);

        Self {
            window,
            sessions,
            summary,
            days,
        }
    }

    /// Check if nothing was recorded in the window
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Format minutes as "40 min" or "1h 05m"
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, mins)
    } else {
        format!("{} min", mins)
    }
}
