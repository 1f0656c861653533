//! Task and subtask data structures
//!
//! Tasks are the unit of work a focus session runs against. They are only
//! ever flagged completed, never removed, so the completed view stays intact.

pub mod store;
pub mod views;

pub use store::TaskStore;
pub use views::{active_tasks, completed_tasks};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task
pub type TaskId = Uuid;

/// Unique identifier for a subtask
pub type SubTaskId = Uuid;

/// Default estimate for quick-added tasks, in minutes
pub const DEFAULT_ESTIMATE_MINUTES: u32 = 25;

/// Estimate presets offered when adding a task
pub const ESTIMATE_PRESETS: [u32; 4] = [15, 25, 45, 60];

/// Current time truncated to the millisecond precision records are stored with
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Importance tier used to order the active task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Must happen today
    #[serde(rename = "A")]
    Critical,
    /// Should happen soon
    #[default]
    #[serde(rename = "B")]
    Important,
    /// Nice to have
    #[serde(rename = "C")]
    Optional,
}

impl Priority {
    /// Sort rank, lower comes first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::Important => 1,
            Priority::Optional => 2,
        }
    }

    /// Get the display name for this priority
    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::Important => "Important",
            Priority::Optional => "Optional",
        }
    }

    /// Single-letter badge (A/B/C)
    pub fn badge(&self) -> &'static str {
        match self {
            Priority::Critical => "A",
            Priority::Important => "B",
            Priority::Optional => "C",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "critical" => Ok(Priority::Critical),
            "b" | "important" => Ok(Priority::Important),
            "c" | "optional" => Ok(Priority::Optional),
            other => Err(format!(
                "unknown priority '{}' (expected A, B or C)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Life area a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Work,
    Personal,
}

impl Category {
    /// Get the display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" | "w" => Ok(Category::Work),
            "personal" | "p" => Ok(Category::Personal),
            other => Err(format!("unknown category '{}' (expected work or personal)", other)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A small actionable step belonging to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    /// Unique identifier
    pub id: SubTaskId,
    /// Step description, fixed once generated
    pub title: String,
    /// Whether the step has been ticked off
    pub completed: bool,
}

impl SubTask {
    /// Create a new, open subtask
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A user-defined unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Display text, never empty
    pub title: String,
    /// Importance tier
    pub priority: Priority,
    /// Work or personal
    pub category: Category,
    /// Time estimate in minutes, always positive
    pub estimated_minutes: u32,
    /// Set once, never cleared
    pub completed: bool,
    /// Creation timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Ordered breakdown steps
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
}

impl Task {
    /// Create a new open task
    ///
    /// Returns `None` when the title is blank. A zero estimate falls back to
    /// [`DEFAULT_ESTIMATE_MINUTES`].
    pub fn new(
        title: &str,
        priority: Priority,
        category: Category,
        estimated_minutes: u32,
    ) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            priority,
            category,
            estimated_minutes: if estimated_minutes > 0 {
                estimated_minutes
            } else {
                DEFAULT_ESTIMATE_MINUTES
            },
            completed: false,
            created_at: now_millis(),
            sub_tasks: Vec::new(),
        })
    }

    /// Update the estimate; non-positive values are ignored
    ///
    /// Returns true if the estimate changed.
    pub fn set_estimate(&mut self, minutes: i64) -> bool {
        if minutes <= 0 {
            return false;
        }
        let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
        if minutes == self.estimated_minutes {
            return false;
        }
        self.estimated_minutes = minutes;
        true
    }

    /// Replace the subtask list with freshly generated steps
    pub fn replace_sub_tasks<I, S>(&mut self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_tasks = titles.into_iter().map(SubTask::new).collect();
    }

    /// Flip a subtask's completed flag
    ///
    /// Returns false if no subtask has the given id.
    pub fn toggle_sub_task(&mut self, id: SubTaskId) -> bool {
        match self.sub_tasks.iter_mut().find(|st| st.id == id) {
            Some(sub_task) => {
                sub_task.completed = !sub_task.completed;
                true
            }
            None => false,
        }
    }

    /// Number of ticked-off subtasks
    pub fn sub_tasks_done(&self) -> usize {
        self.sub_tasks.iter().filter(|st| st.completed).count()
    }

    /// Focus duration for a fresh session, in seconds
    pub fn estimated_secs(&self) -> u64 {
        u64::from(self.estimated_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("  Write report ", Priority::Critical, Category::Work, 45).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.estimated_minutes, 45);
        assert!(!task.completed);
        assert!(task.sub_tasks.is_empty());
    }

    #[test]
    fn test_task_blank_title_rejected() {
        assert!(Task::new("   ", Priority::Important, Category::Work, 25).is_none());
        assert!(Task::new("", Priority::Important, Category::Work, 25).is_none());
    }

    #[test]
    fn test_task_zero_estimate_uses_default() {
        let task = Task::new("Call mom", Priority::Optional, Category::Personal, 0).unwrap();
        assert_eq!(task.estimated_minutes, DEFAULT_ESTIMATE_MINUTES);
    }

    #[test]
    fn test_set_estimate_ignores_non_positive() {
        let mut task = Task::new("Read", Priority::Important, Category::Personal, 25).unwrap();
        assert!(!task.set_estimate(0));
        assert!(!task.set_estimate(-5));
        assert_eq!(task.estimated_minutes, 25);

        assert!(task.set_estimate(40));
        assert_eq!(task.estimated_minutes, 40);
        assert_eq!(task.estimated_secs(), 2400);
    }

    #[test]
    fn test_toggle_sub_task_leaves_parent_alone() {
        let mut task = Task::new("Taxes", Priority::Critical, Category::Personal, 60).unwrap();
        task.replace_sub_tasks(["Find receipts", "Fill form", "Submit"]);
        let second = task.sub_tasks[1].id;

        assert!(task.toggle_sub_task(second));
        assert!(task.sub_tasks[1].completed);
        assert_eq!(task.sub_tasks_done(), 1);
        assert!(!task.completed);

        assert!(task.toggle_sub_task(second));
        assert!(!task.sub_tasks[1].completed);

        assert!(!task.toggle_sub_task(Uuid::new_v4()));
    }

    #[test]
    fn test_replace_sub_tasks_keeps_order() {
        let mut task = Task::new("Plan trip", Priority::Optional, Category::Personal, 30).unwrap();
        task.replace_sub_tasks(["one", "two", "three"]);
        let titles: Vec<_> = task.sub_tasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_task_json_layout() {
        let task = Task::new("Ship it", Priority::Critical, Category::Work, 15).unwrap();
        let json: serde_json::Value = serde_json::to_value(&task).unwrap();

        assert_eq!(json["priority"], "A");
        assert_eq!(json["category"], "Work");
        assert_eq!(json["estimatedMinutes"], 15);
        assert_eq!(json["createdAt"], task.created_at.timestamp_millis());
        assert!(json["subTasks"].is_array());
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Critical.rank() < Priority::Important.rank());
        assert!(Priority::Important.rank() < Priority::Optional.rank());
        assert_eq!(Priority::default(), Priority::Important);
    }

    #[test]
    fn test_parse_priority_and_category() {
        assert_eq!("A".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!(" optional ".parse::<Priority>().unwrap(), Priority::Optional);
        assert!("urgent".parse::<Priority>().is_err());

        assert_eq!("Personal".parse::<Category>().unwrap(), Category::Personal);
        assert_eq!("w".parse::<Category>().unwrap(), Category::Work);
        assert!("chores".parse::<Category>().is_err());
    }
}
