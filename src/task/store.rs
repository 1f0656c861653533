//! Persistence for the task list
//!
//! The whole list is rewritten on every save; there is no delta format.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::config_dir;

use super::Task;

const TASKS_FILE: &str = "tasks.json";

/// Store for persisting the task list
#[derive(Debug, Clone)]
pub struct TaskStore {
    store_path: PathBuf,
}

impl TaskStore {
    /// Create a store backed by the default data directory
    pub fn new() -> Self {
        Self {
            store_path: config_dir().join(TASKS_FILE),
        }
    }

    /// Create a store with a custom path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { store_path: path }
    }

    /// Get the path to the store file
    pub fn path(&self) -> &PathBuf {
        &self.store_path
    }

    /// Load all tasks from disk
    ///
    /// A missing or blank file is an empty list, not an error.
    pub fn load(&self) -> Result<Vec<Task>> {
        if !self.store_path.exists() {
            return Ok(Vec::new());
        }

        let content =
            std::fs::read_to_string(&self.store_path).context("Failed to read tasks file")?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).context("Failed to parse tasks")
    }

    /// Save all tasks to disk
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let content = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;

        std::fs::write(&self.store_path, content).context("Failed to write tasks file")?;

        Ok(())
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
