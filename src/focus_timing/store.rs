//! Persistence for focus history
//!
//! Stores completed sessions to a JSON file. The log is append-only and never
//! pruned.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::config_dir;

use super::stats::CompletedSession;

const HISTORY_FILE: &str = "history.json";

/// Store for persisting the session history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store_path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by the default data directory
    pub fn new() -> Self {
        Self {
            store_path: config_dir().join(HISTORY_FILE),
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

    /// Load all sessions from disk
    pub fn load(&self) -> Result<Vec<CompletedSession>> {
        if !self.store_path.exists() {
            return Ok(Vec::new());
        }

        let content =
            std::fs::read_to_string(&self.store_path).context("Failed to read history file")?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).context("Failed to parse history")
    }

    /// Save all sessions to disk
    pub fn save(&self, sessions: &[CompletedSession]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(sessions).context("Failed to serialize history")?;

        std::fs::write(&self.store_path, content).context("Failed to write history file")?;

        Ok(())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
