//! Assistant provider trait and associated types
//!
//! Each AI backend implements [`AssistProvider`]. The assistant tries
//! providers in [`ProviderKind::all`] order and falls back to fixed text when
//! every one of them fails.

use async_trait::async_trait;
use thiserror::Error;

/// Why a provider call produced nothing usable
#[derive(Debug, Error)]
pub enum AssistError {
    /// Transport failure, timeout, or non-success status
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Body or embedded content was not the JSON we asked for
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered, but with nothing in it
    #[error("response had no usable content")]
    EmptyResponse,
}

/// Trait for assistant backends
///
/// # Object Safety
/// This trait is object-safe to allow `Box<dyn AssistProvider>` usage.
#[async_trait]
pub trait AssistProvider: Send + Sync {
    /// Get the display name of this provider
    fn name(&self) -> &str;

    /// Split a task title into short actionable steps
    async fn break_down(&self, task_title: &str) -> Result<Vec<String>, AssistError>;

    /// Produce a short motivational line
    async fn quote(&self) -> Result<String, AssistError>;
}

/// Supported provider backends, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

impl ProviderKind {
    /// Get the display name for this provider
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// All providers, highest priority first
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenAi, ProviderKind::Gemini]
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
