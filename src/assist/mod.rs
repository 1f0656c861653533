//! AI assistant for task breakdowns and focus quotes
//!
//! The [`Assistant`] holds the configured providers in priority order. Every
//! operation tries them in turn and returns fixed fallback text when none
//! succeeds, so callers never see an error.

pub mod gemini;
pub mod openai;
pub mod provider;

use std::time::Duration;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{AssistError, AssistProvider, ProviderKind};

use crate::config::AssistConfig;

/// Quote shown before any generated one arrives
pub const DEFAULT_QUOTE: &str = "Focus on the now.";

/// Quote used when no provider answers
pub const FALLBACK_QUOTE: &str = "One step at a time.";

/// Steps used when no provider answers
pub const FALLBACK_STEPS: [&str; 3] = [
    "Step 1: Gather your materials (5 min)",
    "Step 2: Work through the main part (10 min)",
    "Step 3: Review and wrap up (5 min)",
];

/// Upper bound on steps kept from a single response
const MAX_STEPS: usize = 5;

/// Ordered set of providers with fallback behaviour
pub struct Assistant {
    providers: Vec<Box<dyn AssistProvider>>,
}

impl Assistant {
    /// Create an assistant over explicit providers, highest priority first
    pub fn new(providers: Vec<Box<dyn AssistProvider>>) -> Self {
        Self { providers }
    }

    /// Assistant with no providers; always answers with fallback text
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// Build providers for every backend whose key is present in the environment
    pub fn from_config(config: &AssistConfig) -> Self {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build HTTP client, assistant offline");
                return Self::offline();
            }
        };

        let mut providers: Vec<Box<dyn AssistProvider>> = Vec::new();
        for kind in ProviderKind::all() {
            match kind {
                ProviderKind::OpenAi => {
                    if let Some(key) = config.openai_key() {
                        providers.push(Box::new(OpenAiProvider::new(
                            client.clone(),
                            key,
                            config.openai_model.clone(),
                        )));
                    }
                }
                ProviderKind::Gemini => {
                    if let Some(key) = config.gemini_key() {
                        providers.push(Box::new(GeminiProvider::new(
                            client.clone(),
                            key,
                            config.gemini_model.clone(),
                        )));
                    }
                }
            }
        }

        tracing::debug!(providers = providers.len(), "Assistant configured");
        Self::new(providers)
    }

    /// Names of the configured providers, in the order they are tried
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Check whether any provider is configured
    pub fn is_online(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Break a task into steps, falling back to generic steps
    pub async fn break_down_task(&self, task_title: &str) -> Vec<String> {
        for provider in &self.providers {
            match provider.break_down(task_title).await {
                Ok(steps) => {
                    tracing::info!(provider = provider.name(), steps = steps.len(), "Task broken down");
                    return steps;
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Breakdown failed");
                }
            }
        }

        FALLBACK_STEPS.iter().map(|s| s.to_string()).collect()
    }

    /// Fetch a motivational quote, falling back to a fixed line
    pub async fn quote(&self) -> String {
        for provider in &self.providers {
            match provider.quote().await {
                Ok(quote) => return quote,
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Quote request failed");
                }
            }
        }

        FALLBACK_QUOTE.to_string()
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("providers", &self.provider_names())
            .finish()
    }
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a JSON array of step strings out of a model reply
///
/// Blank entries are dropped and at most five steps are kept. An empty
/// result is an error so the next provider gets a turn.
pub(crate) fn parse_step_list(text: &str) -> Result<Vec<String>, AssistError> {
    let raw: Vec<String> = serde_json::from_str(strip_code_fence(text))?;

    let steps: Vec<String> = raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_STEPS)
        .collect();

    if steps.is_empty() {
        Err(AssistError::EmptyResponse)
    } else {
        Ok(steps)
    }
}

/// Tidy a quote reply: trim whitespace and surrounding quotation marks
pub(crate) fn clean_quote(text: &str) -> Result<String, AssistError> {
    let quote = text
        .trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim();

    if quote.is_empty() {
        Err(AssistError::EmptyResponse)
    } else {
        Ok(quote.to_string())
    }
}
