//! Google Gemini generateContent provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::provider::{AssistError, AssistProvider};
use super::{clean_quote, parse_step_list};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const QUOTE_PROMPT: &str = "Give me a very short (max 10 words), punchy motivational quote for \
someone with ADHD trying to focus.";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String, AssistError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(AssistError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

fn breakdown_prompt(task_title: &str) -> String {
    format!(
        "Break down the task \"{}\" into 3 to 5 very small, actionable sub-tasks that take less \
         than 15 minutes each. Keep them concise and motivating.",
        task_title
    )
}

/// Provider backed by the Gemini generateContent API
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Create a provider using a shared HTTP client
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    async fn generate(&self, body: serde_json::Value) -> Result<String, AssistError> {
        let response: GenerateResponse = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_text()
    }
}

#[async_trait]
impl AssistProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn break_down(&self, task_title: &str) -> Result<Vec<String>, AssistError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": breakdown_prompt(task_title) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
            }
        });

        let text = self.generate(body).await?;
        parse_step_list(&text)
    }

    async fn quote(&self) -> Result<String, AssistError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": QUOTE_PROMPT }] }]
        });

        let text = self.generate(body).await?;
        clean_quote(&text)
    }
}
