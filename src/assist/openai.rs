//! OpenAI chat-completions provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::{AssistError, AssistProvider};
use super::{clean_quote, parse_step_list};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const BREAKDOWN_SYSTEM_PROMPT: &str = "You are a helpful productivity assistant. You break down \
tasks into 3-5 very small, actionable sub-tasks (under 15 mins each). Return ONLY a JSON array \
of strings. Do not include markdown formatting like ```json.";

const QUOTE_SYSTEM_PROMPT: &str = "You are a motivational coach for people with ADHD.";

const QUOTE_USER_PROMPT: &str = "Give me a very short (max 10 words), punchy motivational quote.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String, AssistError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AssistError::EmptyResponse)
    }
}

/// Provider backed by the OpenAI chat completions API
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider using a shared HTTP client
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, AssistError> {
        let response: ChatResponse = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_content()
    }
}

#[async_trait]
impl AssistProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn break_down(&self, task_title: &str) -> Result<Vec<String>, AssistError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: BREAKDOWN_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Break down the task \"{}\".", task_title),
                },
            ],
            temperature: Some(0.7),
            max_tokens: None,
        };

        let content = self.complete(&request).await?;
        parse_step_list(&content)
    }

    async fn quote(&self) -> Result<String, AssistError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: QUOTE_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: QUOTE_USER_PROMPT.to_string(),
                },
            ],
            temperature: None,
            max_tokens: Some(50),
        };

        let content = self.complete(&request).await?;
        clean_quote(&content)
    }
}
