use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tutor_core::model::{ChatMessage, CompletionRequest, SamplingSettings};

use crate::error::CompletionError;

/// Text-completion collaborator used by "try it yourself" panels.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether requests can be sent at all.
    fn enabled(&self) -> bool {
        true
    }

    /// Generate text for `request`.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` when the client is disabled, the request
    /// fails, or the response is empty.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl CompletionConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TUTOR_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("TUTOR_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("TUTOR_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    config: Option<CompletionConfig>,
}

impl HttpCompletionClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(CompletionConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<CompletionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Sampling defaults for new panels, using the configured model.
    #[must_use]
    pub fn default_sampling(&self) -> SamplingSettings {
        let mut sampling = SamplingSettings::default();
        if let Some(config) = &self.config {
            sampling.model_name.clone_from(&config.model);
        }
        sampling
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let config = self.config.as_ref().ok_or(CompletionError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let model = if request.model_name.trim().is_empty() {
            config.model.as_str()
        } else {
            request.model_name.as_str()
        };
        let payload = ChatRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|err| err.error.message)
                .filter(|message| !message.trim().is_empty())
                .map_or(CompletionError::HttpStatus(status), CompletionError::Api));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}
