//! Language model abstraction and implementations.
//!
//! The pipeline treats a model as a text-to-text function: one prompt in,
//! one response out. Backends:
//! - **[`OpenAIChatModel`]**: a single-message chat completion request.
//! - **[`DisabledModel`]**: always fails; used when no model is configured.
//! - **[`FnModel`]**: wraps any closure, handy for scripted responses.
//!
//! # Retry Strategy
//!
//! The OpenAI backend does not retry unless `model.max_retries > 0`. When
//! enabled, HTTP 429 and 5xx responses and network errors are retried with
//! exponential backoff (1s, 2s, 4s, ... capped at 32s); other 4xx responses
//! fail immediately.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ModelConfig;
use crate::error::{HomeMatchError, Result};

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model identifier used in logs.
    fn name(&self) -> &str;

    /// Send one prompt and return the model's full response text.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

// ============ Closure Model ============

/// Adapts a plain function into a [`LanguageModel`].
///
/// ```rust
/// use homematch::llm::{FnModel, LanguageModel};
///
/// # #[tokio::main]
/// # async fn main() {
/// let echo = FnModel::new(|prompt: &str| Ok(prompt.to_uppercase()));
/// assert_eq!(echo.invoke("hi").await.unwrap(), "HI");
/// # }
/// ```
pub struct FnModel<F> {
    func: F,
}

impl<F> FnModel<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> LanguageModel for FnModel<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        "fn"
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        (self.func)(prompt)
    }
}

// ============ Disabled Model ============

/// A model that rejects every prompt.
pub struct DisabledModel;

#[async_trait]
impl LanguageModel for DisabledModel {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String> {
        Err(HomeMatchError::ModelInvocation(
            "language model is disabled; set model.provider in the config".to_string(),
        ))
    }
}

// ============ OpenAI Chat Model ============

/// Chat completion backend for OpenAI-compatible APIs.
///
/// Sends the prompt as a single user message to
/// `POST {base_url}/chat/completions` and returns the first choice.
pub struct OpenAIChatModel {
    model: String,
    temperature: Option<f32>,
    base_url: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAIChatModel {
    /// Create a chat model from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            HomeMatchError::InvalidArgument("OPENAI_API_KEY environment variable not set".into())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HomeMatchError::ModelInvocation(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
            client,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(t) = self.temperature {
            body["temperature"] = serde_json::json!(t);
        }
        body
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = self.request_body(prompt);
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(attempt, ?delay, "retrying chat completion");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let chat: ChatResponse = response.json().await.map_err(|e| {
                            HomeMatchError::ModelInvocation(format!("chat response: {}", e))
                        })?;
                        return first_choice(chat);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = HomeMatchError::ModelInvocation(format!(
                        "OpenAI API error {}: {}",
                        status, body_text
                    ));
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(HomeMatchError::ModelInvocation(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            HomeMatchError::ModelInvocation("chat completion failed".to_string())
        }))
    }
}

fn first_choice(chat: ChatResponse) -> Result<String> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| HomeMatchError::ModelInvocation("chat response had no content".into()))
}

/// Create the [`LanguageModel`] named by the configuration.
///
/// | Config Value | Model |
/// |-------------|-------|
/// | `"disabled"` | [`DisabledModel`] |
/// | `"openai"` | [`OpenAIChatModel`] |
pub fn create_model(config: &ModelConfig) -> Result<Box<dyn LanguageModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledModel)),
        "openai" => Ok(Box::new(OpenAIChatModel::new(config)?)),
        other => Err(HomeMatchError::InvalidArgument(format!(
            "Unknown model provider: {}",
            other
        ))),
    }
}
