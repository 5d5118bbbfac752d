use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI-compatible endpoints, with bounded
/// retries. Transport and API errors surface as `Err`; the caller decides
/// how to degrade.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: f64,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        timeout_secs: u64,
        max_tokens: u32,
        temperature: f64,
        max_retries: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("building llm http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            max_tokens,
            temperature,
            max_retries,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let attempts = self.max_retries.max(1);
        let mut last_error = anyhow!("llm request was never attempted");

        for attempt in 1..=attempts {
            let result = self
                .http
                .post(&url)
                .bearer_auth(self.api_key.expose_secret())
                .json(&body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: ChatResponse =
                        response.json().await.context("decoding llm response")?;
                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.message.content)
                        .unwrap_or_default();
                    if content.trim().is_empty() {
                        last_error = anyhow!("llm returned an empty completion");
                    } else {
                        return Ok(content);
                    }
                }
                Ok(response) => {
                    last_error = anyhow!("llm returned status {}", response.status());
                }
                Err(error) => {
                    last_error = anyhow!(error).context("llm request failed");
                }
            }

            tracing::warn!(
                event_name = "narrative.llm_retry",
                attempt,
                max_attempts = attempts,
                error = %last_error,
                "llm completion attempt failed"
            );
        }

        Err(last_error)
    }
}

/// Fixed-output client for tests and offline runs.
pub struct StaticLlm(pub String);

#[async_trait]
impl LlmClient for StaticLlm {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Always-failing client, for exercising degradation paths.
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(anyhow!("llm unavailable"))
    }
}
