//! Pluggable LLM client used only to rephrase response prose.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use wardstock_core::config::{LlmConfig, LlmProvider};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Always-failing client for the `disabled` provider; the composer falls
/// back to its deterministic template.
#[derive(Default)]
pub struct NoopLlmClient;

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("llm client disabled"))
    }
}

/// OpenAI-compatible chat-completions client. Gemini is reachable through
/// the same wire shape via its compatibility endpoint.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .context("llm api key missing")?;

        let base_url = match (&config.base_url, config.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, LlmProvider::OpenAi) => OPENAI_BASE_URL.to_string(),
            (None, LlmProvider::Gemini) => GEMINI_BASE_URL.to_string(),
            (None, LlmProvider::Disabled) => {
                return Err(anyhow!("llm provider is disabled"));
            }
        };

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("building http client")?;

        Ok(Self { http, base_url, api_key, model: config.model.clone() })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You rephrase hospital inventory status messages. \
                                Keep every number, item name, and location exactly as given. \
                                Reply with the rephrased message only."
                },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.3,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("llm request failed")?
            .error_for_status()
            .context("llm returned an error status")?;

        let completion: ChatCompletionResponse =
            response.json().await.context("decoding llm response")?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("llm response had no choices")?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("llm returned empty content"));
        }
        Ok(trimmed.to_string())
    }
}
