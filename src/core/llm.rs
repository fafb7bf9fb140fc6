//! Client for an OpenAI-compatible chat completions endpoint.
//!
//! One request per call with a bounded timeout and no retries; callers fall
//! back to deterministic insights on any error.

use crate::{
    config::settings::InsightsConfig,
    core::insight::InsightSource,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a concise personal finance assistant. \
    Always answer with valid JSON only.";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "INSIGHTS_API_KEY";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::ExternalService {
                message: "completion contained no content".to_string(),
            })
    }
}

/// HTTP client for the insights model.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    /// Creates a client with the configured timeout.
    pub fn new(config: &InsightsConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Creates a client when `INSIGHTS_API_KEY` is set, `None` otherwise.
    pub fn from_env(config: &InsightsConfig) -> Result<Option<Self>> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::new(config, key.trim().to_string()).map(Some),
            _ => {
                tracing::info!("{API_KEY_VAR} not set, insights will use the built-in fallback");
                Ok(None)
            }
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        }
    }
}

impl InsightSource for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| Error::ExternalService {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ExternalService {
                message: format!("insights API returned {status}"),
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| Error::ExternalService {
            message: format!("unreadable completion: {e}"),
        })?;
        body.into_content()
    }
}
