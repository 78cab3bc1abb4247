//! Groq chat-completion client
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint. Only the
//! single-message, non-streaming form is used here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::fetch_json;
use crate::{ClimateError, Result};

const PROVIDER: &str = "groq";

/// A single-prompt completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: String, max_tokens: u32) -> Self {
        Self {
            prompt,
            temperature: 0.7,
            max_tokens,
        }
    }
}

/// Large-language-model completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run the prompt and return the raw text of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GroqMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    #[serde(default)]
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Groq completion provider
pub struct GroqProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GroqProvider {
    #[must_use]
    pub fn new(
        client: Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    #[instrument(skip(self, request), fields(max_tokens = request.max_tokens))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClimateError::config("GROQ_API_KEY is not set"))?;

        let body = GroqRequest {
            model: &self.model,
            messages: vec![GroqMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body);

        let response: GroqResponse = fetch_json(PROVIDER, http_request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClimateError::shape(PROVIDER, "response has no message content"))?;

        debug!("Received {} characters from {}", content.len(), self.model);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = GroqRequest {
            model: "llama3-70b-8192",
            messages: vec![GroqMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.7,
            max_tokens: 800,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "llama3-70b-8192");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 800);
    }

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new("prompt".into(), 1000);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 1000);
    }

    #[test]
    fn test_response_parsing() {
        let response: GroqResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "llama3-70b-8192",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "[]" } }]
        }))
        .unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let provider = GroqProvider::new(
            Client::new(),
            None,
            "http://127.0.0.1:9",
            "llama3-70b-8192",
        );
        let result = provider
            .complete(&CompletionRequest::new("hi".into(), 10))
            .await;
        assert!(matches!(result, Err(ClimateError::Config { .. })));
    }
}
