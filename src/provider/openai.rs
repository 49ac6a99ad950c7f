//! OpenAI provider using the Chat Completions API
//!
//! Structured output uses `response_format: json_schema`.
//! Requires `OPENAI_API_KEY`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{http_client, PromptRequest, PromptResponse, Provider, TokenUsage};
use crate::error::MediSeekError;

/// OpenAI API base URL
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MediSeekError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_messages(&self, request: &PromptRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        messages
    }

    fn response_format(request: &PromptRequest) -> Option<Value> {
        request.response_schema.as_ref().map(|schema| {
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name.as_deref().unwrap_or("response"),
                    "schema": schema,
                    "strict": false
                }
            })
        })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn execute(&self, request: PromptRequest) -> Result<PromptResponse> {
        let payload = ChatCompletionRequest {
            model: request.model_or(&self.model).to_string(),
            messages: self.build_messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: Self::response_format(&request),
        };

        tracing::debug!(
            provider = "openai",
            model = %payload.model,
            messages_count = payload.messages.len(),
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = "openai",
                status = %status,
                error = %error_text,
                "OpenAI API error"
            );
            return Ok(PromptResponse::failure(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        let Some(choice) = api_response.choices.into_iter().next() else {
            return Ok(PromptResponse::failure("OpenAI returned no choices"));
        };
        let content = choice.message.content.unwrap_or_default();

        let usage = match api_response.usage {
            Some(u) => TokenUsage::new(u.prompt_tokens, u.completion_tokens),
            None => TokenUsage::estimate(request.prompt.len(), content.len()),
        };

        tracing::debug!(
            provider = "openai",
            tokens = usage.total_tokens,
            "OpenAI API response received"
        );

        Ok(PromptResponse::success(content)
            .with_usage(usage)
            .with_stop_reason(choice.finish_reason))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ============================================================================
// TESTS
// ============================================================================
