//! Gemini provider using the Google Generative Language API
//!
//! Calls `models/{model}:generateContent` with JSON response mode enabled when
//! the request carries a schema. Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{http_client, PromptRequest, PromptResponse, Provider, TokenUsage};
use crate::error::MediSeekError;

/// Generative Language API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Schema keywords understood by Gemini's `responseSchema` (OpenAPI subset)
const SUPPORTED_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
];

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MediSeekError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        })
    }

    /// Point at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_payload(&self, request: &PromptRequest) -> GenerateContentRequest {
        let system_instruction = request.system_prompt.as_ref().map(|system| Content {
            role: None,
            parts: vec![Part {
                text: system.clone(),
            }],
        });

        let (response_mime_type, response_schema) = match &request.response_schema {
            Some(schema) => (
                Some("application/json".to_string()),
                Some(to_gemini_schema(schema)),
            ),
            None => (None, None),
        };

        GenerateContentRequest {
            system_instruction,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type,
                response_schema,
            },
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn execute(&self, request: PromptRequest) -> Result<PromptResponse> {
        let model = request.model_or(&self.model).to_string();
        let payload = self.build_payload(&request);

        tracing::debug!(
            provider = "gemini",
            model = %model,
            structured = payload.generation_config.response_schema.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = "gemini",
                status = %status,
                error = %error_text,
                "Gemini API error"
            );
            return Ok(PromptResponse::failure(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let Some(candidate) = api_response.candidates.into_iter().next() else {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Ok(PromptResponse::failure(format!(
                "Gemini returned no content ({})",
                reason
            )));
        };

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = match api_response.usage_metadata {
            Some(u) => TokenUsage::new(u.prompt_token_count, u.candidates_token_count),
            None => TokenUsage::estimate(request.prompt.len(), content.len()),
        };

        tracing::debug!(
            provider = "gemini",
            tokens = usage.total_tokens,
            "Gemini API response received"
        );

        Ok(PromptResponse::success(content)
            .with_usage(usage)
            .with_stop_reason(candidate.finish_reason))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Reduce a JSON Schema to the keywords Gemini accepts
pub(crate) fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if !SUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let converted = match key.as_str() {
                    "properties" => match value {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .map(|(name, sub)| (name.clone(), to_gemini_schema(sub)))
                                .collect(),
                        ),
                        other => other.clone(),
                    },
                    "items" => to_gemini_schema(value),
                    _ => value.clone(),
                };
                out.insert(key.clone(), converted);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("test-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_name_and_default_model() {
        let p = provider();
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.default_model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(p.with_model("gemini-1.5-pro").default_model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_endpoint_uses_model() {
        let p = provider().with_base_url("http://localhost:9999/");
        assert_eq!(
            p.endpoint("gemini-2.0-flash"),
            "http://localhost:9999/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_payload_without_schema() {
        let payload = provider().build_payload(&PromptRequest::new("Hi", ""));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hi");
        assert!(json.get("systemInstruction").is_none());
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_payload_with_schema_and_system() {
        let request = PromptRequest::new("Hi", "")
            .with_system_prompt("Be brief")
            .with_response_schema("out", json!({"type": "object"}));
        let json = serde_json::to_value(provider().build_payload(&request)).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], json!({"type": "object"}));
    }

    #[test]
    fn test_schema_conversion_strips_unsupported_keywords() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "additionalProperties": false,
            "required": ["items"],
            "properties": {
                "items": {
                    "type": "array",
                    "items": {"type": "string", "minLength": 1, "description": "d"}
                }
            }
        });

        assert_eq!(
            to_gemini_schema(&schema),
            json!({
                "type": "object",
                "required": ["items"],
                "properties": {
                    "items": {"type": "array", "items": {"type": "string", "description": "d"}}
                }
            })
        );
    }

    #[test]
    fn test_is_available() {
        assert!(provider().is_available());
        let empty = GeminiProvider::new("", Duration::from_secs(5)).unwrap();
        assert!(!empty.is_available());
    }
}
