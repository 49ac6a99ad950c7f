//! # Provider Abstraction Layer
//!
//! Trait and implementations for hosted generative models.
//!
//! - [`Provider`] - Core trait for executing prompts
//! - [`GeminiProvider`] - Google Generative Language API (default)
//! - [`OpenAIProvider`] - OpenAI Chat Completions API
//! - [`MockProvider`] - Test provider with queued responses and call recording
//!
//! Requests may carry a JSON Schema for the expected output. Providers pass it
//! to the backend's structured-output mode; callers still validate whatever
//! comes back (see [`crate::flow`]).
//!
//! ```rust
//! use mediseek::config::MediSeekConfig;
//! use mediseek::provider::create_provider;
//!
//! let config = MediSeekConfig::default();
//! assert!(create_provider("mock", &config).is_ok());
//! assert!(create_provider("invalid", &config).is_err());
//! ```

mod gemini;
mod mock;
mod openai;

use std::sync::Arc;
use std::time::Duration;

pub use gemini::{GeminiProvider, DEFAULT_GEMINI_MODEL};
pub use mock::MockProvider;
pub use openai::{OpenAIProvider, DEFAULT_OPENAI_MODEL};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::MediSeekConfig;
use crate::error::MediSeekError;

/// Average characters per token for prose
const CHARS_PER_TOKEN: f32 = 3.5;

// ============================================================================
// PROVIDER TRAIT (ASYNC)
// ============================================================================

/// Core trait that all model backends implement
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g., "gemini", "openai", "mock")
    fn name(&self) -> &str;

    /// Model used when the request leaves it empty
    fn default_model(&self) -> &str;

    /// Execute a prompt and return the response
    ///
    /// Transport failures surface as `Err`; a backend that answered with an
    /// error status yields `Ok` with `success == false`.
    async fn execute(&self, request: PromptRequest) -> Result<PromptResponse>;

    /// Check if this provider is usable (e.g., API key set)
    fn is_available(&self) -> bool {
        true
    }
}

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

/// Request to execute a prompt
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// The main prompt/instruction
    pub prompt: String,

    /// Optional system instruction
    pub system_prompt: Option<String>,

    /// Model to use (empty = provider default)
    pub model: String,

    /// JSON Schema the answer must follow (structured output)
    pub response_schema: Option<Value>,

    /// Name reported to backends that require one for the schema
    pub schema_name: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: Option<f32>,
}

impl PromptRequest {
    /// Create a new request with minimal required fields
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            system_prompt: None,
            response_schema: None,
            schema_name: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Request structured output following `schema`
    pub fn with_response_schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.schema_name = Some(name.into());
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Resolve the model against a provider default
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.model.is_empty() {
            default
        } else {
            &self.model
        }
    }
}

/// Response from a prompt execution
#[derive(Debug, Clone)]
pub struct PromptResponse {
    /// The generated content (or the error text when `success` is false)
    pub content: String,

    /// Whether the backend reported success
    pub success: bool,

    /// Token usage statistics
    pub usage: TokenUsage,

    /// Stop reason (e.g., "STOP", "stop", "error")
    pub stop_reason: Option<String>,
}

impl PromptResponse {
    /// Create a successful response
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
            usage: TokenUsage::default(),
            stop_reason: Some("end_turn".to_string()),
        }
    }

    /// Create a failed response
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            content: error.into(),
            success: false,
            usage: TokenUsage::default(),
            stop_reason: Some("error".to_string()),
        }
    }

    /// Set token usage
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_stop_reason(mut self, reason: Option<String>) -> Self {
        self.stop_reason = reason;
        self
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt: u32, completion: u32) -> Self {
        Self {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        }
    }

    /// Estimate usage when the backend reports none
    pub fn estimate(prompt_len: usize, response_len: usize) -> Self {
        let prompt_tokens = (prompt_len as f32 / CHARS_PER_TOKEN).ceil() as u32;
        let completion_tokens = (response_len as f32 / CHARS_PER_TOKEN).ceil() as u32;
        Self::new(prompt_tokens, completion_tokens)
    }
}

// ============================================================================
// PROVIDER FACTORY
// ============================================================================

/// Create a provider instance by name
///
/// | Name | Requires |
/// |------|----------|
/// | `gemini` | `GEMINI_API_KEY` / `GOOGLE_API_KEY` or `[ai].gemini_api_key` |
/// | `openai` | `OPENAI_API_KEY` or `[ai].openai_api_key` |
/// | `mock` | Nothing |
pub fn create_provider(
    name: &str,
    config: &MediSeekConfig,
) -> std::result::Result<Arc<dyn Provider>, MediSeekError> {
    let timeout = Duration::from_secs(config.ai.timeout_secs);

    let (provider, env_var): (Arc<dyn Provider>, &str) = match name.to_lowercase().as_str() {
        "gemini" | "google" => {
            let key = config.gemini_key().unwrap_or_default();
            let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(key, timeout)?);
            (provider, "GEMINI_API_KEY")
        }
        "openai" => {
            let key = config.openai_key().unwrap_or_default();
            let provider: Arc<dyn Provider> = Arc::new(OpenAIProvider::new(key, timeout)?);
            (provider, "OPENAI_API_KEY")
        }
        "mock" => return Ok(Arc::new(MockProvider::new())),
        _ => {
            return Err(MediSeekError::UnknownProvider {
                name: name.to_string(),
            })
        }
    };

    // an absent key and an empty one from the config file are the same thing
    if !provider.is_available() {
        return Err(MediSeekError::MissingApiKey {
            provider: provider.name().to_string(),
            env_var: env_var.to_string(),
        });
    }
    Ok(provider)
}

/// Stand-in used when no model is needed (blog, admin and config commands)
///
/// Every call fails with the reason the real provider could not be built.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Provider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn default_model(&self) -> &str {
        ""
    }

    async fn execute(&self, _request: PromptRequest) -> Result<PromptResponse> {
        Err(anyhow::anyhow!("{}", self.reason))
    }

    fn is_available(&self) -> bool {
        false
    }
}

pub(crate) fn http_client(timeout: Duration) -> std::result::Result<reqwest::Client, MediSeekError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MediSeekError::Provider(format!("Failed to build HTTP client: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================
