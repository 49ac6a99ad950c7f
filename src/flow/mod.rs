//! # Schema-Validated AI Flows
//!
//! A flow is a single-shot model call with a fixed prompt template, a typed
//! input and an output contract expressed as JSON Schema.
//!
//! ```text
//! Input ──prompt()──▶ PromptRequest(+schema) ──Provider──▶ text
//!                                                          │
//!            Output ◀──serde── validate(schema) ◀── extract_json
//! ```
//!
//! Anything that does not survive every step is a [`FlowError`]; callers never
//! see partially-typed data.
//!
//! | Flow | Input | Output |
//! |------|-------|--------|
//! | [`AnalyzeSymptoms`] | [`AnalyzeSymptomsInput`] | [`AnalyzeSymptomsOutput`] |
//! | [`FindPharmacies`] | [`LocationInput`] | [`FindPharmaciesOutput`] |
//! | [`FindDoctors`] | [`FindDoctorsInput`] | [`FindDoctorsOutput`] |
//! | [`FindHospitals`] | [`LocationInput`] | [`FindHospitalsOutput`] |
//! | [`FindPathologyLabs`] | [`LocationInput`] | [`FindPathologyLabsOutput`] |

mod doctors;
mod hospitals;
mod labs;
mod pharmacies;
mod symptoms;

pub use doctors::{Doctor, FindDoctors, FindDoctorsInput, FindDoctorsOutput};
pub use hospitals::{FindHospitals, FindHospitalsOutput, Hospital};
pub use labs::{FindPathologyLabs, FindPathologyLabsOutput, PathologyLab};
pub use pharmacies::{FindPharmacies, FindPharmaciesOutput, Pharmacy};
pub use symptoms::{AnalyzeSymptoms, AnalyzeSymptomsInput, AnalyzeSymptomsOutput, MedicineSuggestion};

use std::sync::Arc;

use dashmap::DashMap;
use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::i18n::Language;
use crate::provider::{PromptRequest, Provider};

const SYSTEM_PROMPT: &str = "You are the assistant behind MediSeek, a health information app. \
Reply with a single JSON object that follows the provided schema and nothing else. \
Everything you produce is general, illustrative information and never a substitute for \
professional medical advice.";

/// Failure of a flow invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("[MEDI-020] Model call failed: {0}")]
    Provider(String),

    #[error("[MEDI-021] Model returned an error: {0}")]
    Rejected(String),

    #[error("[MEDI-022] Model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("[MEDI-023] Model output does not match the {flow} schema: {details}")]
    SchemaMismatch { flow: &'static str, details: String },

    #[error("[MEDI-024] Output schema of {flow} does not compile: {details}")]
    InvalidSchema { flow: &'static str, details: String },
}

/// Input shared by the location lookups (pharmacies, hospitals, labs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub location: String,
    #[serde(default)]
    pub language: Language,
}

/// A schema-validated model call
pub trait Flow {
    /// Stable name, also used as the schema name sent to the backend
    const NAME: &'static str;

    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Serialize;

    /// Natural-language instruction built from the fixed template
    fn prompt(input: &Self::Input) -> String;

    /// JSON Schema every accepted output satisfies
    fn output_schema() -> Value;

    /// Language the answer must be written in
    fn language(input: &Self::Input) -> Language;
}

/// Runs flows against one provider
///
/// Holds no per-call state. Compiled schemas are cached per flow name; the
/// cache only ever holds values derived from constants.
#[derive(Clone)]
pub struct FlowRunner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    schemas: Arc<DashMap<&'static str, Arc<Validator>>>,
}

impl FlowRunner {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: String::new(),
            temperature: None,
            max_tokens: None,
            schemas: Arc::new(DashMap::new()),
        }
    }

    /// Model override (empty = provider default)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
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

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// Invoke a flow: one model call, then parse and validate
    pub async fn run<F: Flow>(&self, input: &F::Input) -> Result<F::Output, FlowError> {
        let request = PromptRequest::new(F::prompt(input), self.model.clone())
            .with_system_prompt(SYSTEM_PROMPT)
            .with_response_schema(F::NAME, F::output_schema())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::debug!(
            flow = F::NAME,
            provider = self.provider.name(),
            model = self.model(),
            language = F::language(input).code(),
            "Invoking flow"
        );

        let response = self
            .provider
            .execute(request)
            .await
            .map_err(|e| FlowError::Provider(format!("{:#}", e)))?;

        if !response.success {
            return Err(FlowError::Rejected(response.content));
        }

        let mut value = extract_json(&response.content)?;
        drop_nulls(&mut value);

        let validator = self.validator::<F>()?;
        let problems: Vec<String> = validator
            .iter_errors(&value)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        if !problems.is_empty() {
            return Err(FlowError::SchemaMismatch {
                flow: F::NAME,
                details: problems.join("; "),
            });
        }

        let output = serde_json::from_value(value).map_err(|e| FlowError::SchemaMismatch {
            flow: F::NAME,
            details: e.to_string(),
        })?;

        tracing::debug!(
            flow = F::NAME,
            tokens = response.usage.total_tokens,
            "Flow completed"
        );
        Ok(output)
    }

    fn validator<F: Flow>(&self) -> Result<Arc<Validator>, FlowError> {
        if let Some(cached) = self.schemas.get(F::NAME) {
            return Ok(Arc::clone(cached.value()));
        }

        let compiled = jsonschema::validator_for(&F::output_schema()).map_err(|e| {
            FlowError::InvalidSchema {
                flow: F::NAME,
                details: e.to_string(),
            }
        })?;
        let compiled = Arc::new(compiled);
        self.schemas.insert(F::NAME, Arc::clone(&compiled));
        Ok(compiled)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Sentence pinning the response language, shared by every template
pub(crate) fn language_clause(language: Language) -> String {
    format!(
        "Your response MUST be written in {name} (language code: {code}). \
Every text field, including names, descriptions and the disclaimer, must be in {name}.",
        name = language.english_name(),
        code = language.code()
    )
}

/// Template shared by the nearby-place lookups
pub(crate) fn lookup_prompt(
    places: &str,
    location: &str,
    focus: Option<&str>,
    fields: &str,
    language: Language,
) -> String {
    let focus = focus
        .map(|f| format!(" Focus on {}.", f))
        .unwrap_or_default();
    format!(
        "List 3 to 5 plausible, illustrative {places} near \"{location}\".{focus}\n\
These are generated examples, not verified listings. Do not claim they are real or current.\n\
For each entry provide {fields}.\n\
Echo the location back as 'searchedLocation' and include a 'disclaimer' stating that the \
results are AI-generated examples that may be inaccurate, and that details must be verified \
independently before relying on them.\n\n\
{clause}",
        location = location.trim(),
        clause = language_clause(language),
    )
}

/// Pull a JSON value out of model text
///
/// Accepts bare JSON, fenced code blocks, and prose around a single object.
pub fn extract_json(text: &str) -> Result<Value, FlowError> {
    let t = text.trim().trim_matches('\u{feff}');

    if let Ok(v) = serde_json::from_str::<Value>(t) {
        return Ok(v);
    }

    for fence in ["```json", "```"] {
        if let Some(start) = t.find(fence) {
            let body = &t[start + fence.len()..];
            if let Some(end) = body.find("```") {
                if let Ok(v) = serde_json::from_str::<Value>(body[..end].trim()) {
                    return Ok(v);
                }
            }
        }
    }

    if let (Some(i), Some(j)) = (t.find('{'), t.rfind('}')) {
        if i < j {
            if let Ok(v) = serde_json::from_str::<Value>(&t[i..=j]) {
                return Ok(v);
            }
        }
    }

    let preview: String = t.chars().take(80).collect();
    Err(FlowError::InvalidJson(format!(
        "no JSON object found in model output: {:?}",
        preview
    )))
}

/// Treat `null` object members as absent (optional fields)
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

// ============================================================================
// TESTS
// ============================================================================
