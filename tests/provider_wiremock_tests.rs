//! Provider tests against a local wiremock server
//!
//! Both hosted backends are exercised end to end: request shape, structured
//! output through the flow runner, and error statuses.

use std::sync::Arc;
use std::time::Duration;

use mediseek::flow::{
    AnalyzeSymptoms, AnalyzeSymptomsInput, FindPharmacies, FlowError, FlowRunner, LocationInput,
};
use mediseek::i18n::Language;
use mediseek::provider::{GeminiProvider, OpenAIProvider, PromptRequest, Provider};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPERS
// =============================================================================

fn gemini(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-key", Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri())
}

fn openai(server: &MockServer) -> OpenAIProvider {
    OpenAIProvider::new("sk-test", Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri())
}

fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 30 }
    })
}

fn openai_body(text: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20 }
    })
}

fn symptoms() -> AnalyzeSymptomsInput {
    AnalyzeSymptomsInput {
        symptoms: "headache and mild fever".to_string(),
        language: Language::En,
    }
}

// =============================================================================
// GEMINI
// =============================================================================

#[tokio::test]
async fn gemini_sends_key_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let response = gemini(&server)
        .execute(PromptRequest::new("Say hello", ""))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.content, "hello");
    assert_eq!(response.usage.total_tokens, 42);
    assert_eq!(response.stop_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn gemini_error_status_is_a_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let response = gemini(&server)
        .execute(PromptRequest::new("Say hello", ""))
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.content.contains("429"));
    assert!(response.content.contains("quota exceeded"));
}

#[tokio::test]
async fn gemini_blocked_prompt_is_a_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let response = gemini(&server)
        .execute(PromptRequest::new("Say hello", ""))
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.content.contains("SAFETY"));
}

#[tokio::test]
async fn gemini_structured_analysis_through_runner() {
    let server = MockServer::start().await;
    let analysis = json!({
        "suggestedMedicines": [{ "name": "Paracetamol", "dosage": "500mg every 6 hours" }],
        "suggestedSpecialty": "General Practitioner",
        "disclaimer": "This is not medical advice."
    });
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(&analysis.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let runner = FlowRunner::new(Arc::new(gemini(&server)));
    let output = runner.run::<AnalyzeSymptoms>(&symptoms()).await.unwrap();

    assert_eq!(output.suggested_medicines.len(), 1);
    assert_eq!(output.suggested_medicines[0].name, "Paracetamol");
    assert_eq!(output.suggested_specialty.as_deref(), Some("General Practitioner"));
    assert!(output.suggested_diet_plan.is_none());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert!(body["generationConfig"]["responseSchema"]["properties"]
        .get("suggestedMedicines")
        .is_some());
}

#[tokio::test]
async fn gemini_schema_mismatch_is_a_flow_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body(r#"{"suggestedMedicines": "lots"}"#)),
        )
        .mount(&server)
        .await;

    let runner = FlowRunner::new(Arc::new(gemini(&server)));
    let err = runner.run::<AnalyzeSymptoms>(&symptoms()).await.unwrap_err();

    assert!(matches!(err, FlowError::SchemaMismatch { flow: "analyzeSymptoms", .. }));
}

// =============================================================================
// OPENAI
// =============================================================================

#[tokio::test]
async fn openai_sends_bearer_and_schema() {
    let server = MockServer::start().await;
    let pharmacies = json!({
        "pharmacies": [{ "name": "Green Cross", "address": "1 Main St" }],
        "disclaimer": "Illustrative only.",
        "searchedLocation": "Springfield"
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(&pharmacies.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let runner = FlowRunner::new(Arc::new(openai(&server)))
        .with_model("gpt-4o")
        .with_max_tokens(Some(1024));
    let input = LocationInput {
        location: "Springfield".to_string(),
        language: Language::Fr,
    };
    let output = runner.run::<FindPharmacies>(&input).await.unwrap();

    assert_eq!(output.pharmacies[0].name, "Green Cross");
    assert_eq!(output.searched_location, "Springfield");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "findPharmacies");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("French"));
}

#[tokio::test]
async fn openai_error_status_surfaces_as_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let runner = FlowRunner::new(Arc::new(openai(&server)));
    let err = runner.run::<AnalyzeSymptoms>(&symptoms()).await.unwrap_err();

    match err {
        FlowError::Rejected(details) => assert!(details.contains("upstream down")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_fenced_json_is_accepted() {
    let server = MockServer::start().await;
    let fenced = "```json\n{\"suggestedMedicines\": [], \"disclaimer\": \"See a doctor.\"}\n```";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(fenced)))
        .mount(&server)
        .await;

    let runner = FlowRunner::new(Arc::new(openai(&server)));
    let output = runner.run::<AnalyzeSymptoms>(&symptoms()).await.unwrap();

    assert!(output.suggested_medicines.is_empty());
    assert_eq!(output.disclaimer, "See a doctor.");
}
