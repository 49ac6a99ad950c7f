//! Mock provider for testing
//!
//! Returns queued responses without making real API calls and records every
//! request, so tests can assert how many model invocations happened.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;

use super::{PromptRequest, PromptResponse, Provider, TokenUsage};

/// One scripted reply
#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    Failure(String),
}

/// Mock provider that returns predefined responses
///
/// Clones share the same queue and request log.
#[derive(Clone)]
pub struct MockProvider {
    /// Queue of replies to return (FIFO)
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Reply when the queue is empty
    default_reply: MockReply,
    /// All requests made (for assertions)
    requests: Arc<Mutex<Vec<PromptRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            default_reply: MockReply::Content("Mock response".to_string()),
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Create with a queue of responses
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        for response in responses {
            provider.queue_response(response);
        }
        provider
    }

    /// Set the default response when the queue is empty
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_reply = MockReply::Content(response.into());
        self
    }

    /// Fail every call that the queue does not cover
    pub fn with_default_failure(mut self, error: impl Into<String>) -> Self {
        self.default_reply = MockReply::Failure(error.into());
        self
    }

    /// Add a successful response to the queue
    pub fn queue_response(&self, response: impl Into<String>) {
        lock(&self.replies).push_back(MockReply::Content(response.into()));
    }

    /// Add a transport-style failure to the queue
    pub fn queue_failure(&self, error: impl Into<String>) {
        lock(&self.replies).push_back(MockReply::Failure(error.into()));
    }

    /// Get all requests made to this provider
    pub fn get_requests(&self) -> Vec<PromptRequest> {
        lock(&self.requests).clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<PromptRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of `execute` calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn execute(&self, request: PromptRequest) -> Result<PromptResponse> {
        lock(&self.requests).push(request.clone());

        let reply = lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Content(text) => {
                let usage = TokenUsage::estimate(request.prompt.len(), text.len());
                Ok(PromptResponse::success(text).with_usage(usage))
            }
            MockReply::Failure(error) => Err(anyhow::anyhow!(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let provider = MockProvider::new();
        let response = provider.execute(PromptRequest::new("Hello", "")).await.unwrap();

        assert!(response.success);
        assert_eq!(response.content, "Mock response");
    }

    #[tokio::test]
    async fn test_mock_queued_responses() {
        let provider =
            MockProvider::with_responses(vec!["First".to_string(), "Second".to_string()]);

        let r1 = provider.execute(PromptRequest::new("a", "")).await.unwrap();
        let r2 = provider.execute(PromptRequest::new("b", "")).await.unwrap();
        let r3 = provider.execute(PromptRequest::new("c", "")).await.unwrap();

        assert_eq!(r1.content, "First");
        assert_eq!(r2.content, "Second");
        assert_eq!(r3.content, "Mock response");
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let provider = MockProvider::new().with_default_failure("quota exceeded");
        provider.queue_response("ok");

        assert!(provider.execute(PromptRequest::new("a", "")).await.is_ok());
        let err = provider.execute(PromptRequest::new("b", "")).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_mock_records_requests_across_clones() {
        let provider = MockProvider::new();
        let handle = provider.clone();

        provider
            .execute(PromptRequest::new("First prompt", "model-1"))
            .await
            .unwrap();
        provider.queue_failure("boom");
        let _ = provider.execute(PromptRequest::new("Second prompt", "")).await;

        assert_eq!(handle.call_count(), 2);
        let requests = handle.get_requests();
        assert_eq!(requests[0].prompt, "First prompt");
        assert_eq!(handle.last_request().unwrap().prompt, "Second prompt");

        handle.clear_requests();
        assert_eq!(provider.call_count(), 0);
    }
}
