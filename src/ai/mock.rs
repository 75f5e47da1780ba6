//! Scripted generator for tests.
//!
//! ```rust,ignore
//! let ai = MockGenerator::new().with_response("A short summary.");
//! let text = ai.generate("prompt", SUMMARY_OPTIONS).await?;
//! assert_eq!(ai.calls().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AiError, GenerationOptions, TextGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    Unavailable,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub prompt: String,
    pub options: GenerationOptions,
}

#[derive(Clone, Default)]
pub struct MockGenerator {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    queued: VecDeque<String>,
    default_response: String,
    failure: Option<MockFailure>,
    calls: Vec<MockCall>,
}

impl MockGenerator {
    pub fn new() -> Self {
        let generator = Self::default();
        generator.lock().default_response = "Mock response".to_string();
        generator
    }

    /// Response returned whenever the queue is empty.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.lock().default_response = response.into();
        self
    }

    /// Responses handed out once each, in order, before the default.
    pub fn push_response(&self, response: impl Into<String>) {
        self.lock().queued.push_back(response.into());
    }

    pub fn fail_with(&self, failure: Option<MockFailure>) {
        self.lock().failure = failure;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock generator lock poisoned")
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String, AiError> {
        let mut state = self.lock();
        state.calls.push(MockCall {
            prompt: prompt.to_string(),
            options,
        });

        match state.failure {
            Some(MockFailure::RateLimited) => return Err(AiError::RateLimited),
            Some(MockFailure::Unavailable) => return Err(AiError::Unavailable),
            Some(MockFailure::Empty) => return Err(AiError::EmptyResponse),
            None => {}
        }

        let response = state
            .queued
            .pop_front()
            .unwrap_or_else(|| state.default_response.clone());
        Ok(response)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
