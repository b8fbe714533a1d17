//! The text-completion capability used by every prompt call site.

use crate::error::{LlmError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A stateless prompt-to-text capability.
///
/// Each call receives a fully rendered prompt and returns the model's raw
/// text. There is no streaming and no conversation state between calls.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: TextCompletion + ?Sized> TextCompletion for std::sync::Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

#[async_trait]
impl<T: TextCompletion + ?Sized> TextCompletion for Box<T> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

/// Completion that replays fixed responses in order.
///
/// Used to exercise prompt consumers deterministically. Once the queue is
/// drained every further call fails with [`LlmError::ServiceUnavailable`],
/// which is also how a test simulates an unreachable model. Prompts that were
/// received are kept for inspection.
#[derive(Debug, Default)]
pub struct CannedCompletion {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl CannedCompletion {
    /// Create a completion that answers with `responses`, one per call.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a completion whose first call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        let canned = Self::default();
        canned.push_error(LlmError::ServiceUnavailable(message.into()));
        canned
    }

    /// Queue another successful response.
    pub fn push(&self, response: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Ok(response.into()));
        }
    }

    /// Queue a failure.
    pub fn push_error(&self, error: LlmError) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(error));
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextCompletion for CannedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| LlmError::Other("canned completion poisoned".to_string()))?
            .pop_front();

        next.unwrap_or_else(|| {
            Err(LlmError::ServiceUnavailable(
                "no canned response left".to_string(),
            ))
        })
    }
}
