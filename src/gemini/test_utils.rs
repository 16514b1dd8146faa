//! Shared test utilities for code built on [`AiClient`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{AiClient, AiClientMetadata, Attachment};

/// A prompt as seen by the mock: `(system_prompt, user_prompt, attachment mime type)`.
pub(crate) type RecordedPrompt = (String, String, Option<String>);

/// Mock AI client with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order. When the queue is exhausted,
/// subsequent calls return `Err("no more mock responses")`. Every call is
/// recorded so tests can inspect the prompts after the client has been
/// moved behind an `Arc<dyn AiClient>`.
pub(crate) struct ConfigurableMockAiClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    metadata: AiClientMetadata,
    recorded_prompts: Arc<Mutex<Vec<RecordedPrompt>>>,
}

impl ConfigurableMockAiClient {
    /// Creates a new mock client that will return the given responses in order.
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            metadata: AiClientMetadata {
                provider: "Mock".to_string(),
                model: "mock-model".to_string(),
                temperature: 0.7,
                max_output_tokens: 2048,
                system_prompt_as_user: true,
            },
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for inspecting which prompts were sent.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded_prompts: self.recorded_prompts.clone(),
        }
    }

    fn respond(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'static>> {
        let responses = self.responses.clone();
        let recorded = self.recorded_prompts.clone();
        let entry = (
            system_prompt.to_string(),
            user_prompt.to_string(),
            attachment.map(|a| a.mime_type.clone()),
        );
        Box::pin(async move {
            recorded.lock().unwrap().push(entry);
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }
}

/// Shared handle to a mock client's recorded prompts.
pub(crate) struct PromptRecordHandle {
    recorded_prompts: Arc<Mutex<Vec<RecordedPrompt>>>,
}

impl PromptRecordHandle {
    /// Returns all recorded prompts.
    pub(crate) fn prompts(&self) -> Vec<RecordedPrompt> {
        self.recorded_prompts.lock().unwrap().clone()
    }

    /// Returns the number of AI requests that were made.
    pub(crate) fn request_count(&self) -> usize {
        self.recorded_prompts.lock().unwrap().len()
    }
}

impl AiClient for ConfigurableMockAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        self.respond(system_prompt, user_prompt, None)
    }

    fn send_request_with_attachment<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        attachment: &'a Attachment,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        self.respond(system_prompt, user_prompt, Some(attachment))
    }

    fn get_metadata(&self) -> AiClientMetadata {
        self.metadata.clone()
    }
}
