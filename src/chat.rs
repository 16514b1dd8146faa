//! Single-turn chat: language-specific persona plus the user's message.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::gemini::AiClient;
use crate::prompts::{chat_system_prompt, Language};

/// Sends one user message to the chat handle and returns the reply text.
///
/// Stateless: nothing from earlier calls is carried into later ones.
pub struct ChatPipeline {
    client: Arc<dyn AiClient>,
}

impl ChatPipeline {
    /// Creates a pipeline over the given handle.
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self { client }
    }

    /// Answers `message` in `language` (`"fr"` for French, English otherwise).
    ///
    /// Provider errors are returned unchanged; a [`GeminiError`] can be
    /// recovered with `downcast_ref`. No retries.
    ///
    /// [`GeminiError`]: crate::gemini::GeminiError
    pub async fn respond(&self, message: &str, language: &str) -> Result<String> {
        let language = Language::from_tag(language);
        debug!(language = language.tag(), message_len = message.len(), "Dispatching chat message");
        self.client
            .send_request(chat_system_prompt(language), message)
            .await
    }

    /// Answers `message` in English.
    pub async fn respond_default(&self, message: &str) -> Result<String> {
        self.respond(message, Language::English.tag()).await
    }
}
