//! Memoised construction of the chat and vision Gemini handles.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tracing::info;

use super::{AiClient, GeminiClient};
use crate::config::Settings;

/// Temperature of the vision handle, independent of configuration.
pub const VISION_TEMPERATURE: f32 = 0.5;

type Slot = Mutex<Option<Arc<dyn AiClient>>>;

/// Builds each handle on first use and returns the same instance afterwards.
///
/// The slot lock is held while a handle is being constructed, so concurrent
/// first calls build exactly one client.
pub struct ClientFactory {
    settings: Arc<Settings>,
    chat: Slot,
    vision: Slot,
}

impl ClientFactory {
    /// Creates a factory with both slots empty.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            chat: Mutex::new(None),
            vision: Mutex::new(None),
        }
    }

    /// Creates a factory whose slots are already filled.
    pub fn with_clients(
        settings: Arc<Settings>,
        chat: Arc<dyn AiClient>,
        vision: Arc<dyn AiClient>,
    ) -> Self {
        Self {
            settings,
            chat: Mutex::new(Some(chat)),
            vision: Mutex::new(Some(vision)),
        }
    }

    /// Settings the handles are built from.
    pub fn shared_settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    /// Returns the chat handle (configured temperature).
    pub fn chat_client(&self) -> Result<Arc<dyn AiClient>> {
        self.get_or_build(&self.chat, "chat", self.settings.temperature)
    }

    /// Returns the vision handle (temperature fixed at [`VISION_TEMPERATURE`]).
    pub fn vision_client(&self) -> Result<Arc<dyn AiClient>> {
        self.get_or_build(&self.vision, "vision", VISION_TEMPERATURE)
    }

    fn get_or_build(&self, slot: &Slot, variant: &str, temperature: f32) -> Result<Arc<dyn AiClient>> {
        let mut guard = slot
            .lock()
            .map_err(|_| anyhow!("{variant} client slot poisoned"))?;

        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client: Arc<dyn AiClient> = Arc::new(GeminiClient::new(
            self.settings.gemini_model.clone(),
            self.settings.google_api_key.clone(),
            self.settings.gemini_api_base.clone(),
            temperature,
            self.settings.max_tokens,
        )?);

        info!(
            variant,
            model = %self.settings.gemini_model,
            temperature,
            max_output_tokens = self.settings.max_tokens,
            "Constructed Gemini client"
        );

        *guard = Some(Arc::clone(&client));
        Ok(client)
    }
}
