//! One-shot chat command.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::chat::ChatPipeline;
use crate::config::Settings;
use crate::gemini::ClientFactory;

/// Sends one message through the chat pipeline.
#[derive(Parser)]
pub struct AskCommand {
    /// Response language (`en` or `fr`).
    #[arg(long, short, default_value = "en")]
    pub language: String,

    /// Gemini model to use (overrides `gemini_model`).
    #[arg(long)]
    pub model: Option<String>,

    /// Message to send.
    #[arg(required = true, trailing_var_arg = true)]
    pub words: Vec<String>,
}

impl AskCommand {
    /// The message as a single string.
    pub fn message(&self) -> String {
        self.words.join(" ")
    }

    /// Executes the ask command.
    pub async fn execute(self) -> Result<()> {
        let mut settings = Settings::from_env()?;
        if let Some(model) = self.model.clone() {
            settings.gemini_model = model;
        }

        let factory = ClientFactory::new(Arc::new(settings));
        let client = factory.chat_client()?;
        let metadata = client.get_metadata();
        eprintln!("Connected to {} (model: {})", metadata.provider, metadata.model);

        let reply = ChatPipeline::new(client)
            .respond(&self.message(), &self.language)
            .await?;
        println!("{reply}");
        Ok(())
    }
}
