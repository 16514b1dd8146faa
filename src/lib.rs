//! # medicare-ai
//!
//! Backend for a multilingual (English/French) medical assistant powered by
//! Google Gemini.
//!
//! ## Features
//!
//! - Environment-driven configuration with validated bounds
//! - Memoised Gemini chat and vision handles
//! - Chat, document analysis and trusted-source research pipelines
//! - HTTP API with a configurable CORS policy
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use medicare_ai::chat::ChatPipeline;
//! use medicare_ai::config::Settings;
//! use medicare_ai::gemini::ClientFactory;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Arc::new(Settings::from_env()?);
//! let factory = ClientFactory::new(settings);
//! let reply = ChatPipeline::new(factory.chat_client()?)
//!     .respond("What are the symptoms of malaria?", "en")
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod chat;
pub mod cli;
pub mod config;
pub mod gemini;
pub mod prompts;
pub mod research;
pub mod server;

pub use crate::cli::Cli;

/// The current version of medicare-ai.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
