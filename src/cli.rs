//! CLI interface for medicare-ai.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod ask;
pub mod config;
pub mod serve;

/// medicare-ai: a multilingual medical assistant backend.
#[derive(Parser)]
#[command(name = "medicare-ai")]
#[command(about = "Multilingual medical assistant backend powered by Google Gemini", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Runs the HTTP server.
    Serve(serve::ServeCommand),
    /// Sends one message through the chat pipeline and prints the reply.
    Ask(ask::AskCommand),
    /// Configuration inspection.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(serve_cmd) => serve_cmd.execute().await,
            Commands::Ask(ask_cmd) => ask_cmd.execute().await,
            Commands::Config(config_cmd) => config_cmd.execute(),
        }
    }
}
