//! Server command.

use anyhow::Result;
use clap::Parser;

use crate::config::Settings;

/// Runs the HTTP server.
#[derive(Parser)]
pub struct ServeCommand {
    /// Bind host (overrides `host`).
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port (overrides `port`).
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Executes the serve command.
    pub async fn execute(self) -> Result<()> {
        let mut settings = Settings::from_env()?;
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        crate::server::start_server(settings).await
    }
}
