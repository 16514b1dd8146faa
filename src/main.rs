use std::process;

use clap::Parser;
use medicare_ai::Cli;

#[tokio::main]
async fn main() {
    // Missing .env is fine; the process environment is used as-is
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default "info" level; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        process::exit(1);
    }
}
