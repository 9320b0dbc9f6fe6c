use anyhow::{Context, Result};
use autopsy_cli::{commands, logging, Cli, Pipeline};
use autopsy_ollama::OllamaProvider;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    let config = cli.resolve_config().context("invalid configuration")?;
    tracing::debug!(?config, "configuration resolved");

    let provider = OllamaProvider::new(&config.llm).context("building model client")?;
    tracing::info!(model = provider.model(), endpoint = provider.endpoint(), "using Ollama");

    let pipeline = Pipeline::new(config, Arc::new(provider));
    let mut stdout = std::io::stdout().lock();
    commands::execute(&pipeline, &cli.command, &mut stdout).await
}
