use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use admin::console::Reported;
use admin::{Cli, Console, FileStorage, SessionStore, TerminalPrompt};
use common::{AdminConfig, ApiClient};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so command output stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    let mut config = AdminConfig::from_env().context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    info!("Using API at {}", config.api_url);

    let client = ApiClient::new(&config)?;
    let storage = FileStorage::new(config.storage_path());
    debug!("Credential storage at {}", storage.path().display());

    let session = SessionStore::new(client, Arc::new(storage));
    session.restore().await;

    let console = Console::new(session, Arc::new(TerminalPrompt::new(cli.yes)));
    match console.run(cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already shown by the prompt
        Err(e) if e.is::<Reported>() => {
            debug!("Command failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}
