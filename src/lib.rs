pub mod cli;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod logging;
pub mod provider;
pub mod request;
pub mod setup;
pub mod stream;
pub mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use tracing::info;

use cli::Cli;
use config::Settings;
use dispatch::Dispatcher;
use error::ConfigError;
use transport::HttpTransport;

pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let store = settings.config_store()?;

    let mut cfg = match store.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::Missing { .. }) => {
            let stdin = io::stdin();
            setup::run_first_time_setup(&store, &mut stdin.lock(), &mut io::stdout())
                .context("Failed to complete first-time setup")?;
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to load configuration"),
    };
    info!(
        config_path = %store.path().display(),
        provider = %cfg.provider,
        model = %cfg.model,
        "loaded runtime configuration"
    );
    cfg.apply_overrides(cli.overrides());

    let transport = HttpTransport::new(settings.timeout_secs)?;
    let dispatcher = Dispatcher::new(cfg, settings.endpoint.clone(), transport)?;

    let stdin = io::stdin();
    let stdin_is_terminal = stdin.is_terminal();
    let query = input::assemble_query(
        cli.question.as_deref(),
        &cli.query,
        stdin.lock(),
        stdin_is_terminal,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let answer = dispatcher.ask(&query, &mut out)?;
    writeln!(out).context("Failed to write response output")?;

    eprintln!("\nTokens used: {}", answer.total_tokens.unwrap_or(0));
    Ok(())
}
