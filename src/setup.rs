use std::io::{BufRead, Write};

use tracing::info;

use crate::config::{Config, ConfigStore, DEFAULT_SYSTEM_PROMPT};
use crate::error::ConfigError;
use crate::provider::Provider;

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: &'static str,
    prompt: &str,
) -> Result<String, ConfigError> {
    let prompt_err = |reason: String| ConfigError::Prompt { field, reason };

    write!(output, "{prompt}").map_err(|err| prompt_err(err.to_string()))?;
    output.flush().map_err(|err| prompt_err(err.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|err| prompt_err(err.to_string()))?;
    if read == 0 {
        return Err(prompt_err("unexpected end of input".to_string()));
    }
    Ok(line.trim().to_string())
}

pub fn prompt_for_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Config, ConfigError> {
    let provider = ask(
        input,
        output,
        "provider",
        &format!("Provider ({}): ", Provider::SUPPORTED),
    )?;
    let model = ask(
        input,
        output,
        "model",
        "Model name (e.g. deepseek-chat, empty for the provider default): ",
    )?;
    let api_key = ask(input, output, "API key", "API key: ")?;
    let system_prompt = ask(
        input,
        output,
        "system prompt",
        &format!("System prompt (press Enter for '{DEFAULT_SYSTEM_PROMPT}'): "),
    )?;

    Ok(Config {
        provider,
        model,
        api_key,
        system_prompt,
    })
}

pub fn run_first_time_setup<R: BufRead, W: Write>(
    store: &ConfigStore,
    input: &mut R,
    output: &mut W,
) -> Result<Config, ConfigError> {
    let notice_err = |err: std::io::Error| ConfigError::Prompt {
        field: "setup notice",
        reason: err.to_string(),
    };

    writeln!(
        output,
        "No configuration found at '{}'. Please enter your settings:",
        store.path().display()
    )
    .map_err(notice_err)?;

    let config = prompt_for_config(input, output)?;
    store.save(&config)?;
    info!(
        config_path = %store.path().display(),
        provider = %config.provider,
        "saved configuration"
    );

    writeln!(output, "Configuration saved.").map_err(notice_err)?;
    writeln!(
        output,
        "First-time setup complete. Run the command again to send a query."
    )
    .map_err(notice_err)?;
    Ok(config)
}
