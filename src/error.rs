use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at '{}'", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read configuration file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in configuration file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode configuration: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write configuration file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {field} during setup: {reason}")]
    Prompt { field: &'static str, reason: String },

    #[error("failed to locate the executable directory: {0}")]
    ExecutablePath(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("{0}")]
    Transport(String),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    UserInput(String),

    #[error("API request failed with status {status}:\n{body}")]
    Api { status: u16, body: String },

    #[error("failed to read standard input: {0}")]
    Input(#[source] io::Error),

    #[error("failed to write response output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }
}
