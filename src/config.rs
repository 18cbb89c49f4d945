use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";
const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Empty `model` and `system_prompt` are kept empty on disk; provider
/// defaults are substituted only when a request is built.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub system_prompt: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(provider) = overrides.provider {
            self.provider = provider;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(api_key) = overrides.api_key {
            self.api_key = api_key;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn beside_executable() -> Result<Self, ConfigError> {
        let exe = env::current_exe().map_err(ConfigError::ExecutablePath)?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let data = fs::read(&self.path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::Missing {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(config).map_err(ConfigError::Encode)?;
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let mut file = owner_only_options().open(&self.path).map_err(write_err)?;
        file.write_all(&data).map_err(write_err)?;
        file.flush().map_err(write_err)
    }
}

#[cfg(unix)]
fn owner_only_options() -> fs::OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn owner_only_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    options
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            config_path: non_empty(get_var("CHAT_AGENT_CONFIG")).map(PathBuf::from),
            endpoint: non_empty(get_var("CHAT_AGENT_ENDPOINT")),
            timeout_secs: parse_timeout_secs(get_var("CHAT_AGENT_TIMEOUT_SECS").as_deref()),
        }
    }

    pub fn config_store(&self) -> Result<ConfigStore, ConfigError> {
        match &self.config_path {
            Some(path) => Ok(ConfigStore::new(path.clone())),
            None => ConfigStore::beside_executable(),
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}
