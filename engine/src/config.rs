use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::dispatch::DispatchOptions;
use crate::edit::EditOptions;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are Parlor, a helpful assistant in a terminal. When you propose code, put it in a fenced code block tagged with its language.";

/// `~/.parlor/config.toml`. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ParlorConfig {
    pub app: Option<AppConfig>,
    pub edit: Option<EditConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub model: Option<String>,
    pub system_message: Option<String>,
    /// Pause after a deprecated command notice, in milliseconds.
    pub alias_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditConfig {
    /// How often the edit watcher checks the scratch file.
    pub poll_interval_ms: Option<u64>,
    /// Abandon `%edit` if Enter isn't pressed within this many seconds.
    pub ack_timeout_secs: Option<u64>,
}

#[derive(Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// May reference the environment, e.g. `"${OPENAI_API_KEY}"`.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_var(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

impl ParlorConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        Self::parse(&content).map(Some).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse { path, source: err }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `PARLOR_MODEL`, then `[app].model`, then [`DEFAULT_MODEL`].
    #[must_use]
    pub fn model(&self) -> String {
        env_var("PARLOR_MODEL")
            .or_else(|| non_empty(self.app.as_ref().and_then(|app| app.model.clone())))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    #[must_use]
    pub fn system_message(&self) -> String {
        self.app
            .as_ref()
            .and_then(|app| app.system_message.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string())
    }

    /// `PARLOR_BASE_URL`, then `[api].base_url`.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        env_var("PARLOR_BASE_URL")
            .or_else(|| non_empty(self.api.as_ref().and_then(|api| api.base_url.clone())))
    }

    /// `[api].api_key` (with `${VAR}` expanded), then `PARLOR_API_KEY`, then
    /// `OPENAI_API_KEY`.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        non_empty(
            self.api
                .as_ref()
                .and_then(|api| api.api_key.as_deref())
                .map(expand_env_vars),
        )
        .or_else(|| env_var("PARLOR_API_KEY"))
        .or_else(|| env_var("OPENAI_API_KEY"))
    }

    #[must_use]
    pub fn dispatch_options(&self) -> DispatchOptions {
        let defaults = DispatchOptions::default();
        let alias_delay = self
            .app
            .as_ref()
            .and_then(|app| app.alias_delay_ms)
            .map_or(defaults.alias_delay, Duration::from_millis);

        let edit = self.edit.as_ref();
        let poll_interval = edit
            .and_then(|edit| edit.poll_interval_ms)
            .filter(|ms| *ms > 0)
            .map_or(defaults.edit.poll_interval, Duration::from_millis);
        let ack_timeout = edit
            .and_then(|edit| edit.ack_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        DispatchOptions {
            alias_delay,
            edit: EditOptions {
                poll_interval,
                ack_timeout,
            },
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    parlor_dir().map(|dir| dir.join("config.toml"))
}

/// `~/.parlor`, the home of the config file, logs and scratch files.
pub fn parlor_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parlor"))
}

/// Where scratch files go. Falls back to `./.parlor` without a home directory.
#[must_use]
pub fn storage_path() -> PathBuf {
    parlor_dir().unwrap_or_else(|| PathBuf::from(".parlor"))
}
