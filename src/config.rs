//! Terminal configuration
//!
//! Loaded from an optional YAML file; every field has a default so an
//! empty or missing file yields a working pattern-only terminal. The remote
//! backend key may come from the file or from the environment.

use crate::structured_log::{LogConfig, LogLevel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REMOTE_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Directory a session starts in
    pub initial_directory: Option<PathBuf>,
    /// Directory `~` expands to
    pub home_directory: Option<PathBuf>,
    /// Optional cap on history entries
    pub history_limit: Option<usize>,
    /// Pass uninterpretable natural language through to the dispatcher
    pub lenient_interpretation: bool,
    /// Move the OS process cwd along with the session
    pub mirror_process_cwd: bool,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            initial_directory: None,
            home_directory: None,
            history_limit: None,
            lenient_interpretation: true,
            mirror_process_cwd: false,
            remote: RemoteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Explicit key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable holding the key
    pub api_key_env: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Shortest partial input sent for remote suggestions
    pub suggest_min_chars: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: DEFAULT_REMOTE_MODEL.to_string(),
            endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            timeout_ms: 8_000,
            suggest_min_chars: 3,
        }
    }
}

impl RemoteConfig {
    /// Resolve the credential; blank values count as absent
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub level: LogLevel,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: true,
            level: LogLevel::Warn,
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            json_output: self.json,
            file_path: self.file.clone(),
            min_level: self.level,
        }
    }
}

impl TerminalConfig {
    /// Load from a YAML file; a missing file yields the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
