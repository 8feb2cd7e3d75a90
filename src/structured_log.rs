//! Structured Logging - JSON lines on stderr (and optionally a file)
//!
//! Usage:
//!   slog_info!("INTERPRET", "resolved", json!({"input": "show me the files", "command": "ls"}));
//!
//! Output:
//!   {"timestamp":"2026-01-10T12:34:56Z","level":"info","component":"INTERPRET","event":"resolved","data":{...}}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    static ref LOG_CONFIG: Mutex<LogConfig> = Mutex::new(LogConfig::default());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub component: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub json_output: bool,
    pub file_path: Option<PathBuf>,
    pub min_level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json_output: true,
            file_path: None,
            min_level: LogLevel::Warn,
        }
    }
}

/// Initialize the structured logger
pub fn init_logger(config: LogConfig) {
    if let Some(path) = &config.file_path {
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(path) {
            if let Ok(mut log_file) = LOG_FILE.lock() {
                *log_file = Some(file);
            }
        }
    }

    if let Ok(mut cfg) = LOG_CONFIG.lock() {
        *cfg = config;
    }
}

/// Log an event with structured data
pub fn log_event(level: LogLevel, component: &str, event: &str, data: serde_json::Value) {
    log_entry(level, component, event, None, Some(data));
}

/// Log a message with optional data
pub fn log_message(
    level: LogLevel,
    component: &str,
    event: &str,
    message: &str,
    data: Option<serde_json::Value>,
) {
    log_entry(level, component, event, Some(message.to_string()), data);
}

fn log_entry(
    level: LogLevel,
    component: &str,
    event: &str,
    message: Option<String>,
    data: Option<serde_json::Value>,
) {
    let config = match LOG_CONFIG.lock() {
        Ok(guard) => (*guard).clone(),
        Err(_) => LogConfig::default(),
    };

    if level < config.min_level {
        return;
    }

    let entry = LogEntry {
        timestamp: Utc::now(),
        level: level.as_str().to_string(),
        component: component.to_string(),
        event: event.to_string(),
        message,
        data,
    };

    eprintln!("{}", render(&entry, config.json_output));

    if let Ok(mut log_file) = LOG_FILE.lock() {
        if let Some(ref mut file) = *log_file {
            // The file always gets JSON so it can be parsed back
            let _ = writeln!(file, "{}", render(&entry, true));
        }
    }
}

fn render(entry: &LogEntry, json: bool) -> String {
    if json {
        return serde_json::to_string(entry).unwrap_or_else(|_| format!("{:?}", entry));
    }

    // [COMPONENT] event: message data
    let msg = entry.message.as_deref().unwrap_or("");
    let data_str = entry
        .data
        .as_ref()
        .map(|d| format!(" {}", d))
        .unwrap_or_default();
    format!("[{}] {}: {}{}", entry.component, entry.event, msg, data_str)
}

/// Shared body of the `slog_*` macros; the level is a `LogLevel` variant name
#[doc(hidden)]
#[macro_export]
macro_rules! __slog_at {
    ($level:ident, $component:expr, $event:expr, $data:expr) => {
        $crate::structured_log::log_event(
            $crate::structured_log::LogLevel::$level,
            $component,
            $event,
            $data,
        )
    };
    ($level:ident, $component:expr, $event:expr, $msg:expr, $data:expr) => {
        $crate::structured_log::log_message(
            $crate::structured_log::LogLevel::$level,
            $component,
            $event,
            $msg,
            $data,
        )
    };
}

/// `slog_debug!(component, event, data)` or `slog_debug!(component, event, msg, data)`
#[macro_export]
macro_rules! slog_debug {
    ($($args:expr),+ $(,)?) => { $crate::__slog_at!(Debug, $($args),+) };
}

#[macro_export]
macro_rules! slog_info {
    ($($args:expr),+ $(,)?) => { $crate::__slog_at!(Info, $($args),+) };
}

#[macro_export]
macro_rules! slog_warn {
    ($($args:expr),+ $(,)?) => { $crate::__slog_at!(Warn, $($args),+) };
}

#[macro_export]
macro_rules! slog_error {
    ($($args:expr),+ $(,)?) => { $crate::__slog_at!(Error, $($args),+) };
}
