//! Error taxonomy for the command engine
//! - CommandError: everything a dispatch can report (rendered as output + exit 1)
//! - FsErrorKind: filesystem failure classes shared by the builtins
//! - RemoteError: remote interpretation failures (never surfaced to callers)

use std::fmt;
use std::io;
use thiserror::Error;

/// Exit code reported for every failed command
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Filesystem failure classes, rendered like the coreutils messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsErrorKind {
    NotFound,
    AlreadyExists,
    PermissionDenied,
    IsADirectory,
    NotADirectory,
    NotEmpty,
    Other(String),
}

impl FsErrorKind {
    /// Classify an io::Error
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsErrorKind::NotFound,
            io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
            io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            io::ErrorKind::IsADirectory => FsErrorKind::IsADirectory,
            io::ErrorKind::NotADirectory => FsErrorKind::NotADirectory,
            io::ErrorKind::DirectoryNotEmpty => FsErrorKind::NotEmpty,
            _ => FsErrorKind::Other(err.to_string()),
        }
    }
}

impl fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsErrorKind::NotFound => write!(f, "No such file or directory"),
            FsErrorKind::AlreadyExists => write!(f, "File exists"),
            FsErrorKind::PermissionDenied => write!(f, "Permission denied"),
            FsErrorKind::IsADirectory => write!(f, "Is a directory"),
            FsErrorKind::NotADirectory => write!(f, "Not a directory"),
            FsErrorKind::NotEmpty => write!(f, "Directory not empty"),
            FsErrorKind::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Failure of a single dispatched command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error("{command}: {message}")]
    Usage {
        command: &'static str,
        message: String,
    },

    #[error("{command}: {subject}: {kind}")]
    Filesystem {
        command: &'static str,
        subject: String,
        kind: FsErrorKind,
    },

    #[error("Could not interpret: {0}")]
    Interpretation(String),
}

impl CommandError {
    pub fn usage(command: &'static str, message: impl Into<String>) -> Self {
        CommandError::Usage {
            command,
            message: message.into(),
        }
    }

    pub fn fs(command: &'static str, subject: impl Into<String>, kind: FsErrorKind) -> Self {
        CommandError::Filesystem {
            command,
            subject: subject.into(),
            kind,
        }
    }

    /// Build a filesystem error from an io::Error
    pub fn io(command: &'static str, subject: impl Into<String>, err: &io::Error) -> Self {
        Self::fs(command, subject, FsErrorKind::from_io(err))
    }

    /// Filesystem kind, if this is a filesystem error
    pub fn fs_kind(&self) -> Option<&FsErrorKind> {
        match self {
            CommandError::Filesystem { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}

/// Remote interpretation failures
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote backend unavailable")]
    Unavailable,

    #[error("request failed: {0}")]
    Network(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Network(err.to_string())
    }
}
