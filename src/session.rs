//! Terminal session
//!
//! Owns one ExecutionContext plus the interpretation/dispatch pipeline.
//! `submit` takes `&mut self`, so a session cannot run two lines at once;
//! hosts serving several users keep one Session per user.

use crate::builtins::system_commands::EXIT_SENTINEL;
use crate::config::TerminalConfig;
use crate::context::ExecutionContext;
use crate::dispatcher::{CommandInvocation, CommandOutput, Dispatcher};
use crate::error::CommandError;
use crate::interpreter::{InterpretationResult, Interpreter};
use crate::registry::{is_builtin, Builtin};
use crate::suggestions::{Correction, SuggestionEngine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Generate a session ID with prefix
pub fn make_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Everything produced by one submitted line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub output: String,
    pub exit_code: i32,
    pub interpretation: InterpretationResult,
    /// Closest builtin when the command name was unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_you_mean: Option<Correction>,
    /// The line resolved to `exit`
    pub exit_requested: bool,
}

/// Read-only snapshot for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub current_directory: String,
    pub history_len: usize,
    pub remote_available: bool,
    pub started_at: DateTime<Utc>,
}

pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    ctx: ExecutionContext,
    dispatcher: Dispatcher,
    interpreter: Interpreter,
    suggestions: SuggestionEngine,
}

impl Session {
    pub fn new(config: &TerminalConfig) -> Self {
        let interpreter = Interpreter::from_config(config);
        let suggestions = SuggestionEngine::new(
            interpreter.remote().cloned(),
            config.remote.suggest_min_chars,
        );
        Self::with_parts(
            ExecutionContext::from_config(config),
            Dispatcher::default(),
            interpreter,
            suggestions,
        )
    }

    pub fn with_parts(
        ctx: ExecutionContext,
        dispatcher: Dispatcher,
        interpreter: Interpreter,
        suggestions: SuggestionEngine,
    ) -> Self {
        let session = Self {
            id: make_id("session"),
            started_at: Utc::now(),
            ctx,
            dispatcher,
            interpreter,
            suggestions,
        };

        crate::slog_info!(
            "SESSION",
            "started",
            json!({
                "session_id": session.id,
                "cwd": session.ctx.cwd_string(),
                "remote": session.interpreter.remote_available(),
            })
        );
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Interpret and run one line of user input
    pub async fn submit(&mut self, line: &str) -> SessionResponse {
        let interpretation = self.interpreter.process_input(line).await;

        let outcome = match &interpretation.resolved_command {
            Some(command) => self.dispatcher.execute(command, &mut self.ctx),
            // Strict miss: nothing reaches the dispatcher or the history
            None => CommandOutput::failure(&CommandError::Interpretation(
                interpretation.original_input.clone(),
            )),
        };

        let name = interpretation
            .resolved_command
            .as_deref()
            .and_then(|c| CommandInvocation::parse(c).ok().flatten())
            .map(|inv| inv.name);

        let did_you_mean = match &name {
            Some(n) if !outcome.is_success() && !is_builtin(n) => self.suggestions.correct_command(n),
            _ => None,
        };
        let exit_requested = outcome.is_success()
            && name.as_deref() == Some(Builtin::Exit.name())
            && outcome.output == EXIT_SENTINEL;

        SessionResponse {
            output: outcome.output,
            exit_code: outcome.exit_code,
            interpretation,
            did_you_mean,
            exit_requested,
        }
    }

    /// Completions for partially typed input
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        self.suggestions.suggest(partial).await
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            current_directory: self.ctx.cwd_string(),
            history_len: self.ctx.history().len(),
            remote_available: self.interpreter.remote_available(),
            started_at: self.started_at,
        }
    }

    /// `user@host:dir$ `
    pub fn prompt(&self) -> String {
        let user = self
            .ctx
            .env_var("USER")
            .or_else(|| self.ctx.env_var("USERNAME"))
            .unwrap_or("user");
        let host = self
            .ctx
            .env_var("HOSTNAME")
            .or_else(|| self.ctx.env_var("COMPUTERNAME"))
            .unwrap_or("localhost");
        let dir = self
            .ctx
            .current_directory()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());
        format!("{}@{}:{}$ ", user, host, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternEngine;
    use crate::system_stats::FixedStats;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn session_in(dir: &std::path::Path, lenient: bool) -> Session {
        let mut env = HashMap::new();
        env.insert("USER".to_string(), "alice".to_string());
        env.insert("HOSTNAME".to_string(), "box".to_string());
        let ctx = ExecutionContext::new(Some(dir.to_path_buf()), Some(dir.to_path_buf()))
            .with_environment(env);
        Session::with_parts(
            ctx,
            Dispatcher::new(Box::new(FixedStats::default())),
            Interpreter::new(PatternEngine::new(), None, lenient),
            SuggestionEngine::default(),
        )
    }

    #[test]
    fn test_make_id() {
        let id = make_id("session");
        assert!(id.starts_with("session-"));
        assert_eq!(id.len(), "session-".len() + 36);
    }

    #[tokio::test]
    async fn test_natural_language_runs() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), true);

        let resp = session.submit("create a new folder called demo").await;
        assert_eq!(resp.exit_code, 0);
        assert!(dir.path().join("demo").is_dir());
        assert_eq!(session.context().history(), &["mkdir demo".to_string()]);
    }

    #[tokio::test]
    async fn test_strict_miss_not_recorded() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), false);

        let resp = session.submit("tell me a joke").await;
        assert_eq!(resp.exit_code, 1);
        assert_eq!(resp.output, "Could not interpret: tell me a joke");
        assert!(session.context().history().is_empty());
    }

    #[tokio::test]
    async fn test_lenient_miss_reaches_dispatcher() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), true);

        let resp = session.submit("frobnicate").await;
        assert_eq!(resp.output, "Command not found: frobnicate");
        assert_eq!(resp.exit_code, 1);
        assert_eq!(session.status().history_len, 1);
    }

    #[tokio::test]
    async fn test_did_you_mean() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), true);

        let resp = session.submit("mkdri x").await;
        assert_eq!(resp.output, "Command not found: mkdri");
        assert_eq!(resp.did_you_mean.map(|c| c.command).as_deref(), Some("mkdir"));

        let resp = session.submit("cd nowhere").await;
        assert!(resp.did_you_mean.is_none());
    }

    #[tokio::test]
    async fn test_exit_requested() {
        let dir = tempdir().unwrap();
        let mut session = session_in(dir.path(), true);

        assert!(session.submit("exit").await.exit_requested);
        assert!(!session.submit("echo exit").await.exit_requested);
    }

    #[test]
    fn test_status_and_prompt() {
        let dir = tempdir().unwrap();
        let session = session_in(dir.path(), true);

        let status = session.status();
        assert_eq!(status.history_len, 0);
        assert!(!status.remote_available);
        assert_eq!(status.session_id, session.id());

        let base = dir
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert_eq!(session.prompt(), format!("alice@box:{}$ ", base));
    }
}
