//! Command dispatcher
//! - Records the raw line, tokenizes it, looks up the builtin and runs it
//! - Every path returns an (output, exit code) pair; nothing here aborts a session

use crate::builtins::{self, HandlerEnv};
use crate::context::ExecutionContext;
use crate::error::CommandError;
use crate::registry::CommandRegistry;
use crate::system_stats::{HostStats, SystemStats};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub output: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code: 0,
        }
    }

    pub fn failure(err: &CommandError) -> Self {
        Self {
            output: err.to_string(),
            exit_code: err.exit_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A tokenized line, alive for the duration of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub arguments: Vec<String>,
    pub raw_line: String,
}

impl CommandInvocation {
    /// Tokenize a raw line; `Ok(None)` for a blank line
    pub fn parse(raw_line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = tokenize(raw_line)?;
        if words.is_empty() {
            return Ok(None);
        }
        let name = words.remove(0);
        Ok(Some(Self {
            name,
            arguments: words,
            raw_line: raw_line.to_string(),
        }))
    }
}

/// Runs command lines against an execution context
pub struct Dispatcher {
    registry: CommandRegistry,
    stats: Box<dyn SystemStats>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Box::new(HostStats::new()))
    }
}

impl Dispatcher {
    pub fn new(stats: Box<dyn SystemStats>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            stats,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Execute one raw line. The line is appended to history before anything else.
    pub fn execute(&self, raw_line: &str, ctx: &mut ExecutionContext) -> CommandOutput {
        ctx.record(raw_line);

        let result = match CommandInvocation::parse(raw_line) {
            Ok(Some(invocation)) => self.run(&invocation, ctx),
            Ok(None) => Ok(String::new()),
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(output) => CommandOutput::success(output),
            Err(e) => CommandOutput::failure(&e),
        };

        crate::slog_debug!(
            "DISPATCH",
            "executed",
            json!({
                "line": raw_line,
                "exit_code": outcome.exit_code,
                "cwd": ctx.cwd_string(),
            })
        );

        outcome
    }

    fn run(&self, invocation: &CommandInvocation, ctx: &mut ExecutionContext) -> Result<String, CommandError> {
        let builtin = self
            .registry
            .lookup(&invocation.name)
            .ok_or_else(|| CommandError::UnknownCommand(invocation.name.clone()))?;

        let mut env = HandlerEnv {
            ctx,
            stats: self.stats.as_ref(),
            registry: &self.registry,
        };
        builtins::run(builtin, &invocation.arguments, &mut env)
    }
}
