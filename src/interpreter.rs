//! Interpretation pipeline
//!
//! raw line -> classifier -> (remote, then patterns) -> InterpretationResult
//!
//! A leading literal `ai ` forces the natural-language route. In lenient
//! mode an input nobody could interpret is handed back as a literal command
//! line; in strict mode `resolved_command` is None.

use crate::classifier::{classify, InputKind};
use crate::config::TerminalConfig;
use crate::patterns::PatternEngine;
use crate::remote::RemoteInterpreter;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Prefix that forces natural-language interpretation
pub const FORCE_PREFIX: &str = "ai ";

/// Which stage produced the command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Input was already a command line
    Literal,
    Remote,
    Pattern,
    /// Natural language nobody understood, passed through (lenient)
    Passthrough,
    /// Natural language nobody understood (strict)
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationResult {
    /// Command line to dispatch; None only for a strict-mode miss
    pub resolved_command: Option<String>,
    pub is_natural_language: bool,
    pub original_input: String,
    pub explanation: Option<String>,
    pub resolution: Resolution,
}

impl InterpretationResult {
    fn literal(input: &str) -> Self {
        Self {
            resolved_command: Some(input.to_string()),
            is_natural_language: false,
            original_input: input.to_string(),
            explanation: None,
            resolution: Resolution::Literal,
        }
    }
}

pub struct Interpreter {
    patterns: PatternEngine,
    remote: Option<RemoteInterpreter>,
    lenient: bool,
}

impl Interpreter {
    pub fn new(patterns: PatternEngine, remote: Option<RemoteInterpreter>, lenient: bool) -> Self {
        Self {
            patterns,
            remote,
            lenient,
        }
    }

    /// Built-in rules plus the Gemini backend when a key is configured
    pub fn from_config(config: &TerminalConfig) -> Self {
        Self::new(
            PatternEngine::new(),
            RemoteInterpreter::from_config(&config.remote),
            config.lenient_interpretation,
        )
    }

    pub fn remote_available(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote(&self) -> Option<&RemoteInterpreter> {
        self.remote.as_ref()
    }

    pub fn patterns(&self) -> &PatternEngine {
        &self.patterns
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Classify and, for natural language, resolve to a command line
    pub async fn process_input(&self, user_input: &str) -> InterpretationResult {
        let input = user_input.trim();
        let (text, forced) = split_force_prefix(input);

        if text.is_empty() || (!forced && classify(text) == InputKind::Command) {
            return InterpretationResult::literal(text);
        }

        if let Some(remote) = &self.remote {
            if let Some(command) = remote.interpret(text).await {
                return self.resolved(text, command, Resolution::Remote);
            }
        }

        self.from_patterns(text)
    }

    /// Pattern-only variant, no suspension
    pub fn interpret_local(&self, user_input: &str) -> InterpretationResult {
        let input = user_input.trim();
        let (text, forced) = split_force_prefix(input);

        if text.is_empty() || (!forced && classify(text) == InputKind::Command) {
            return InterpretationResult::literal(text);
        }
        self.from_patterns(text)
    }

    fn from_patterns(&self, text: &str) -> InterpretationResult {
        match self.patterns.interpret_detailed(text) {
            Some(m) => {
                crate::slog_debug!(
                    "INTERPRET",
                    "pattern_match",
                    json!({ "input": text, "rule": m.rule_index, "command": m.command })
                );
                self.resolved(text, m.command, Resolution::Pattern)
            }
            None => self.miss(text),
        }
    }

    fn resolved(&self, text: &str, command: String, resolution: Resolution) -> InterpretationResult {
        InterpretationResult {
            explanation: Some(format!("Interpreted: '{}' -> '{}'", text, command)),
            resolved_command: Some(command),
            is_natural_language: true,
            original_input: text.to_string(),
            resolution,
        }
    }

    fn miss(&self, text: &str) -> InterpretationResult {
        crate::slog_info!(
            "INTERPRET",
            "miss",
            json!({ "input": text, "lenient": self.lenient })
        );

        let explanation = Some(format!("Could not interpret natural language: '{}'", text));
        if self.lenient {
            InterpretationResult {
                resolved_command: Some(text.to_string()),
                is_natural_language: false,
                original_input: text.to_string(),
                explanation,
                resolution: Resolution::Passthrough,
            }
        } else {
            InterpretationResult {
                resolved_command: None,
                is_natural_language: true,
                original_input: text.to_string(),
                explanation,
                resolution: Resolution::Unresolved,
            }
        }
    }
}

/// Strip a leading `ai ` (any case); reports whether it was present
fn split_force_prefix(input: &str) -> (&str, bool) {
    match input.get(..FORCE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(FORCE_PREFIX) => {
            (input[FORCE_PREFIX.len()..].trim(), true)
        }
        _ => (input, false),
    }
}
