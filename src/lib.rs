//! nlterm_core - natural-language terminal command engine
//!
//! Takes one line of user input, decides whether it is a command or a
//! natural-language request, resolves requests through an ordered rule
//! table (or an optional remote model), and runs the result against a
//! per-session working directory and history.
//!
//! Modules:
//! - tokenizer: Quote-aware splitting of command lines
//! - registry: Builtin command set and metadata
//! - context: Working directory, history and environment snapshot
//! - builtins: Built-in command handlers
//! - system_stats: Process / system / disk statistics provider
//! - dispatcher: execute(line, context) -> (output, exit code)
//! - classifier: Command vs natural-language detection
//! - patterns: Ordered natural-language rule table
//! - remote: Timeout-bounded remote interpretation backend
//! - interpreter: Classifier + remote + patterns pipeline
//! - suggestions: Phrase completion and command autocorrect
//! - session: Context + pipeline, status and prompt
//! - config: YAML configuration
//! - structured_log: JSON-line logging
//! - error: Error types

pub mod structured_log;

pub mod builtins;
pub mod classifier;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod interpreter;
pub mod patterns;
pub mod registry;
pub mod remote;
pub mod session;
pub mod suggestions;
pub mod system_stats;
pub mod tokenizer;

// Re-export key types for convenience
pub use classifier::{classify, is_natural_language, InputKind};

pub use config::{LoggingConfig, RemoteConfig, TerminalConfig};

pub use context::ExecutionContext;

pub use dispatcher::{CommandInvocation, CommandOutput, Dispatcher};

pub use error::{CommandError, FsErrorKind, RemoteError};

pub use interpreter::{InterpretationResult, Interpreter, Resolution};

pub use patterns::{PatternEngine, Rule, RuleMatch};

pub use registry::{is_builtin, Builtin, CommandRegistry};

pub use remote::{GeminiBackend, RemoteBackend, RemoteInterpreter};

pub use session::{make_id, Session, SessionResponse, SessionStatus};

pub use suggestions::{Correction, SuggestionEngine};

pub use system_stats::{FixedStats, HostStats, SystemStats};
