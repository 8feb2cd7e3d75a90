//! Command registry - the closed set of builtin commands
//!
//! Adding a command means adding a `Builtin` variant; the lookup table is
//! built once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every builtin the dispatcher knows how to run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    Ls,
    Cd,
    Pwd,
    Mkdir,
    Rmdir,
    Rm,
    Cp,
    Mv,
    Cat,
    Echo,
    Touch,
    Find,
    Grep,
    Ps,
    Top,
    Df,
    Whoami,
    Date,
    Clear,
    History,
    Help,
    Exit,
}

impl Builtin {
    pub const ALL: [Builtin; 22] = [
        Builtin::Ls,
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Mkdir,
        Builtin::Rmdir,
        Builtin::Rm,
        Builtin::Cp,
        Builtin::Mv,
        Builtin::Cat,
        Builtin::Echo,
        Builtin::Touch,
        Builtin::Find,
        Builtin::Grep,
        Builtin::Ps,
        Builtin::Top,
        Builtin::Df,
        Builtin::Whoami,
        Builtin::Date,
        Builtin::Clear,
        Builtin::History,
        Builtin::Help,
        Builtin::Exit,
    ];

    /// Name typed at the prompt
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Ls => "ls",
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Mkdir => "mkdir",
            Builtin::Rmdir => "rmdir",
            Builtin::Rm => "rm",
            Builtin::Cp => "cp",
            Builtin::Mv => "mv",
            Builtin::Cat => "cat",
            Builtin::Echo => "echo",
            Builtin::Touch => "touch",
            Builtin::Find => "find",
            Builtin::Grep => "grep",
            Builtin::Ps => "ps",
            Builtin::Top => "top",
            Builtin::Df => "df",
            Builtin::Whoami => "whoami",
            Builtin::Date => "date",
            Builtin::Clear => "clear",
            Builtin::History => "history",
            Builtin::Help => "help",
            Builtin::Exit => "exit",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Builtin::Ls => "ls [-a] [-l] [path]",
            Builtin::Cd => "cd [path]",
            Builtin::Pwd => "pwd",
            Builtin::Mkdir => "mkdir [-p] <dir>...",
            Builtin::Rmdir => "rmdir <dir>...",
            Builtin::Rm => "rm [-r|-rf] [-f] <path>...",
            Builtin::Cp => "cp <src> <dst>",
            Builtin::Mv => "mv <src> <dst>",
            Builtin::Cat => "cat <file>...",
            Builtin::Echo => "echo <text>...",
            Builtin::Touch => "touch <file>...",
            Builtin::Find => "find [path] [pattern | -name <glob>]",
            Builtin::Grep => "grep [-i] <pattern> <file>...",
            Builtin::Ps => "ps",
            Builtin::Top => "top",
            Builtin::Df => "df",
            Builtin::Whoami => "whoami",
            Builtin::Date => "date",
            Builtin::Clear => "clear",
            Builtin::History => "history",
            Builtin::Help => "help [command]",
            Builtin::Exit => "exit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Builtin::Ls => "List directory contents",
            Builtin::Cd => "Change the working directory",
            Builtin::Pwd => "Print the working directory",
            Builtin::Mkdir => "Create directories",
            Builtin::Rmdir => "Remove empty directories",
            Builtin::Rm => "Remove files and directories",
            Builtin::Cp => "Copy files and directories",
            Builtin::Mv => "Move or rename files and directories",
            Builtin::Cat => "Print file contents",
            Builtin::Echo => "Print text",
            Builtin::Touch => "Create empty files or update timestamps",
            Builtin::Find => "Find files and directories by name",
            Builtin::Grep => "Search text in files",
            Builtin::Ps => "List running processes",
            Builtin::Top => "Show system resource usage",
            Builtin::Df => "Show disk usage",
            Builtin::Whoami => "Print the current user",
            Builtin::Date => "Print the current date and time",
            Builtin::Clear => "Clear the screen",
            Builtin::History => "Show command history",
            Builtin::Help => "List available commands",
            Builtin::Exit => "Exit the session",
        }
    }
}

/// Name -> builtin lookup table
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Builtin>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands = Builtin::ALL.iter().map(|b| (b.name(), *b)).collect();
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<Builtin> {
        self.commands.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// True if `name` is a builtin command name
pub fn is_builtin(name: &str) -> bool {
    Builtin::ALL.iter().any(|b| b.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.lookup("ls"), Some(Builtin::Ls));
        assert_eq!(registry.lookup("exit"), Some(Builtin::Exit));
        assert_eq!(registry.lookup("frobnicate"), None);
    }

    #[test]
    fn test_names_sorted_and_complete() {
        let names = CommandRegistry::new().names();
        assert_eq!(names.len(), Builtin::ALL.len());
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("grep"));
        assert!(!is_builtin("git"));
    }
}
