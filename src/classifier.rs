//! Input classifier - literal command or natural language?
//!
//! Pure function of the trimmed, lower-cased input. The checks run in a
//! fixed order and the first one that fires decides.

use crate::registry::Builtin;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Command,
    NaturalLanguage,
}

/// Well-known external programs treated as literal commands
const EXTERNAL_PROGRAMS: &[&str] = &[
    "git", "npm", "docker", "python", "node", "sudo", "chmod", "chown",
];

/// Phrases that mark natural language when found anywhere in the input
const NATURAL_LANGUAGE_INDICATORS: &[&str] = &[
    "create", "make", "show", "display", "list", "go to", "change to",
    "navigate to", "delete", "remove", "copy", "move", "find", "search",
    "look for", "where", "what", "how", "can you", "please", "help me",
    "i want", "i need", "tell me", "give me", "open", "close", "start",
    "stop", "run", "execute", "launch", "install", "uninstall", "update",
];

/// True if `word` is a builtin name or a well-known external program
pub fn is_command_indicator(word: &str) -> bool {
    Builtin::ALL.iter().any(|b| b.name() == word) || EXTERNAL_PROGRAMS.contains(&word)
}

pub fn classify(raw_input: &str) -> InputKind {
    let input = raw_input.trim().to_lowercase();

    if input.is_empty() {
        return InputKind::Command;
    }

    let mut words = input.split_whitespace();
    let first = words.next().unwrap_or("");
    if is_command_indicator(first) {
        return InputKind::Command;
    }

    if NATURAL_LANGUAGE_INDICATORS
        .iter()
        .any(|phrase| input.contains(phrase))
    {
        return InputKind::NaturalLanguage;
    }

    // Single unknown word
    if words.next().is_none() {
        return InputKind::NaturalLanguage;
    }

    // Several words led by an unknown one
    if input.contains(' ') {
        return InputKind::NaturalLanguage;
    }

    InputKind::Command
}

pub fn is_natural_language(raw_input: &str) -> bool {
    classify(raw_input) == InputKind::NaturalLanguage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_command() {
        assert_eq!(classify(""), InputKind::Command);
        assert_eq!(classify("   \t "), InputKind::Command);
    }

    #[test]
    fn test_known_program_wins_over_indicators() {
        assert_eq!(classify("ls -la"), InputKind::Command);
        assert_eq!(classify("find . -name report"), InputKind::Command);
        assert_eq!(classify("git show me the log"), InputKind::Command);
        assert_eq!(classify("  LS  "), InputKind::Command);
    }

    #[test]
    fn test_indicator_phrases() {
        assert_eq!(classify("please list the files"), InputKind::NaturalLanguage);
        assert_eq!(classify("create a folder called x"), InputKind::NaturalLanguage);
        assert_eq!(classify("showfiles"), InputKind::NaturalLanguage);
    }

    #[test]
    fn test_unknown_words() {
        assert_eq!(classify("documents"), InputKind::NaturalLanguage);
        assert_eq!(classify("frobnicate the widget"), InputKind::NaturalLanguage);
    }

    #[test]
    fn test_deterministic() {
        for input in ["where am i", "ls", "documents", ""] {
            assert_eq!(classify(input), classify(input));
        }
    }
}
