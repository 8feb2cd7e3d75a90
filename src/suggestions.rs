//! Suggestion engine
//!
//! Completes partial natural-language input from a fixed phrase list (every
//! phrase is a prefix the pattern rules understand), optionally asks the
//! remote backend for richer completions, and proposes builtin names for
//! mistyped commands using Levenshtein distance.

use crate::patterns::normalize;
use crate::registry::Builtin;
use crate::remote::RemoteInterpreter;
use serde::{Deserialize, Serialize};

/// Most suggestions returned for one partial input
pub const MAX_SUGGESTIONS: usize = 5;

/// Largest edit distance still offered as a correction
pub const MAX_CORRECTION_DISTANCE: usize = 2;

/// Phrase starters, most common first
pub const COMMON_PHRASES: &[&str] = &[
    "create a new file called",
    "create a new folder called",
    "show me the contents of",
    "list the files in",
    "go to directory",
    "delete the file",
    "copy file",
    "move file",
    "show current directory",
    "show running processes",
    "show system information",
    "find file",
    "clear the screen",
];

/// A proposed replacement for an unknown command name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub command: String,
    pub distance: usize,
}

pub struct SuggestionEngine {
    remote: Option<RemoteInterpreter>,
    remote_min_chars: usize,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(None, 3)
    }
}

impl SuggestionEngine {
    pub fn new(remote: Option<RemoteInterpreter>, remote_min_chars: usize) -> Self {
        Self {
            remote,
            remote_min_chars,
        }
    }

    /// Local completions: matching phrases, then builtin names for a bare word
    pub fn basic(&self, partial: &str) -> Vec<String> {
        let prefix = normalize(partial);
        let mut out: Vec<String> = COMMON_PHRASES
            .iter()
            .filter(|phrase| phrase.starts_with(&prefix))
            .map(|phrase| phrase.to_string())
            .collect();

        if !prefix.is_empty() && !prefix.contains(' ') {
            out.extend(
                Builtin::ALL
                    .iter()
                    .map(|b| b.name())
                    .filter(|name| name.starts_with(&prefix) && *name != prefix)
                    .map(str::to_string),
            );
        }

        out.truncate(MAX_SUGGESTIONS);
        out
    }

    /// Remote completions when available and the input is long enough,
    /// otherwise (or on any remote failure) the local ones
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        if let Some(remote) = &self.remote {
            if partial.trim().chars().count() >= self.remote_min_chars {
                if let Some(mut remote_suggestions) = remote.suggest(partial).await {
                    remote_suggestions.truncate(MAX_SUGGESTIONS);
                    return remote_suggestions;
                }
            }
        }
        self.basic(partial)
    }

    /// Closest builtin within `MAX_CORRECTION_DISTANCE`; None for exact or distant names
    pub fn correct_command(&self, name: &str) -> Option<Correction> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || Builtin::ALL.iter().any(|b| b.name() == name) {
            return None;
        }

        Builtin::ALL
            .iter()
            .map(|b| (b.name(), levenshtein_distance(&name, b.name())))
            .filter(|(_, distance)| *distance <= MAX_CORRECTION_DISTANCE)
            // min_by_key keeps the first of equal distances, i.e. registry order
            .min_by_key(|(_, distance)| *distance)
            .map(|(command, distance)| Correction {
                original: name.clone(),
                command: command.to_string(),
                distance,
            })
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev: Vec<usize> = (0..=len2).collect();
    let mut curr = vec![0usize; len2 + 1];

    for i in 1..=len1 {
        curr[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[len2]
}
