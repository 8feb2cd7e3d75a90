//! Pattern interpretation engine
//!
//! An ordered table of (phrase regex, command template) rules. Input is
//! trimmed, lower-cased and whitespace-collapsed, then the table is scanned
//! top to bottom; the first rule that matches the *whole* input wins and no
//! later rule is consulted. Specific phrasings therefore sit above the
//! catch-alls that would otherwise swallow them ("show me the files" above
//! "show me <file>", "go to home directory" above "go to <dir>").
//!
//! Templates use positional placeholders `{0}`, `{1}`, ... filled from the
//! capture groups after trimming surrounding quotes; a capture that would not
//! tokenize back to a single word is shell-quoted.

use crate::tokenizer::strip_quotes;
use regex::Regex;
use serde_json::json;

/// Built-in rules, highest precedence first
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    // Creation
    (r"(?:create|make) (?:a )?(?:new )?(?:empty )?(?:text )?(?:file|document) (?:called |named |name )?(.+)", "touch {0}"),
    (r"(?:create|make) (?:a )?(?:new )?(?:empty )?(?:folder|directory) (?:called |named |name )?(.+)", "mkdir {0}"),
    // Listing the current directory
    (r"(?:show|list|display) (?:me )?(?:all )?(?:the )?hidden files", "ls -a"),
    (r"(?:show|list|display) (?:me )?(?:all )?(?:the )?files (?:in detail|with details|in long format)", "ls -l"),
    (r"(?:show|list|display) (?:me )?(?:all )?(?:the )?files(?: here)?", "ls"),
    // Introspection
    (r"where am i", "pwd"),
    (r"(?:show|display|print) (?:me )?(?:the )?current (?:working )?directory", "pwd"),
    (r"what(?:'s| is) (?:the )?(?:current )?(?:working )?directory", "pwd"),
    (r"current (?:working )?directory", "pwd"),
    (r"(?:show|list|display) (?:me )?(?:the )?(?:all )?(?:running )?processes", "ps"),
    (r"running processes", "ps"),
    (r"(?:show|display) (?:me )?(?:the )?system (?:info|information|stats|status|resources)", "top"),
    (r"system (?:info|information)", "top"),
    (r"(?:show|display|check) (?:me )?(?:the )?disk (?:usage|space)", "df"),
    (r"(?:how much )?disk (?:usage|space)(?: is left)?", "df"),
    (r"(?:show|display) (?:me )?(?:the |my )?(?:command )?history", "history"),
    (r"command history", "history"),
    (r"who am i", "whoami"),
    (r"what(?:'s| is) my (?:user ?name|user)", "whoami"),
    (r"what time is it", "date"),
    (r"what(?:'s| is) (?:the )?(?:current )?(?:date|time)(?: today)?", "date"),
    (r"(?:show|display) (?:me )?(?:the )?(?:current )?(?:date|time)", "date"),
    // Screen and session
    (r"(?:clear|clean) (?:the )?(?:screen|terminal)", "clear"),
    (r"(?:show )?(?:me )?(?:the )?help", "help"),
    (r"what can you do", "help"),
    (r"what commands are (?:there|available)", "help"),
    (r"(?:exit|quit|close|leave) (?:the )?(?:terminal|shell|session)", "exit"),
    // Listing another directory
    (r"(?:list|show) (?:me )?(?:the )?files (?:in|of|inside) (?:the )?(?:directory |folder )?(.+)", "ls {0}"),
    (r"(?:show|display) (?:me )?(?:the )?contents? of (?:the )?(?:directory|folder) (.+)", "ls {0}"),
    (r"list (?:the )?(?:files|contents?) (?:in |of )?(?:the )?(?:directory |folder )?(.+)", "ls {0}"),
    // Navigation
    (r"(?:go|change|navigate|switch) (?:back )?to (?:the |my )?home(?: directory| folder)?", "cd ~"),
    (r"go home", "cd ~"),
    (r"(?:go|move) (?:up|back)(?: one (?:level|directory))?", "cd .."),
    (r"(?:go|change|navigate) to (?:the )?parent(?: directory| folder)?", "cd .."),
    (r"change (?:the )?(?:directory|folder) to (.+)", "cd {0}"),
    (r"(?:go|change|navigate|switch) (?:in)?to (?:the )?(?:directory |folder )?(.+)", "cd {0}"),
    (r"(?:open|enter) (?:the )?(?:directory|folder) (.+)", "cd {0}"),
    // Reading files
    (r"(?:show|display) (?:me )?(?:the )?(?:contents? of )?(?:the )?(?:file )?(.+)", "cat {0}"),
    (r"(?:read|open|print) (?:the )?(?:file )?(.+)", "cat {0}"),
    // Deletion
    (r"(?:delete|remove|erase) (?:the )?(?:folder|directory) (?:called |named )?(.+)", "rm -r {0}"),
    (r"(?:delete|remove|erase) (?:the )?(?:file )?(?:called |named )?(.+)", "rm {0}"),
    // Copy / move
    (r"copy (?:the )?(?:file |folder |directory )?(.+) (?:to|into) (.+)", "cp {0} {1}"),
    (r"(?:move|rename) (?:the )?(?:file |folder |directory )?(.+) (?:to|into|as) (.+)", "mv {0} {1}"),
    // Search
    (r"(?:search|look) for (?:the )?(?:text|word|string|pattern) (.+) in (?:the )?(?:file )?(.+)", "grep {0} {1}"),
    (r#"(?:find|search for|look for|locate) (?:the |all |any )?(?:files? |folders? |directories )?(?:named |called )?(.+)"#, r#"find . -name "*{0}*""#),
    // Misc
    (r"say (.+)", "echo {0}"),
];

lazy_static::lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\d+)\}").expect("placeholder regex");
}

/// A (matcher, template) pair
#[derive(Debug, Clone)]
pub struct Rule {
    source: String,
    matcher: Regex,
    template: String,
}

impl Rule {
    /// Compile a rule; the pattern is anchored to match the whole input
    pub fn new(pattern: &str, template: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: pattern.to_string(),
            matcher: Regex::new(&format!("^(?:{})$", pattern))?,
            template: template.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Captured groups for a full match (absent groups become "")
    fn captures(&self, normalized: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(normalized)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| strip_quotes(m.as_str()).to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

/// Outcome of a successful match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub command: String,
    pub rule_index: usize,
    pub pattern: String,
}

/// Ordered, immutable rule table
#[derive(Debug, Clone)]
pub struct PatternEngine {
    rules: Vec<Rule>,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternEngine {
    /// Engine with the built-in rule table
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES).expect("built-in rule table must compile")
    }

    /// Engine with a custom table, in precedence order
    pub fn with_rules(rules: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(pattern, template)| Rule::new(pattern, template))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Resolve natural language to a command line, or None
    pub fn interpret(&self, natural_language: &str) -> Option<String> {
        self.interpret_detailed(natural_language).map(|m| m.command)
    }

    /// Like `interpret`, also reporting which rule fired
    pub fn interpret_detailed(&self, natural_language: &str) -> Option<RuleMatch> {
        let normalized = normalize(natural_language);
        if normalized.is_empty() {
            return None;
        }

        self.rules.iter().enumerate().find_map(|(idx, rule)| {
            let groups = rule.captures(&normalized)?;
            Some(RuleMatch {
                command: render_template(rule.template(), &groups, rule.pattern()),
                rule_index: idx,
                pattern: rule.pattern().to_string(),
            })
        })
    }
}

/// Trim, lower-case and collapse runs of whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Quote a captured phrase so the rendered line tokenizes back to one word
fn quote_capture(value: &str, in_double_quotes: bool) -> String {
    if in_double_quotes {
        return value.replace('\\', "\\\\").replace('"', "\\\"");
    }
    match shell_words::split(value) {
        Ok(words) if words.len() == 1 && words[0] == value => value.to_string(),
        _ if value.is_empty() => String::new(),
        _ => shell_words::quote(value).into_owned(),
    }
}

/// Fill `{n}` placeholders. Placeholders without a captured group become empty.
fn render_template(template: &str, groups: &[String], pattern: &str) -> String {
    let mut missing = Vec::new();
    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
        let idx: usize = caps[1].parse().unwrap_or(usize::MAX);
        let start = caps.get(0).map_or(0, |m| m.start());
        let in_double_quotes = template[..start].matches('"').count() % 2 == 1;
        match groups.get(idx) {
            Some(value) => quote_capture(value, in_double_quotes),
            None => {
                missing.push(idx);
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        crate::slog_warn!(
            "INTERPRET",
            "template_underfilled",
            json!({ "pattern": pattern, "template": template, "missing": missing })
        );
    }

    rendered.trim().to_string()
}
