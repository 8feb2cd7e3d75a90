//! Tokenizer - split a raw input line into words
//! Honors single/double quotes and backslash escapes; no globbing, pipes or redirection.

use crate::error::CommandError;

/// Split a line into words. Unterminated quotes are a parse error.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(line).map_err(|e| CommandError::Parse(e.to_string()))
}

/// Strip one layer of matching surrounding quotes and whitespace
pub fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize("ls -la /tmp").unwrap(), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_quoted_words() {
        let words = tokenize(r#"echo "hello world" 'single quoted' plain"#).unwrap();
        assert_eq!(words, vec!["echo", "hello world", "single quoted", "plain"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"echo "oops"#).unwrap_err();
        assert!(err.to_string().starts_with("Parse error:"));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("  'notes.txt' "), "notes.txt");
        assert_eq!(strip_quotes("\"demo\""), "demo");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
