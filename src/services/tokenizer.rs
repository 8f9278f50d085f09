//! Line tokenizer
//!
//! Splits playlist text into trimmed, non-empty lines. Two limits keep the
//! work per source bounded regardless of input size:
//!
//! - `max_lines`: only the first N non-empty lines are kept, the rest of the
//!   source is ignored (`SourceTruncated`).
//! - `max_line_length`: a single line longer than the limit is discarded as
//!   noise (`LineTooLong`).
//!
//! Neither condition aborts the parse.

use crate::config::Config;
use crate::models::{Diagnostic, DiagnosticKind};

/// A trimmed line borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// 1-based physical line number
    pub line: usize,
    pub text: &'a str,
}

/// Tokenize `text` into at most `config.max_lines` lines
pub fn tokenize<'a>(
    text: &'a str,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let line = index + 1;

        if trimmed.len() > config.max_line_length {
            tracing::warn!(
                line = line,
                length = trimmed.len(),
                limit = config.max_line_length,
                "Skipping oversized playlist line"
            );
            diagnostics.push(Diagnostic::at_line(
                line,
                DiagnosticKind::LineTooLong {
                    length: trimmed.len(),
                    limit: config.max_line_length,
                },
            ));
            continue;
        }

        if tokens.len() >= config.max_lines {
            tracing::warn!(
                line = line,
                limit = config.max_lines,
                "Playlist exceeds max line count, truncating"
            );
            diagnostics.push(Diagnostic::at_line(
                line,
                DiagnosticKind::SourceTruncated {
                    limit: config.max_lines,
                },
            ));
            break;
        }

        tokens.push(Token { line, text: trimmed });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_trims_and_drops_blank_lines() {
        let mut diags = Vec::new();
        let tokens = tokenize("  #EXTM3U  \r\n\n   \n\thttp://a\t\n", &Config::default(), &mut diags);

        assert_eq!(texts(&tokens), vec!["#EXTM3U", "http://a"]);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 4);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_truncates_at_max_lines() {
        let config = Config {
            max_lines: 2,
            ..Config::default()
        };
        let mut diags = Vec::new();
        let tokens = tokenize("a\nb\n\nc\nd", &config, &mut diags);

        assert_eq!(texts(&tokens), vec!["a", "b"]);
        assert_eq!(
            diags,
            vec![Diagnostic::at_line(4, DiagnosticKind::SourceTruncated { limit: 2 })]
        );
    }

    #[test]
    fn test_exact_line_count_is_not_truncated() {
        let config = Config {
            max_lines: 2,
            ..Config::default()
        };
        let mut diags = Vec::new();
        let tokens = tokenize("a\nb\n\n", &config, &mut diags);

        assert_eq!(tokens.len(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_skips_oversized_line_only() {
        let config = Config {
            max_line_length: 8,
            ..Config::default()
        };
        let mut diags = Vec::new();
        let tokens = tokenize("short\nthis line is too long\nok", &config, &mut diags);

        assert_eq!(texts(&tokens), vec!["short", "ok"]);
        assert_eq!(
            diags,
            vec![Diagnostic::at_line(
                2,
                DiagnosticKind::LineTooLong { length: 21, limit: 8 }
            )]
        );
    }

    #[test]
    fn test_empty_input() {
        let mut diags = Vec::new();
        assert!(tokenize("", &Config::default(), &mut diags).is_empty());
        assert!(diags.is_empty());
    }
}
