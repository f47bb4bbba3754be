//! A best-effort lexical highlighter run on the C9 worker pool.
//!
//! The real colorizer described in §3 (command / param / quote / operator
//! / comment roles) normally leans on the parser's AST, but that parser is
//! an external collaborator this core only reaches through
//! [`crate::parser_api::ParserApi`]'s narrow completeness check — it has no
//! token-level API. This module is the same kind of conservative stand-in
//! as [`crate::parser_api::NaiveParser`]: a single left-to-right scan that
//! assigns roles from quoting state and command-position bookkeeping,
//! good enough to paint a command line without needing a real AST.

use core_color::{HighlightRole, HighlightSpec};

const ABBREV_TRIGGERS_LIKE: &[char] = &[';', '|', '&'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Highlight one snapshot of the command line, one [`HighlightSpec`] per
/// code point (the highlight invariant the caller must preserve when
/// storing the result back onto [`core_state::Session`]).
pub fn highlight(text: &str) -> Vec<HighlightSpec> {
    let mut specs = Vec::with_capacity(text.chars().count());
    let mut quote = Quote::None;
    let mut escaped = false;
    let mut at_command_position = true;

    for c in text.chars() {
        let role = if escaped {
            escaped = false;
            HighlightRole::Escape
        } else {
            match (quote, c) {
                (Quote::None, '\\') => {
                    escaped = true;
                    HighlightRole::Escape
                }
                (Quote::None, '\'') => {
                    quote = Quote::Single;
                    HighlightRole::Quote
                }
                (Quote::Single, '\'') => {
                    quote = Quote::None;
                    HighlightRole::Quote
                }
                (Quote::Single, _) => HighlightRole::Quote,
                (Quote::None, '"') => {
                    quote = Quote::Double;
                    HighlightRole::Quote
                }
                (Quote::Double, '"') => {
                    quote = Quote::None;
                    HighlightRole::Quote
                }
                (Quote::Double, '\\') => {
                    escaped = true;
                    HighlightRole::Escape
                }
                (Quote::Double, _) => HighlightRole::Quote,
                (Quote::None, '#') => HighlightRole::Comment,
                (Quote::None, '>' | '<') => HighlightRole::Redirection,
                (Quote::None, c) if ABBREV_TRIGGERS_LIKE.contains(&c) => {
                    at_command_position = true;
                    HighlightRole::StatementTerminator
                }
                (Quote::None, c) if c.is_whitespace() => HighlightRole::Normal,
                (Quote::None, _) => {
                    if at_command_position {
                        at_command_position = false;
                        HighlightRole::Command
                    } else {
                        HighlightRole::Param
                    }
                }
            }
        };
        specs.push(HighlightSpec::new(role));
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_length_matches_char_count() {
        let text = "echo 'hi there' | cat # done";
        assert_eq!(highlight(text).len(), text.chars().count());
    }

    #[test]
    fn first_token_is_command_role() {
        let specs = highlight("echo hi");
        assert_eq!(specs[0].foreground, Some(HighlightRole::Command));
        assert_eq!(specs[5].foreground, Some(HighlightRole::Param));
    }

    #[test]
    fn quoted_span_is_quote_role() {
        let specs = highlight("echo 'hi'");
        assert_eq!(specs[5].foreground, Some(HighlightRole::Quote));
        assert_eq!(specs[8].foreground, Some(HighlightRole::Quote));
    }

    #[test]
    fn pipe_resets_command_position() {
        let specs = highlight("echo hi | cat");
        // 'c' of "cat" starts right after "| " at index 10.
        assert_eq!(specs[10].foreground, Some(HighlightRole::Command));
    }

    #[test]
    fn comment_marker_is_comment_role() {
        let specs = highlight("echo hi # comment");
        let hash_idx = "echo hi # comment".find('#').unwrap();
        assert_eq!(specs[hash_idx].foreground, Some(HighlightRole::Comment));
    }
}
