//! Completion application (§4.10, second half): splice a completion
//! candidate into the command line honoring the token's quoting context.

use core_pager::{CompletionCandidate, CompletionFlags};

pub struct ApplyResult {
    pub text: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    None,
    Single,
    Double,
}

/// Bounds of the whitespace-delimited token containing `cursor`. Unlike
/// [`core_text::EditLine::current_token_bounds`] this doesn't need a live
/// `EditLine`, only the raw text — quote characters are not treated as
/// separators here since completion always operates within one token.
fn token_bounds(text: &str, cursor: usize) -> (usize, usize) {
    let before = &text[..cursor];
    let start = before
        .rfind(char::is_whitespace)
        .map(|i| i + before[i..].chars().next().unwrap().len_utf8())
        .unwrap_or(0);
    let after = &text[cursor..];
    let end = after
        .find(char::is_whitespace)
        .map(|i| cursor + i)
        .unwrap_or(text.len());
    (start, end)
}

/// Quote state at the end of `slice`, tracking backslash escapes (only
/// meaningful outside a single-quoted run, matching shell quoting rules).
fn scan_quote_state(slice: &str) -> QuoteState {
    let mut state = QuoteState::None;
    let mut escaped = false;
    for c in slice.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (state, c) {
            (QuoteState::None, '\\') => escaped = true,
            (QuoteState::None, '\'') => state = QuoteState::Single,
            (QuoteState::None, '"') => state = QuoteState::Double,
            (QuoteState::Single, '\'') => state = QuoteState::None,
            (QuoteState::Double, '\\') => escaped = true,
            (QuoteState::Double, '"') => state = QuoteState::None,
            _ => {}
        }
    }
    state
}

fn escape_for_single_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_for_double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

const SHELL_METACHARS: &[char] = &[
    ' ', '\t', '\n', '$', '`', '"', '\'', '\\', '*', '?', '[', ']', '(', ')', '<', '>', '|', '&', ';', '#',
];

fn shell_escape(s: &str, suppress_tilde: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        if c == '~' && i == 0 && suppress_tilde {
            out.push(c);
            continue;
        }
        if c == '~' && i == 0 || SHELL_METACHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Apply `candidate` at `cursor` in `text`, per §4.10: replace-token vs.
/// append-at-cursor, quote-aware escaping, and the trailing-space rule.
pub fn apply_completion(text: &str, cursor: usize, candidate: &CompletionCandidate, suppress_tilde: bool) -> ApplyResult {
    let (token_start, token_end) = token_bounds(text, cursor);
    let no_space = candidate.flags.contains(CompletionFlags::NO_SPACE);

    if candidate.flags.contains(CompletionFlags::REPLACES_TOKEN) {
        let mut new_text = String::new();
        new_text.push_str(&text[..token_start]);
        new_text.push_str(&candidate.completion);
        let mut cursor_after = token_start + candidate.completion.len();
        new_text.push_str(&text[cursor.max(token_end)..]);
        if !no_space {
            new_text.insert(cursor_after, ' ');
            cursor_after += 1;
        }
        return ApplyResult {
            text: new_text,
            cursor: cursor_after,
        };
    }

    let quote = scan_quote_state(&text[token_start..cursor]);

    // The token may already be closed by an unescaped matching quote sitting
    // right at the cursor (e.g. the cursor was left inside "'foo'" before its
    // closing quote). In that case the existing quote must be kept, not
    // duplicated: the insertion still lands at `cursor`, but the trailing
    // space goes after that quote instead of a freshly inserted one.
    let already_closed = match quote {
        QuoteState::Single => text[cursor..].starts_with('\''),
        QuoteState::Double => text[cursor..].starts_with('"'),
        QuoteState::None => false,
    };

    let insert_text = match quote {
        QuoteState::None => shell_escape(&candidate.completion, suppress_tilde),
        QuoteState::Single => escape_for_single_quote(&candidate.completion),
        QuoteState::Double => escape_for_double_quote(&candidate.completion),
    };

    let mut new_text = String::new();
    new_text.push_str(&text[..cursor]);
    new_text.push_str(&insert_text);
    let mut new_cursor = cursor + insert_text.len();
    new_text.push_str(&text[cursor..]);

    if !no_space {
        match quote {
            QuoteState::Single | QuoteState::Double if already_closed => {
                // The existing closing quote is still there right after the
                // insertion point; step past it before placing the space.
                new_cursor += 1;
                new_text.insert(new_cursor, ' ');
                new_cursor += 1;
            }
            QuoteState::Single => {
                new_text.insert(new_cursor, '\'');
                new_cursor += 1;
                new_text.insert(new_cursor, ' ');
                new_cursor += 1;
            }
            QuoteState::Double => {
                new_text.insert(new_cursor, '"');
                new_cursor += 1;
                new_text.insert(new_cursor, ' ');
                new_cursor += 1;
            }
            QuoteState::None => {
                new_text.insert(new_cursor, ' ');
                new_cursor += 1;
            }
        }
    }

    ApplyResult {
        text: new_text,
        cursor: new_cursor,
    }
}
