//! Abbreviation expansion at command position (§4.10).
//!
//! Finds the enclosing command substitution through [`ParserApi`], splits
//! it into `;`/`|`/`&`/newline-separated statements (honoring quotes so a
//! separator character inside a string doesn't split it), and expands the
//! leading token of the statement containing the cursor if it names a
//! registered abbreviation and isn't itself an argument or redirection
//! target.

use crate::parser_api::ParserApi;
use core_config::Config;
use std::ops::Range;

struct CommandToken {
    start: usize,
    end: usize,
}

/// The first whitespace-delimited token of the statement (within `range`)
/// that contains `cursor`, or `None` if `cursor` doesn't fall on a leading
/// command token — either because it's in an argument, in the whitespace
/// before the command, or the token begins with a redirection character.
fn locate_command_token(text: &str, range: Range<usize>, cursor: usize) -> Option<CommandToken> {
    let slice = &text[range.clone()];
    let rel_cursor = cursor.checked_sub(range.start)?;

    let mut statement_start = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut boundaries = Vec::new();
    for (i, c) in slice.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_single => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ';' | '|' | '&' | '\n' if !in_single && !in_double => {
                boundaries.push((statement_start, i));
                statement_start = i + c.len_utf8();
            }
            _ => {}
        }
        let _ = i;
    }
    boundaries.push((statement_start, slice.len()));

    for (s, e) in boundaries {
        if rel_cursor < s || rel_cursor > e {
            continue;
        }
        let stmt = &slice[s..e];
        let leading_ws = stmt.len() - stmt.trim_start().len();
        let token_start_rel = s + leading_ws;
        if token_start_rel > rel_cursor {
            return None; // cursor sits in the whitespace before the command
        }
        let rest = &slice[token_start_rel..e];
        let token_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token_end_rel = token_start_rel + token_len;
        if rel_cursor > token_end_rel + 1 {
            return None; // cursor is past the command token by more than a trigger char
        }
        if rest.starts_with(['<', '>', '&']) {
            return None; // a redirection, not a command token
        }
        return Some(CommandToken {
            start: range.start + token_start_rel,
            end: range.start + token_end_rel,
        });
    }
    None
}

/// Expand the abbreviation at `cursor`, if any. Returns the new text and
/// the adjusted cursor position.
///
/// Cursor adjustment: if the cursor falls at or inside the token (`cursor
/// <= token.end`), it keeps its distance from the token's start, clamped to
/// the expansion's length. If the cursor is past the token's end (it
/// usually is — the trigger character that fired this expansion was
/// already inserted there), it simply shifts by the length delta between
/// the token and its expansion, the same as any other text splice.
pub fn expand_abbreviation(
    text: &str,
    cursor: usize,
    config: &Config,
    parser: &dyn ParserApi,
) -> Option<(String, usize)> {
    let (sub_start, sub_end) = parser.locate_cmdsubst_extent(text, cursor);
    let token = locate_command_token(text, sub_start..sub_end, cursor)?;
    let name = &text[token.start..token.end];
    let expansion = config.abbreviation(name)?.to_string();

    let mut new_text = String::with_capacity(text.len() - name.len() + expansion.len());
    new_text.push_str(&text[..token.start]);
    new_text.push_str(&expansion);
    new_text.push_str(&text[token.end..]);

    let token_len = token.end - token.start;
    let new_cursor = if cursor <= token.end {
        token.start + (cursor - token.start).min(expansion.len())
    } else {
        cursor + expansion.len() - token_len
    };

    Some((new_text, new_cursor))
}
