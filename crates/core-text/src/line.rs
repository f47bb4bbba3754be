//! The editable command line (C7).
//!
//! A single logical line of text (which may itself contain embedded `\n`
//! bytes once a user continues a multi-line command) plus a cursor offset
//! and an optional selection span. All offsets are byte offsets that are
//! always kept on grapheme-cluster boundaries.

use crate::grapheme;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub stop: usize,
    pub active: bool,
    anchor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Word-boundary classification styles used by [`EditLine::move_word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStyle {
    /// Word characters (alnum/underscore) and punctuation are distinct token
    /// kinds; whitespace is always a boundary.
    Punctuation,
    /// Only whitespace is a boundary; everything else is one token kind.
    WhitespaceOnly,
    /// Like `Punctuation` but `/` is also treated as a boundary, so motions
    /// land on path components.
    PathComponents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Blank,
    Other,
}

fn classify(style: WordStyle, cluster: &str) -> TokenKind {
    if cluster.chars().all(|c| c.is_whitespace()) {
        return TokenKind::Blank;
    }
    match style {
        WordStyle::WhitespaceOnly => TokenKind::Word,
        WordStyle::Punctuation => {
            if grapheme::is_word(cluster) {
                TokenKind::Word
            } else {
                TokenKind::Other
            }
        }
        WordStyle::PathComponents => {
            if cluster == "/" {
                TokenKind::Other
            } else if grapheme::is_word(cluster) {
                TokenKind::Word
            } else {
                TokenKind::Other
            }
        }
    }
}

/// Precision for [`EditLine::jump`]: land exactly on the target character
/// ("to"), or one cluster before/after it ("till").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPrecision {
    To,
    Till,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditLine {
    text: String,
    cursor: usize,
    selection: Option<Selection>,
}

impl EditLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            selection: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn clamp_to_boundary(&self, mut byte: usize) -> usize {
        byte = byte.min(self.text.len());
        while byte > 0 && !self.text.is_char_boundary(byte) {
            byte -= 1;
        }
        byte
    }

    pub fn set_cursor(&mut self, byte: usize) {
        self.cursor = self.clamp_to_boundary(byte);
    }

    /// Insert `text[start..start+len]` (clamped to valid range) at the
    /// cursor, advancing the cursor past the inserted text.
    pub fn insert_string(&mut self, text: &str, start: usize, len: usize) {
        let s = start.min(text.len());
        let e = (s + len).min(text.len());
        let s = floor_char_boundary(text, s);
        let e = ceil_char_boundary(text, e.max(s));
        let slice = &text[s..e];
        self.text.insert_str(self.cursor, slice);
        self.cursor += slice.len();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Remove one grapheme cluster before the cursor, continuing to eat
    /// zero-width (combining) clusters so that visually the cursor always
    /// erases exactly one on-screen glyph. Per the spec's resolution of the
    /// "fake composed character sequence" ambiguity we always erase whole
    /// grapheme clusters rather than individual code points, so a trailing
    /// zero-width-joiner can never be separated from its base character.
    pub fn remove_backward(&mut self) -> String {
        let mut removed_start = self.cursor;
        loop {
            if removed_start == 0 {
                break;
            }
            let prev = grapheme::prev_boundary(&self.text[..self.cursor], removed_start);
            let cluster = &self.text[prev..removed_start];
            removed_start = prev;
            if grapheme::cluster_width(cluster) > 0 || removed_start == 0 {
                break;
            }
        }
        let removed = self.text[removed_start..self.cursor].to_string();
        self.text.replace_range(removed_start..self.cursor, "");
        self.cursor = removed_start;
        removed
    }

    pub fn remove_forward(&mut self) -> String {
        if self.cursor >= self.text.len() {
            return String::new();
        }
        let next = grapheme::next_boundary(&self.text[self.cursor..], 0) + self.cursor;
        let removed = self.text[self.cursor..next].to_string();
        self.text.replace_range(self.cursor..next, "");
        removed
    }

    /// Delete `[start, stop)` (clamped, boundary-aligned) and return the
    /// removed text.
    pub fn delete_range(&mut self, start: usize, stop: usize) -> String {
        let s = self.clamp_to_boundary(start.min(stop));
        let e = self.clamp_to_boundary(start.max(stop));
        if s >= e {
            return String::new();
        }
        let removed = self.text[s..e].to_string();
        self.text.replace_range(s..e, "");
        if self.cursor >= e {
            self.cursor -= e - s;
        } else if self.cursor > s {
            self.cursor = s;
        }
        removed
    }

    pub fn replace_current_token(&mut self, new_text: &str) {
        let (start, end) = self.current_token_bounds(WordStyle::Punctuation);
        self.delete_range(start, end);
        self.cursor = start;
        self.insert_string(new_text, 0, new_text.len());
    }

    /// Bounds of the token containing the cursor, classified per `style`.
    pub fn current_token_bounds(&self, style: WordStyle) -> (usize, usize) {
        if self.text.is_empty() {
            return (0, 0);
        }
        let before = &self.text[..self.cursor];
        let start = {
            let mut b = self.cursor;
            loop {
                if b == 0 {
                    break b;
                }
                let prev = grapheme::prev_boundary(before, b);
                let cluster = &self.text[prev..b];
                if classify(style, cluster) == TokenKind::Blank {
                    break b;
                }
                b = prev;
            }
        };
        let mut b = self.cursor;
        loop {
            if b >= self.text.len() {
                break;
            }
            let next = grapheme::next_boundary(&self.text[b..], 0) + b;
            let cluster = &self.text[b..next];
            if classify(style, cluster) == TokenKind::Blank {
                break;
            }
            b = next;
        }
        (start, b)
    }

    /// Move (and optionally erase) by one word per `style`. Returns removed
    /// text when `erase` is true.
    pub fn move_word(
        &mut self,
        direction: Direction,
        erase: bool,
        style: WordStyle,
    ) -> Option<String> {
        let start = self.cursor;
        let new_pos = match direction {
            Direction::Forward => word_forward(&self.text, self.cursor, style),
            Direction::Backward => word_backward(&self.text, self.cursor, style),
        };
        if erase {
            let removed = self.delete_range(start.min(new_pos), start.max(new_pos));
            Some(removed)
        } else {
            self.cursor = new_pos;
            None
        }
    }

    /// Jump to (or just before/after) the next/previous occurrence of
    /// `target` on the current logical line.
    pub fn jump(&mut self, direction: Direction, precision: JumpPrecision, target: char) -> bool {
        match direction {
            Direction::Forward => {
                let rest = &self.text[self.cursor..];
                let mut iter = rest.char_indices().skip(1); // never match in place
                for (idx, c) in iter.by_ref() {
                    if c == target {
                        let found = self.cursor + idx;
                        self.cursor = match precision {
                            JumpPrecision::To => found,
                            JumpPrecision::Till => {
                                grapheme::prev_boundary(&self.text[..found + c.len_utf8()], found)
                            }
                        };
                        return true;
                    }
                }
                false
            }
            Direction::Backward => {
                let before = &self.text[..self.cursor];
                for (idx, c) in before.char_indices().rev() {
                    if c == target {
                        self.cursor = match precision {
                            JumpPrecision::To => idx,
                            JumpPrecision::Till => idx + c.len_utf8(),
                        };
                        return true;
                    }
                }
                false
            }
        }
    }

    pub fn begin_selection(&mut self) {
        self.selection = Some(Selection {
            start: self.cursor,
            stop: self.cursor,
            active: true,
            anchor: self.cursor,
        });
    }

    /// Update the active selection's span to cover `[anchor, cursor)` in
    /// whichever order is smaller-first, after the cursor has moved.
    pub fn update_selection(&mut self) {
        if let Some(sel) = self.selection.as_mut()
            && sel.active
        {
            sel.start = sel.anchor.min(self.cursor);
            sel.stop = sel.anchor.max(self.cursor);
        }
    }

    pub fn swap_selection_start_stop(&mut self) {
        if let Some(sel) = self.selection.as_mut() {
            let new_anchor = if sel.anchor == sel.start {
                sel.stop
            } else {
                sel.start
            };
            sel.anchor = new_anchor;
        }
    }

    pub fn end_selection(&mut self) {
        if let Some(sel) = self.selection.as_mut() {
            sel.active = false;
        }
    }

    /// Remove the active selection's span and return the removed text for
    /// the kill ring. Clears the selection.
    pub fn kill_selection(&mut self) -> Option<String> {
        let sel = self.selection.take()?;
        self.cursor = sel.start;
        Some(self.delete_range(sel.start, sel.stop))
    }
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

fn word_forward(text: &str, from: usize, style: WordStyle) -> usize {
    let mut b = from;
    // Skip the remainder of the current token if we're inside one.
    if b < text.len() {
        let next = grapheme::next_boundary(&text[b..], 0) + b;
        let cluster = &text[b..next];
        let starting_kind = classify(style, cluster);
        if starting_kind != TokenKind::Blank {
            b = skip_kind(text, b, style, starting_kind);
        }
    }
    // Skip blanks.
    while b < text.len() {
        let next = grapheme::next_boundary(&text[b..], 0) + b;
        let cluster = &text[b..next];
        if classify(style, cluster) != TokenKind::Blank {
            break;
        }
        b = next;
    }
    b
}

fn skip_kind(text: &str, mut b: usize, style: WordStyle, kind: TokenKind) -> usize {
    while b < text.len() {
        let next = grapheme::next_boundary(&text[b..], 0) + b;
        let cluster = &text[b..next];
        if classify(style, cluster) != kind {
            break;
        }
        b = next;
    }
    b
}

fn word_backward(text: &str, from: usize, style: WordStyle) -> usize {
    let mut b = from;
    while b > 0 {
        let prev = grapheme::prev_boundary(&text[..b], b);
        let cluster = &text[prev..b];
        if classify(style, cluster) != TokenKind::Blank {
            break;
        }
        b = prev;
    }
    if b == 0 {
        return 0;
    }
    let prev = grapheme::prev_boundary(&text[..b], b);
    let cluster = &text[prev..b];
    let kind = classify(style, cluster);
    let mut start = prev;
    while start > 0 {
        let before = grapheme::prev_boundary(&text[..start], start);
        let c2 = &text[before..start];
        if classify(style, c2) != kind {
            break;
        }
        start = before;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_cursor_advance() {
        let mut l = EditLine::new("");
        l.insert_char('h');
        l.insert_char('i');
        assert_eq!(l.text(), "hi");
        assert_eq!(l.cursor(), 2);
    }

    #[test]
    fn remove_backward_eats_combining_mark_with_base() {
        let mut l = EditLine::new("e\u{0301}");
        l.set_cursor(l.len());
        let removed = l.remove_backward();
        assert_eq!(removed, "e\u{0301}");
        assert!(l.is_empty());
    }

    #[test]
    fn remove_backward_single_ascii() {
        let mut l = EditLine::new("abc");
        l.set_cursor(3);
        l.remove_backward();
        assert_eq!(l.text(), "ab");
    }

    #[test]
    fn word_forward_punctuation_style() {
        let mut l = EditLine::new("foo, bar");
        l.set_cursor(0);
        l.move_word(Direction::Forward, false, WordStyle::Punctuation);
        assert_eq!(l.cursor(), 3); // stop at ','
        l.move_word(Direction::Forward, false, WordStyle::Punctuation);
        assert_eq!(l.cursor(), 5); // skip ',' and space, land on 'bar'
    }

    #[test]
    fn word_backward_from_end() {
        let mut l = EditLine::new("foo bar");
        l.set_cursor(l.len());
        l.move_word(Direction::Backward, false, WordStyle::Punctuation);
        assert_eq!(l.cursor(), 4);
    }

    #[test]
    fn path_components_style_splits_on_slash() {
        let mut l = EditLine::new("/usr/local/bin");
        l.set_cursor(0);
        l.move_word(Direction::Forward, false, WordStyle::PathComponents);
        assert_eq!(l.cursor(), 1); // just past leading '/'
        l.move_word(Direction::Forward, false, WordStyle::PathComponents);
        assert_eq!(l.cursor(), 4); // "usr"
    }

    #[test]
    fn jump_to_and_till() {
        let mut l = EditLine::new("abcXdefXghi");
        l.set_cursor(0);
        assert!(l.jump(Direction::Forward, JumpPrecision::To, 'X'));
        assert_eq!(l.cursor(), 3);
        l.set_cursor(0);
        assert!(l.jump(Direction::Forward, JumpPrecision::Till, 'X'));
        assert_eq!(l.cursor(), 2);
    }

    #[test]
    fn selection_tracks_min_max() {
        let mut l = EditLine::new("hello world");
        l.set_cursor(2);
        l.begin_selection();
        l.set_cursor(7);
        l.update_selection();
        let sel = l.selection().unwrap();
        assert_eq!((sel.start, sel.stop), (2, 7));
    }

    #[test]
    fn kill_selection_removes_and_returns_span() {
        let mut l = EditLine::new("hello world");
        l.set_cursor(0);
        l.begin_selection();
        l.set_cursor(5);
        l.update_selection();
        let killed = l.kill_selection().unwrap();
        assert_eq!(killed, "hello");
        assert_eq!(l.text(), " world");
        assert!(l.selection().is_none());
    }

    #[test]
    fn replace_current_token_preserves_surrounding_text() {
        let mut l = EditLine::new("echo gc done");
        l.set_cursor(6); // inside "gc"
        l.replace_current_token("git checkout");
        assert_eq!(l.text(), "echo git checkout done");
    }
}
