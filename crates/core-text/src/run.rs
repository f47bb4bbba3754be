//! Run splitting and display-width measurement (C1).
//!
//! A *run* is a maximal slice of text containing no run terminator (`\0`,
//! `\n`, `\r`, `\f`). `measure_run` walks a run, skipping recognized escape
//! sequences (width 0), advancing tabs to the next 8-column stop, and
//! treating a leading control character (width -1 from `unicode_width`) as
//! contributing 0 columns.

use crate::egc_width;
use crate::escape::{AttributeEscapeSet, escape_code_length};
use unicode_segmentation::UnicodeSegmentation;

const TAB_STOP: usize = 8;

fn is_run_terminator(c: char) -> bool {
    matches!(c, '\0' | '\n' | '\r' | '\x0c')
}

/// Split `text` into runs at (but not including) any run terminator.
pub fn split_runs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        if is_run_terminator(c) {
            out.push(&text[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    out.push(&text[start..]);
    out
}

/// Measure the display width of a single run, honoring tabs and escapes.
/// `col` is the starting column (needed so tab stops land correctly when a
/// run is measured mid-line, e.g. after a truncation point).
pub fn measure_run_from(run: &str, start_col: usize, attrs: &AttributeEscapeSet) -> usize {
    let mut col = start_col;
    let mut i = 0usize;
    let bytes_len = run.len();
    while i < bytes_len {
        let rest = &run[i..];
        let ch = rest.chars().next().unwrap();
        if ch == '\x1b' {
            let len = escape_code_length(rest, attrs);
            if len > 0 {
                i += len;
                continue;
            }
        }
        if ch == '\t' {
            let next_stop = ((col / TAB_STOP) + 1) * TAB_STOP;
            col = next_stop;
            i += 1;
            continue;
        }
        // Advance one grapheme cluster at a time so combining sequences are
        // measured as a unit rather than per code point.
        let cluster = rest.graphemes(true).next().unwrap();
        if i == 0 && cluster.chars().count() == 1 {
            let c = cluster.chars().next().unwrap();
            if c.is_control() {
                i += cluster.len();
                continue; // leading control: contributes 0, per spec.
            }
        }
        col += egc_width(cluster) as usize;
        i += cluster.len();
    }
    col - start_col
}

/// Measure a run starting at column 0.
pub fn measure_run(run: &str, attrs: &AttributeEscapeSet) -> usize {
    measure_run_from(run, 0, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeEscapeSet {
        AttributeEscapeSet::new(vec!["\x1b[1m".into()])
    }

    #[test]
    fn empty_run_has_zero_width() {
        assert_eq!(measure_run("", &attrs()), 0);
    }

    #[test]
    fn additive_over_non_escape_split() {
        let a = "hello ";
        let b = "world";
        let wa = measure_run(a, &attrs());
        let combined = measure_run(&format!("{a}{b}"), &attrs());
        let wb = measure_run_from(b, wa, &attrs());
        assert_eq!(combined, wa + wb);
    }

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(measure_run("\t", &attrs()), 8);
        assert_eq!(measure_run("a\t", &attrs()), 8);
        assert_eq!(measure_run("ab\t", &attrs()), 8);
        assert_eq!(measure_run("a\tb", &attrs()), 9);
    }

    #[test]
    fn escapes_contribute_zero_width() {
        assert_eq!(measure_run("\x1b[1mhi", &attrs()), 2);
    }

    #[test]
    fn split_runs_respects_terminators() {
        let runs = split_runs("a\nb\0c\rd\x0ce");
        assert_eq!(runs, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn leading_control_char_has_zero_width() {
        assert_eq!(measure_run("\x07ok", &attrs()), 2);
    }
}
