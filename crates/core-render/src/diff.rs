//! Line-by-line diffing between the actual and desired screen grids
//! (§4.3 "Diffing").
//!
//! For each row: find the shared prefix with `actual`, back the prefix up
//! out of any zero-width (combining) character run so a diff never starts
//! mid-cluster, move the cursor to the first differing column (clamped so a
//! continuation line's indentation is never skipped past), and re-emit the
//! remaining desired cells, clearing to end-of-line when the old row was
//! wider. Rows beyond the desired grid's length are cleared with a single
//! clear-to-end-of-screen once moved onto.

use crate::grid::{Cell, ScreenGrid, ScreenLine};
use crate::motion::cursor_motion;
use crate::resolve::StyleResolver;
use core_color::HighlightSpec;
use core_terminal::TerminalCapabilities;

pub struct DiffOutput {
    pub bytes: String,
    pub end_cursor: (usize, usize),
}

/// Shared prefix length between `actual` and `desired`, in cells, backed up
/// so it never splits a zero-width run: if the candidate boundary cell in
/// `desired` is itself zero-width, the split point backs up to the start of
/// that run.
fn shared_prefix_len(actual: &[Cell], desired: &[Cell]) -> usize {
    let mut n = 0;
    while n < actual.len() && n < desired.len() && actual[n] == desired[n] {
        n += 1;
    }
    while n > 0 && desired.get(n).is_some_and(|c| c.width() == 0) {
        n -= 1;
    }
    n
}

fn prefix_width(cells: &[Cell], len: usize) -> usize {
    cells[..len].iter().map(Cell::width).sum()
}

/// Diff one row. `believed` is the engine's current belief about the
/// cursor's on-screen position; it is updated in place as bytes are
/// emitted. Returns the bytes to write for this row.
///
/// `prev_soft_wrap` is whether the line above wraps into this one by the
/// terminal's own soft wrap rather than an emitted newline; `next_differs`
/// is whether the following row will need rewriting.
#[allow(clippy::too_many_arguments)]
fn diff_line(
    row: usize,
    actual: &ScreenLine,
    desired: &ScreenLine,
    prev_soft_wrap: bool,
    next_differs: bool,
    believed: &mut (usize, usize),
    last_highlight: &mut Option<HighlightSpec>,
    caps: &TerminalCapabilities,
    resolver: &mut StyleResolver,
    env_version: u64,
) -> String {
    if actual == desired {
        return String::new();
    }

    let mut shared = shared_prefix_len(&actual.cells, &desired.cells);
    let min_skip = desired.indent * 4;
    let mut skip_width = prefix_width(&desired.cells, shared).max(if row > 0 { min_skip.min(desired.width()) } else { 0 });

    // A soft-wrapped line's trailing columns decide where the terminal's own
    // wrap lands (e.g. a wide character that doesn't fit pushes the wrap
    // earlier); if the row below is about to be rewritten, never trust the
    // cached actual state for this line's last two columns.
    if desired.soft_wrap && next_differs {
        let clamp_to = desired.width().saturating_sub(2);
        if skip_width > clamp_to {
            skip_width = clamp_to;
            let mut w = 0;
            shared = 0;
            for (i, cell) in desired.cells.iter().enumerate() {
                if w >= clamp_to {
                    break;
                }
                w += cell.width();
                shared = i + 1;
            }
        }
    }

    // Re-resolve the shared-prefix length against the clamped skip width:
    // clamping can only ever grow the skip past a prefix made entirely of
    // padding spaces, which compare equal regardless, so cell-for-cell
    // matching up to `shared` remains valid.
    let mut out = String::new();
    // If the previous row soft-wrapped and we just finished writing all the
    // way to its right edge, the terminal already carried the cursor here on
    // its own; an explicit motion would be redundant (and on some terminals,
    // wrong, since the wrap is the only thing that makes column 0 reachable
    // without an extra newline).
    let landed_by_wrap = row > 0 && prev_soft_wrap && skip_width == 0 && believed.1 == row - 1;
    if landed_by_wrap {
        believed.0 = skip_width;
        believed.1 = row;
    } else {
        out.push_str(&cursor_motion(caps, *believed, (skip_width, row)));
        believed.0 = skip_width;
        believed.1 = row;
    }

    for cell in &desired.cells[shared..] {
        if last_highlight.map(|h| h != cell.highlight).unwrap_or(true) {
            out.push_str(&resolver.sequence_for(cell.highlight, caps, env_version));
            *last_highlight = Some(cell.highlight);
        }
        out.push(cell.ch);
        believed.0 += cell.width();
    }

    if actual.width() > desired.width() {
        if let Some(clr) = caps.clr_eol {
            out.push_str(clr);
        }
    }

    out
}

/// Diff the full grids. `believed_start` is the on-screen cursor position
/// before this frame's writes begin (typically the end-cursor of the
/// previous frame).
pub fn diff(
    actual: &ScreenGrid,
    desired: &ScreenGrid,
    believed_start: (usize, usize),
    caps: &TerminalCapabilities,
    resolver: &mut StyleResolver,
    env_version: u64,
) -> DiffOutput {
    let mut out = String::new();
    let mut believed = believed_start;
    let mut last_highlight = None;
    let mut prev_soft_wrap = false;

    let common_rows = actual.lines.len().max(desired.lines.len());
    let empty = ScreenLine::default();

    for row in 0..common_rows {
        let actual_line = actual.lines.get(row).unwrap_or(&empty);
        if row >= desired.lines.len() {
            // Past the end of the desired grid: clear once and stop.
            out.push_str(&cursor_motion(caps, believed, (0, row)));
            believed = (0, row);
            if let Some(clr) = caps.clr_eos {
                out.push_str(clr);
            } else if let Some(clr) = caps.clr_eol {
                for r in row..actual.lines.len() {
                    out.push_str(&cursor_motion(caps, believed, (0, r)));
                    out.push_str(clr);
                    believed = (0, r);
                }
            }
            break;
        }
        let desired_line = &desired.lines[row];
        let next_differs = match (actual.lines.get(row + 1), desired.lines.get(row + 1)) {
            (Some(a), Some(d)) => a != d,
            (None, None) => false,
            _ => true,
        };
        out.push_str(&diff_line(
            row,
            actual_line,
            desired_line,
            prev_soft_wrap,
            next_differs,
            &mut believed,
            &mut last_highlight,
            caps,
            resolver,
            env_version,
        ));
        prev_soft_wrap = desired_line.soft_wrap;
    }

    out.push_str(&cursor_motion(caps, believed, desired.cursor));
    believed = desired.cursor;

    DiffOutput {
        bytes: out,
        end_cursor: believed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_color::HighlightRole;
    use core_config::ColorEnvironment;

    struct NoColors;
    impl ColorEnvironment for NoColors {
        fn get(&self, _variable: &str) -> Option<String> {
            None
        }
    }

    fn line(text: &str) -> ScreenGrid {
        let mut g = ScreenGrid::new(80);
        g.append_str(text, HighlightSpec::normal(), 0, 0);
        g.set_cursor(text.chars().count(), 0);
        g
    }

    #[test]
    fn identical_grids_emit_nothing() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let a = line("hello");
        let d = line("hello");
        let result = diff(&a, &d, (5, 0), &caps, &mut resolver, 1);
        assert_eq!(result.bytes, "");
        assert_eq!(result.end_cursor, (5, 0));
    }

    #[test]
    fn single_char_change_only_rewrites_the_suffix() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let a = line("hello");
        let d = line("hellp");
        let result = diff(&a, &d, (5, 0), &caps, &mut resolver, 1);
        assert!(result.bytes.contains('p'));
        assert!(!result.bytes.contains('h'));
    }

    #[test]
    fn shrinking_line_clears_to_eol() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let a = line("hello world");
        let d = line("hello");
        let result = diff(&a, &d, (11, 0), &caps, &mut resolver, 1);
        assert!(result.bytes.contains(caps.clr_eol.unwrap()));
    }

    #[test]
    fn fewer_desired_lines_clears_to_eos() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let mut a = ScreenGrid::new(80);
        a.append_str("one", HighlightSpec::normal(), 0, 0);
        a.append('\n', HighlightSpec::normal(), 0, 0);
        a.append_str("two", HighlightSpec::normal(), 0, 0);
        let d = line("one");
        let result = diff(&a, &d, (3, 1), &caps, &mut resolver, 1);
        assert!(result.bytes.contains(caps.clr_eos.unwrap()));
    }

    #[test]
    fn soft_wrap_landing_suppresses_cursor_motion() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let mut a = ScreenGrid::new(4);
        a.append_str("abcd", HighlightSpec::normal(), 0, 0);
        assert!(a.lines[0].soft_wrap);

        let mut d = ScreenGrid::new(4);
        d.append_str("abcd", HighlightSpec::normal(), 0, 0);
        d.append('e', HighlightSpec::normal(), 0, 0);

        // Cursor believed to be right after the soft-wrapped row: the
        // terminal's own wrap already carried it to (0, 1).
        let result = diff(&a, &d, (4, 0), &caps, &mut resolver, 1);
        assert!(!result.bytes.contains('\r'));
        assert!(!result.bytes.contains('\x1b'));
        assert!(result.bytes.contains('e'));
    }

    #[test]
    fn soft_wrapped_line_reemits_last_two_columns_when_next_row_changes() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let mut a = ScreenGrid::new(5);
        a.append_str("abcdX", HighlightSpec::normal(), 0, 0);

        let mut d = ScreenGrid::new(5);
        d.append_str("abcde", HighlightSpec::normal(), 0, 0);
        d.append('f', HighlightSpec::normal(), 0, 0);

        let result = diff(&a, &d, (5, 0), &caps, &mut resolver, 1);
        assert!(result.bytes.contains('d'));
        assert!(result.bytes.contains('e'));
    }

    #[test]
    fn highlight_change_emits_a_style_sequence() {
        let env = NoColors;
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let a = ScreenGrid::new(80);
        let mut d = ScreenGrid::new(80);
        d.append_str("ls", HighlightSpec::new(HighlightRole::Command), 0, 0);
        let result = diff(&a, &d, (0, 0), &caps, &mut resolver, 1);
        assert!(result.bytes.contains("ls"));
    }
}
