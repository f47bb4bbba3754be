//! Degraded rendering for terminals with no usable cursor-motion
//! capability (§4.3 "dumb-terminal fallback").
//!
//! Line-by-line diffing depends on being able to move the cursor back onto
//! an earlier row; without that, the engine gives up on incremental
//! updates entirely and just reprints the last logical line from a bare
//! carriage return, truncated to the terminal width rather than left to
//! wrap unpredictably.

use crate::grid::ScreenGrid;

pub fn render_dumb(desired: &ScreenGrid) -> String {
    let mut out = String::from("\r");
    if let Some(last) = desired.lines.last() {
        let mut budget = desired.width;
        for cell in &last.cells {
            let w = cell.width();
            if w > budget {
                break;
            }
            out.push(cell.ch);
            budget -= w;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_color::HighlightSpec;

    #[test]
    fn prints_only_the_last_line_from_carriage_return() {
        let mut grid = ScreenGrid::new(10);
        grid.append_str("first", HighlightSpec::normal(), 0, 0);
        grid.append('\n', HighlightSpec::normal(), 0, 0);
        grid.append_str("second", HighlightSpec::normal(), 0, 0);
        let out = render_dumb(&grid);
        assert_eq!(out, "\rsecond");
    }

    #[test]
    fn truncates_at_terminal_width() {
        let mut grid = ScreenGrid::new(3);
        // A width-3 grid soft-wraps "abcdef" into two lines; the fallback
        // only ever prints the last one, already clamped by construction.
        grid.append_str("abcdef", HighlightSpec::normal(), 0, 0);
        let out = render_dumb(&grid);
        assert!(out.len() <= 1 + 3);
    }
}
