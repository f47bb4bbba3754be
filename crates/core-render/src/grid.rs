//! The desired/actual screen grid (§3 "screen grid") and the append
//! primitive the editor loop uses to build one frame's desired grid
//! (§4.3 "Building the desired grid").

use core_color::HighlightSpec;
use unicode_width::UnicodeWidthChar;

/// One screen cell: a code point plus the highlight spec attached to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub highlight: HighlightSpec,
}

impl Cell {
    pub fn new(ch: char, highlight: HighlightSpec) -> Self {
        Self { ch, highlight }
    }

    /// Display width of this cell's code point; zero for combining marks.
    pub fn width(&self) -> usize {
        self.ch.width().unwrap_or(0)
    }
}

/// A single screen line: its cells plus whether the terminal's own wrap
/// (rather than an emitted newline) carries output onto the next line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenLine {
    pub cells: Vec<Cell>,
    pub soft_wrap: bool,
    pub indent: usize,
}

impl ScreenLine {
    pub fn width(&self) -> usize {
        self.cells.iter().map(Cell::width).sum()
    }
}

/// The full desired (or actual) grid: an ordered sequence of lines plus a
/// cursor and the known terminal width it was built against.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenGrid {
    pub lines: Vec<ScreenLine>,
    pub cursor: (usize, usize),
    pub width: usize,
}

impl ScreenGrid {
    pub fn new(width: usize) -> Self {
        Self {
            lines: vec![ScreenLine::default()],
            cursor: (0, 0),
            width: width.max(1),
        }
    }

    fn current_row_width(&self) -> usize {
        self.lines.last().map(ScreenLine::width).unwrap_or(0)
    }

    fn push_line(&mut self, indent: usize) {
        self.lines.push(ScreenLine {
            cells: Vec::new(),
            soft_wrap: false,
            indent,
        });
        self.cursor.1 += 1;
        self.cursor.0 = 0;
    }

    /// Append one character with its highlight to the grid, implementing
    /// the newline/carriage-return/soft-wrap rules of §4.3.
    ///
    /// `indent` is the current nesting depth (multiplied by 4 columns on a
    /// line break); `first_line_prompt_width` is added to every
    /// continuation line's indentation so wrapped command lines stay
    /// aligned under the prompt.
    pub fn append(
        &mut self,
        ch: char,
        highlight: HighlightSpec,
        indent: usize,
        first_line_prompt_width: usize,
    ) {
        match ch {
            '\n' => {
                if let Some(last) = self.lines.last_mut() {
                    last.soft_wrap = false;
                }
                self.push_line(indent);
                let pad = first_line_prompt_width + indent * 4;
                for _ in 0..pad {
                    self.append(' ', HighlightSpec::normal(), indent, first_line_prompt_width);
                }
            }
            '\r' => {
                if let Some(last) = self.lines.last_mut() {
                    last.cells.clear();
                }
                self.cursor.0 = 0;
            }
            _ => {
                let width = ch.width().unwrap_or(0);
                if self.current_row_width() + width > self.width {
                    if let Some(last) = self.lines.last_mut() {
                        last.soft_wrap = true;
                    }
                    self.push_line(indent);
                }
                self.lines
                    .last_mut()
                    .expect("grid always has at least one line")
                    .cells
                    .push(Cell::new(ch, highlight));
                self.cursor.0 += width;
                if self.cursor.0 == self.width {
                    if let Some(last) = self.lines.last_mut() {
                        last.soft_wrap = true;
                    }
                    self.push_line(indent);
                }
            }
        }
    }

    /// Append a whole string of uniformly-highlighted text.
    pub fn append_str(&mut self, text: &str, highlight: HighlightSpec, indent: usize, first_line_prompt_width: usize) {
        for ch in text.chars() {
            self.append(ch, highlight, indent, first_line_prompt_width);
        }
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor = (x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_color::HighlightRole;

    #[test]
    fn newline_starts_fresh_line_and_clears_soft_wrap() {
        let mut grid = ScreenGrid::new(80);
        grid.append_str("abc", HighlightSpec::normal(), 0, 0);
        grid.append('\n', HighlightSpec::normal(), 0, 0);
        assert_eq!(grid.lines.len(), 2);
        assert!(!grid.lines[0].soft_wrap);
        assert_eq!(grid.cursor, (0, 1));
    }

    #[test]
    fn carriage_return_clears_current_line() {
        let mut grid = ScreenGrid::new(80);
        grid.append_str("hello", HighlightSpec::normal(), 0, 0);
        grid.append('\r', HighlightSpec::normal(), 0, 0);
        assert!(grid.lines[0].cells.is_empty());
        assert_eq!(grid.cursor.0, 0);
    }

    #[test]
    fn exceeding_width_soft_wraps() {
        let mut grid = ScreenGrid::new(4);
        grid.append_str("abcde", HighlightSpec::normal(), 0, 0);
        assert_eq!(grid.lines.len(), 2);
        assert!(grid.lines[0].soft_wrap);
        assert_eq!(grid.lines[0].cells.len(), 4);
        assert_eq!(grid.lines[1].cells.len(), 1);
    }

    #[test]
    fn exact_width_fill_also_soft_wraps() {
        let mut grid = ScreenGrid::new(3);
        grid.append_str("abc", HighlightSpec::normal(), 0, 0);
        assert_eq!(grid.lines.len(), 2);
        assert!(grid.lines[0].soft_wrap);
        assert!(grid.lines[1].cells.is_empty());
    }

    #[test]
    fn newline_indents_continuation_by_prompt_and_nesting() {
        let mut grid = ScreenGrid::new(80);
        grid.append_str("echo", HighlightSpec::new(HighlightRole::Command), 0, 0);
        grid.append('\n', HighlightSpec::normal(), 1, 2);
        assert_eq!(grid.lines[1].cells.len(), 2 + 4);
        assert!(grid.lines[1].cells.iter().all(|c| c.ch == ' '));
    }
}
