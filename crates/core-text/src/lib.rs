//! Escape/width cache (C1) and editable line (C7).
//!
//! This crate has two halves: the width-measurement/escape-recognition
//! primitives that everything else (prompt layout, the pager, the screen
//! diff engine) is built on, and the editable command-line type itself.

pub mod escape;
pub mod line;
pub mod prompt_cache;
pub mod run;
pub mod segment;
pub mod width;
#[cfg(feature = "term-probe")]
pub mod width_probe;

pub use escape::{AttributeEscapeSet, escape_code_length};
pub use line::{Direction, EditLine, JumpPrecision, Selection, WordStyle};
pub use prompt_cache::{PromptLayout, PromptLayoutCache, calc_prompt_layout};
pub use run::{measure_run, measure_run_from, split_runs};
pub use width::egc_width;

/// Grapheme-cluster utilities shared by [`line`] and [`run`].
pub mod grapheme {
    use crate::egc_width;
    use unicode_segmentation::UnicodeSegmentation;

    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += egc_width(g) as usize;
        }
        col
    }

    pub fn cluster_width(g: &str) -> usize {
        egc_width(g) as usize
    }

    pub fn is_word(g: &str) -> bool {
        g.chars()
            .next()
            .map(|c| c == '_' || c.is_alphanumeric())
            .unwrap_or(false)
    }
}
