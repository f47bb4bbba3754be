//! Prompt truncation + layout, with an LRU cache (C1).

use crate::escape::AttributeEscapeSet;
use crate::run::{measure_run, split_runs};
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "…";
const DEFAULT_CACHE_CAP: usize = 12;

/// Result of laying a (possibly multi-line) prompt string out against a
/// maximum line width: the truncated text itself, the byte offsets of line
/// breaks within it, the widest line, and the width of the last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLayout {
    pub text: String,
    pub line_breaks: Vec<usize>,
    pub max_line_width: usize,
    pub last_line_width: usize,
}

fn truncate_run_to_width(run: &str, max_width: usize, attrs: &AttributeEscapeSet) -> String {
    if max_width == 0 {
        return String::new();
    }
    let ellipsis_width = measure_run(ELLIPSIS, attrs);
    if ellipsis_width >= max_width {
        // No room even for the ellipsis; best effort is an empty line.
        return String::new();
    }
    let budget = max_width - ellipsis_width;
    let mut out = String::new();
    let mut width = 0usize;
    for g in run.graphemes(true) {
        if g == "\t" {
            // Tabs force re-measurement from the start of the truncated run;
            // since the run is rebuilt from scratch that's automatic here.
            let next_stop = ((width / 8) + 1) * 8;
            if next_stop > budget {
                break;
            }
            width = next_stop;
            out.push('\t');
            continue;
        }
        if g.starts_with('\x1b') {
            out.push_str(g);
            continue;
        }
        let w = measure_run(g, attrs);
        if width + w > budget {
            break;
        }
        width += w;
        out.push_str(g);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Compute the truncated layout of `prompt` for a maximum line width of
/// `max_line_width` columns. Pure function; see [`PromptLayoutCache`] for a
/// memoized wrapper.
pub fn calc_prompt_layout(
    prompt: &str,
    max_line_width: usize,
    attrs: &AttributeEscapeSet,
) -> PromptLayout {
    let lines: Vec<&str> = prompt.split('\n').collect();
    let mut out_lines = Vec::with_capacity(lines.len());
    let mut widths = Vec::with_capacity(lines.len());

    for line in &lines {
        let runs = split_runs(line);
        let joined_width: usize = runs.iter().map(|r| measure_run(r, attrs)).sum();
        if max_line_width >= 2 && joined_width > max_line_width {
            // Truncate the whole (run-joined) line as a unit.
            out_lines.push(truncate_run_to_width(line, max_line_width, attrs));
            widths.push(max_line_width.min(measure_run(
                out_lines.last().unwrap(),
                attrs,
            )));
        } else {
            out_lines.push((*line).to_string());
            widths.push(joined_width);
        }
    }

    let mut text = String::new();
    let mut line_breaks = Vec::new();
    for (i, line) in out_lines.iter().enumerate() {
        if i > 0 {
            line_breaks.push(text.len());
            text.push('\n');
        }
        text.push_str(line);
    }
    let max_line_width_out = widths.iter().copied().max().unwrap_or(0);
    let last_line_width = widths.last().copied().unwrap_or(0);

    PromptLayout {
        text,
        line_breaks,
        max_line_width: max_line_width_out,
        last_line_width,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    prompt: String,
    max_line_width: usize,
}

/// LRU cache over [`calc_prompt_layout`], bounded to a fixed small capacity.
pub struct PromptLayoutCache {
    entries: Vec<(CacheKey, PromptLayout)>,
    cap: usize,
}

impl Default for PromptLayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAP)
    }
}

impl PromptLayoutCache {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::with_capacity(cap),
            cap: cap.max(1),
        }
    }

    pub fn get_or_compute(
        &mut self,
        prompt: &str,
        max_line_width: usize,
        attrs: &AttributeEscapeSet,
    ) -> PromptLayout {
        let key = CacheKey {
            prompt: prompt.to_string(),
            max_line_width,
        };
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            let entry = self.entries.remove(pos);
            let value = entry.1.clone();
            self.entries.push((entry.0, entry.1));
            return value;
        }
        let layout = calc_prompt_layout(prompt, max_line_width, attrs);
        if self.entries.len() >= self.cap {
            self.entries.remove(0);
        }
        self.entries.push((key, layout.clone()));
        layout
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
