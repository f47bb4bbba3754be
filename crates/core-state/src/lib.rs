//! Session state: the editable line plus the bookkeeping the editor loop
//! (C8) needs around it — the kill ring, the generation counter that
//! invalidates async worker results, and the highlight spec array kept in
//! lockstep with the line's code points.
//!
//! There is no undo here: unlike a text editor, a shell command line has no
//! undo history once a command executes, and within one line the kill ring
//! already covers "put last deletion back".

use core_color::HighlightSpec;
use core_text::EditLine;
use core_workers::Generation;
use std::sync::Arc;

const KILL_RING_MAX: usize = 32;

/// An immutable read of the current line, handed to workers that must never
/// see (or race with) further edits.
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub text: String,
    pub cursor: usize,
    pub generation: u64,
}

/// Owns one interactive session's editable line. Every mutation goes through
/// [`Session::edit`], which bumps the shared generation counter and keeps
/// `highlights` the right length per the highlight invariant (§3): its
/// length always equals the number of code points in the line's text.
pub struct Session {
    line: EditLine,
    highlights: Vec<HighlightSpec>,
    autosuggestion: Option<String>,
    kill_ring: Vec<String>,
    yank_cursor: Option<usize>,
    generation: Arc<Generation>,
}

impl Session {
    pub fn new(generation: Arc<Generation>) -> Self {
        Self {
            line: EditLine::new(""),
            highlights: Vec::new(),
            autosuggestion: None,
            kill_ring: Vec::new(),
            yank_cursor: None,
            generation,
        }
    }

    pub fn line(&self) -> &EditLine {
        &self.line
    }

    pub fn highlights(&self) -> &[HighlightSpec] {
        &self.highlights
    }

    pub fn autosuggestion(&self) -> Option<&str> {
        self.autosuggestion.as_deref()
    }

    pub fn set_autosuggestion(&mut self, suggestion: Option<String>) {
        self.autosuggestion = suggestion;
    }

    pub fn generation(&self) -> &Arc<Generation> {
        &self.generation
    }

    /// Run `f` against the line, bump the generation, and reset highlights
    /// to the default role for the new length. A highlighter worker
    /// re-paints them asynchronously via [`Session::apply_highlights`]; until
    /// it does, the line renders unhighlighted rather than with stale colors
    /// from before the edit.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut EditLine) -> R) -> R {
        let result = f(&mut self.line);
        self.generation.bump();
        self.reset_highlights();
        self.autosuggestion = None;
        result
    }

    fn reset_highlights(&mut self) {
        let len = self.line.text().chars().count();
        self.highlights = vec![HighlightSpec::normal(); len];
    }

    /// Replace the highlight array with a worker's result, but only if it
    /// was computed against the generation that is current *now* and its
    /// length still matches the line (the line may have changed again while
    /// the worker ran, in which case the result is simply stale).
    pub fn apply_highlights(&mut self, generation: u64, specs: Vec<HighlightSpec>) -> bool {
        if generation != self.generation.current() {
            return false;
        }
        if specs.len() != self.line.text().chars().count() {
            return false;
        }
        self.highlights = specs;
        true
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            text: self.line.text().to_string(),
            cursor: self.line.cursor(),
            generation: self.generation.current(),
        }
    }

    /// Push a newly killed span onto the ring, most-recent first, and reset
    /// the yank cursor so the next `yank` starts from it.
    pub fn push_kill(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.kill_ring.insert(0, text);
        self.kill_ring.truncate(KILL_RING_MAX);
        self.yank_cursor = None;
    }

    /// Append-kill: extend the most recent ring entry instead of pushing a
    /// new one (used by consecutive kill-line presses).
    pub fn append_kill(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.kill_ring.first_mut() {
            Some(top) => top.push_str(text),
            None => self.kill_ring.push(text.to_string()),
        }
        self.yank_cursor = None;
    }

    /// Text to insert for `yank`: the most recent kill ring entry.
    pub fn yank(&mut self) -> Option<&str> {
        if self.kill_ring.is_empty() {
            return None;
        }
        self.yank_cursor = Some(0);
        self.kill_ring.first().map(String::as_str)
    }

    /// Cycle to the next-older kill ring entry after a yank; `None` once a
    /// full cycle of the ring has been completed.
    pub fn yank_pop(&mut self) -> Option<&str> {
        let cursor = self.yank_cursor?;
        let next = (cursor + 1) % self.kill_ring.len().max(1);
        if next == cursor && self.kill_ring.len() <= 1 {
            return None;
        }
        self.yank_cursor = Some(next);
        self.kill_ring.get(next).map(String::as_str)
    }

    pub fn kill_ring(&self) -> &[String] {
        &self.kill_ring
    }
}
