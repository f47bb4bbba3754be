//! Byte output with stat-based self-modification detection (§4.3 "forced
//! repaint vs self-modification detection").
//!
//! Before every frame the engine stats stdout/stderr; if either has a
//! newer mtime than what this `Outputter` last recorded, something other
//! than this process wrote to the terminal since the last frame (a
//! background job, `set_color` from a completion script, ...) and the
//! engine must treat its believed screen contents as stale and repaint in
//! full rather than diff against them.

use anyhow::Result;
use core_terminal::{StatOutcome, stat_std_streams};
use std::io::{self, Write};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing has touched the terminal since our last write.
    Clean,
    /// Something else wrote to stdout/stderr since our last write.
    ForeignWriter,
    /// The terminal file descriptor is gone; the caller should exit.
    Eio,
}

pub struct Outputter {
    last_out: Option<SystemTime>,
    last_err: Option<SystemTime>,
}

impl Default for Outputter {
    fn default() -> Self {
        Self::new()
    }
}

impl Outputter {
    pub fn new() -> Self {
        let mut out = Self {
            last_out: None,
            last_err: None,
        };
        out.refresh();
        out
    }

    /// Stat stdout/stderr and compare against what this `Outputter` last
    /// recorded, without updating its record.
    pub fn observe(&self) -> WriteOutcome {
        match stat_std_streams() {
            StatOutcome::Eio => WriteOutcome::Eio,
            StatOutcome::Times(out, err) => {
                if out != self.last_out || err != self.last_err {
                    WriteOutcome::ForeignWriter
                } else {
                    WriteOutcome::Clean
                }
            }
        }
    }

    fn refresh(&mut self) {
        if let StatOutcome::Times(out, err) = stat_std_streams() {
            self.last_out = out;
            self.last_err = err;
        }
    }

    /// Write `bytes` to stdout, flush, and record the resulting mtimes so
    /// the next frame's `observe` reflects writes this process made.
    pub fn commit(&mut self, bytes: &str) -> Result<()> {
        if !bytes.is_empty() {
            let mut stdout = io::stdout();
            stdout.write_all(bytes.as_bytes())?;
            stdout.flush()?;
        }
        self.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_outputter_observes_clean() {
        let out = Outputter::new();
        assert_eq!(out.observe(), WriteOutcome::Clean);
    }

    #[test]
    fn commit_of_empty_string_still_refreshes_without_writing() {
        let mut out = Outputter::new();
        out.commit("").unwrap();
        assert_eq!(out.observe(), WriteOutcome::Clean);
    }
}
