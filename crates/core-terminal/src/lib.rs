//! Terminal backend: raw-mode entry/exit and the stdout/stderr mtime probe
//! the screen diff engine (C3) uses to detect a foreign writer.
//!
//! Unlike a full-screen editor, an interactive shell reader does not take
//! over an alternate screen — its output lives in the same scrollback the
//! executed commands write to, so entering/leaving is limited to raw mode
//! (no canonical line editing or signal-generating control characters) and
//! bracketed-paste/focus reporting, which `core-input`'s async service
//! already assumes is enabled.

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::fs::Metadata;
use std::io;
use std::time::SystemTime;

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

#[derive(Default)]
pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring raw mode is left even if the caller early-returns or
/// panics (e.g. mid-command execution, per §5's terminal-ownership-transfer
/// note).
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

/// The modification times of stdout and stderr, used by the screen diff
/// engine to notice an external writer touched the terminal between
/// repaints (§4.3 "forced repaint vs self-modification detection"). `Eio`
/// distinguishes "the fd is gone" (terminal closed, escalate to exit) from
/// an ordinary stat failure that should just be ignored for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOutcome {
    Times(Option<SystemTime>, Option<SystemTime>),
    Eio,
}

fn mtime(meta: &Metadata) -> Option<SystemTime> {
    meta.modified().ok()
}

/// Stat stdout and stderr. Any error other than `EIO` is swallowed (the
/// spec treats all terminal I/O errors as non-fatal); `EIO` specifically
/// signals the terminal was closed out from under the process.
pub fn stat_std_streams() -> StatOutcome {
    use std::os::fd::AsFd;
    let out = std::io::stdout();
    let err = std::io::stderr();
    match (out.as_fd().try_clone_to_owned(), err.as_fd().try_clone_to_owned()) {
        (Ok(out_fd), Ok(err_fd)) => {
            let out_file = std::fs::File::from(out_fd);
            let err_file = std::fs::File::from(err_fd);
            let out_meta = out_file.metadata();
            let err_meta = err_file.metadata();
            if is_eio(&out_meta) || is_eio(&err_meta) {
                return StatOutcome::Eio;
            }
            let out_time = out_meta.ok().as_ref().and_then(mtime);
            let err_time = err_meta.ok().as_ref().and_then(mtime);
            StatOutcome::Times(out_time, err_time)
        }
        _ => StatOutcome::Times(None, None),
    }
}

fn is_eio(result: &io::Result<Metadata>) -> bool {
    matches!(result, Err(e) if e.raw_os_error() == Some(libc_eio()))
}

#[cfg(unix)]
fn libc_eio() -> i32 {
    5 // EIO on Linux/BSD/macOS
}

#[cfg(not(unix))]
fn libc_eio() -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_std_streams_returns_times_in_test_harness() {
        match stat_std_streams() {
            StatOutcome::Times(_, _) => {}
            StatOutcome::Eio => panic!("stdout/stderr should be statable under the test harness"),
        }
    }
}
