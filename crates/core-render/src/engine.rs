//! The screen diff engine (C3): ties the grid, diffing, color resolution
//! and output modules together, holding the believed cursor position and
//! the last-written "actual" grid across frames (§4.3).

use crate::diff::diff;
use crate::dumb::render_dumb;
use crate::grid::ScreenGrid;
use crate::output::{Outputter, WriteOutcome};
use crate::resolve::StyleResolver;
use anyhow::{Result, bail};
use core_config::ColorEnvironment;
use core_terminal::TerminalCapabilities;
use tracing::{debug, warn};

pub struct ScreenDiffEngine<'a> {
    caps: TerminalCapabilities,
    resolver: StyleResolver<'a>,
    output: Outputter,
    actual: ScreenGrid,
    believed_cursor: (usize, usize),
    env_version: u64,
    width: usize,
}

impl<'a> ScreenDiffEngine<'a> {
    pub fn new(env: &'a dyn ColorEnvironment, caps: TerminalCapabilities, width: usize) -> Self {
        let resolver = StyleResolver::new(env, caps.color_support);
        Self {
            caps,
            resolver,
            output: Outputter::new(),
            actual: ScreenGrid::new(width),
            believed_cursor: (0, 0),
            env_version: 0,
            width,
        }
    }

    /// Discard the believed screen contents so the next `update` repaints
    /// from a blank grid, e.g. after SIGWINCH or a caller-requested forced
    /// repaint (`ForceRepaint`/`Repaint` commands).
    pub fn force_repaint(&mut self) {
        self.actual = ScreenGrid::new(self.width);
        self.believed_cursor = (0, self.believed_cursor.1);
    }

    pub fn resize(&mut self, width: usize) {
        self.width = width;
        self.force_repaint();
    }

    /// Bump the environment version, e.g. after a config reload or a
    /// `fish_color_*`-style variable changes; cached role resolutions are
    /// invalidated lazily on the next `update`.
    pub fn bump_env_version(&mut self) {
        self.env_version += 1;
    }

    /// Push one frame: diff `desired` against the believed screen contents
    /// (or fall back to the dumb path) and write the result. Returns an
    /// error only when the terminal file descriptor itself is gone.
    pub fn update(&mut self, desired: &ScreenGrid) -> Result<()> {
        match self.output.observe() {
            WriteOutcome::Eio => bail!("terminal closed (EIO on stdout/stderr)"),
            WriteOutcome::ForeignWriter => {
                debug!("detected foreign write to the terminal; forcing a full repaint");
                self.force_repaint();
            }
            WriteOutcome::Clean => {}
        }

        let bytes = if self.caps.is_dumb() {
            render_dumb(desired)
        } else {
            let result = diff(
                &self.actual,
                desired,
                self.believed_cursor,
                &self.caps,
                &mut self.resolver,
                self.env_version,
            );
            self.believed_cursor = result.end_cursor;
            result.bytes
        };

        if let Err(err) = self.output.commit(&bytes) {
            warn!(%err, "failed writing render output");
            return Err(err);
        }

        self.actual = desired.clone();
        if self.caps.is_dumb() {
            self.believed_cursor = desired.cursor;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_color::HighlightSpec;
    use std::collections::HashMap;

    struct MapEnv(HashMap<String, String>);
    impl ColorEnvironment for MapEnv {
        fn get(&self, variable: &str) -> Option<String> {
            self.0.get(variable).cloned()
        }
    }

    #[test]
    fn repeating_an_unchanged_frame_emits_no_visible_bytes_beyond_motion() {
        let env = MapEnv(HashMap::new());
        let caps = TerminalCapabilities::detect();
        let mut engine = ScreenDiffEngine::new(&env, caps, 80);

        let mut desired = ScreenGrid::new(80);
        desired.append_str("$ ", HighlightSpec::normal(), 0, 0);
        desired.set_cursor(2, 0);

        engine.update(&desired).unwrap();
        let believed_after_first = engine.believed_cursor;
        engine.update(&desired).unwrap();
        assert_eq!(engine.believed_cursor, believed_after_first);
    }

    #[test]
    fn force_repaint_resets_the_believed_grid() {
        let env = MapEnv(HashMap::new());
        let caps = TerminalCapabilities::detect();
        let mut engine = ScreenDiffEngine::new(&env, caps, 80);
        let mut desired = ScreenGrid::new(80);
        desired.append_str("abc", HighlightSpec::normal(), 0, 0);
        engine.update(&desired).unwrap();
        engine.force_repaint();
        assert_eq!(engine.actual, ScreenGrid::new(80));
    }

    #[test]
    fn resize_changes_width_and_forces_repaint() {
        let env = MapEnv(HashMap::new());
        let caps = TerminalCapabilities::detect();
        let mut engine = ScreenDiffEngine::new(&env, caps, 80);
        engine.resize(40);
        assert_eq!(engine.width, 40);
        assert_eq!(engine.actual, ScreenGrid::new(40));
    }
}
