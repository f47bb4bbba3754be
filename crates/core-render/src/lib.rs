//! The screen diff engine (C3): turns a desired [`ScreenGrid`] into the
//! minimal byte sequence that brings the real terminal from its last known
//! contents to that state, per §4.3.
//!
//! An inline shell reader repaints far more often than a full-screen
//! editor does (every keystroke touches highlighting and autosuggestion),
//! so the engine is built around diffing two grids line-by-line rather
//! than redrawing a `Frame` from scratch: `grid` holds the data model,
//! `diff` the comparison algorithm, `motion` and `resolve` the
//! capability-driven pieces it leans on, `output` the write path and its
//! self-modification detection, and `dumb` the degraded fallback for
//! terminals with no usable cursor addressing. `engine` ties all of it
//! together into the type the editor loop drives.

pub mod diff;
pub mod dumb;
pub mod engine;
pub mod grid;
pub mod motion;
pub mod output;
pub mod resolve;

pub use diff::{DiffOutput, diff as diff_grids};
pub use engine::ScreenDiffEngine;
pub use grid::{Cell, ScreenGrid, ScreenLine};
pub use output::{Outputter, WriteOutcome};
pub use resolve::StyleResolver;
