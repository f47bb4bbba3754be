//! Scrollable completion pager (C5).
//!
//! Merges completion candidates sharing a description, lays them out into a
//! column grid sized to the terminal width, and tracks selection/scroll
//! state under fuzzy search and navigation.

pub mod entry;
pub mod grid;
pub mod pager;

pub use entry::{CompletionCandidate, CompletionFlags, PagerEntry, build_entries, filter_entries, fuzzy_substring_match};
pub use grid::{Grid, coords_of, index_of, layout};
pub use pager::{Disclosure, NavDirection, Pager};
