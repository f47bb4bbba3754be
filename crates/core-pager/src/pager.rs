//! Pager selection state and navigation (§4.5 steps 5-7).

use crate::entry::{CompletionCandidate, PagerEntry, build_entries, filter_entries};
use crate::grid::{self, Grid};
use core_text::AttributeEscapeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    North,
    South,
    East,
    West,
    PageNorth,
    PageSouth,
    Next,
    Prev,
}

/// Visible-rows window plus whether the full grid is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disclosure {
    pub start_row: usize,
    pub visible_rows: usize,
    pub fully_disclosed: bool,
}

impl Disclosure {
    fn collapsed(visible_rows: usize) -> Self {
        Self {
            start_row: 0,
            visible_rows,
            fully_disclosed: false,
        }
    }
}

/// Owns the full candidate list, the active search prefix, the current
/// grid layout, selection, and scroll/disclosure state.
#[derive(Debug)]
pub struct Pager {
    all_entries: Vec<PagerEntry>,
    visible_entries: Vec<PagerEntry>,
    token_prefix: String,
    search_needle: String,
    grid: Grid,
    selected: Option<usize>,
    disclosure: Disclosure,
    term_width: usize,
    max_rows_collapsed: usize,
}

impl Pager {
    pub fn new(
        candidates: &[CompletionCandidate],
        token_prefix: impl Into<String>,
        attrs: &AttributeEscapeSet,
        term_width: usize,
        max_rows_collapsed: usize,
    ) -> Self {
        let all_entries = build_entries(candidates, attrs);
        let grid = grid::layout(&all_entries, term_width);
        Self {
            visible_entries: all_entries.clone(),
            all_entries,
            token_prefix: token_prefix.into(),
            search_needle: String::new(),
            grid,
            selected: None,
            disclosure: Disclosure::collapsed(max_rows_collapsed),
            term_width,
            max_rows_collapsed,
        }
    }

    pub fn entries(&self) -> &[PagerEntry] {
        &self.visible_entries
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selected(&self) -> Option<&PagerEntry> {
        self.selected.and_then(|i| self.visible_entries.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }

    pub fn is_searching(&self) -> bool {
        !self.search_needle.is_empty()
    }

    /// The search field's current contents, for a host that wants to echo
    /// it back or edit it character-by-character.
    pub fn search_needle(&self) -> &str {
        &self.search_needle
    }

    /// Recompute the visible set and grid from the current search needle.
    /// Re-selects the entry at the closest surviving column-memory position.
    fn relayout(&mut self) {
        let prev_col = self.selected.map(|i| grid::coords_of(&self.grid, i).1);
        self.visible_entries = filter_entries(&self.all_entries, &self.token_prefix, &self.search_needle);
        self.grid = grid::layout(&self.visible_entries, self.term_width);
        self.disclosure = Disclosure::collapsed(self.max_rows_collapsed);
        self.selected = match (self.selected, prev_col) {
            (Some(_), Some(col)) if self.grid.rows > 0 => {
                let col = col.min(self.grid.columns.saturating_sub(1));
                let idx = grid::index_of(&self.grid, 0, col);
                if idx < self.visible_entries.len() { Some(idx) } else { None }
            }
            _ => None,
        };
    }

    /// Update the search needle and relayout. Empty needle shows everything.
    pub fn set_search(&mut self, needle: impl Into<String>) {
        self.search_needle = needle.into();
        self.relayout();
    }

    /// Recompute the grid for a new terminal width, keeping the same column
    /// via "column memory": walk back by whole columns until back in range.
    pub fn resize(&mut self, term_width: usize) {
        self.term_width = term_width;
        let prev = self.selected;
        let old_rows = self.grid.rows.max(1);
        self.grid = grid::layout(&self.visible_entries, term_width);
        self.disclosure = Disclosure::collapsed(self.max_rows_collapsed);
        self.selected = prev.map(|mut idx| {
            while idx >= self.visible_entries.len().max(1) && idx >= old_rows {
                idx -= old_rows;
            }
            idx.min(self.visible_entries.len().saturating_sub(1))
        });
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        let Some(idx) = self.selected else { return };
        let (row, _) = grid::coords_of(&self.grid, idx);
        if row < self.disclosure.start_row {
            self.disclosure.start_row = row;
        } else if row >= self.disclosure.start_row + self.disclosure.visible_rows {
            self.disclosure.start_row = row + 1 - self.disclosure.visible_rows;
        }
    }

    /// Reveal the whole grid, abandoning the collapsed/scrolled view.
    pub fn disclose_all(&mut self) {
        self.disclosure.fully_disclosed = true;
        self.disclosure.visible_rows = self.grid.rows;
        self.disclosure.start_row = 0;
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Move the selection per §4.5's 8-directional navigation rules.
    pub fn navigate(&mut self, dir: NavDirection) {
        let n = self.visible_entries.len();
        if n == 0 {
            return;
        }
        let rows = self.grid.rows.max(1);
        let cols = self.grid.columns.max(1);

        let Some(cur) = self.selected else {
            self.selected = Some(match dir {
                NavDirection::Prev => n - 1,
                _ => 0,
            });
            self.keep_selection_visible();
            return;
        };

        let (row, col) = grid::coords_of(&self.grid, cur);
        let new = match dir {
            NavDirection::Next => (cur + 1) % n,
            NavDirection::Prev => (cur + n - 1) % n,
            NavDirection::East => {
                let mut c = col + 1;
                let mut r = row;
                if c >= cols || grid::index_of(&self.grid, r, c) >= n {
                    c = 0;
                    r = (r + 1) % rows;
                }
                clamp_to_grid(&self.grid, r, c, n)
            }
            NavDirection::West => {
                if col == 0 {
                    let r = (row + rows - 1) % rows;
                    let c = last_col_for_row(&self.grid, r, n);
                    grid::index_of(&self.grid, r, c)
                } else {
                    grid::index_of(&self.grid, row, col - 1)
                }
            }
            NavDirection::South => {
                if row + 1 >= rows || grid::index_of(&self.grid, row + 1, col) >= n {
                    let c = (col + 1) % cols;
                    clamp_to_grid(&self.grid, 0, c, n)
                } else {
                    grid::index_of(&self.grid, row + 1, col)
                }
            }
            NavDirection::North => {
                if row == 0 {
                    let c = (col + cols - 1) % cols;
                    let last_row_in_col = last_row_for_column(&self.grid, c, n);
                    clamp_to_grid(&self.grid, last_row_in_col, c, n)
                } else {
                    grid::index_of(&self.grid, row - 1, col)
                }
            }
            NavDirection::PageSouth => {
                let r = (row + self.disclosure.visible_rows.max(1)).min(rows - 1);
                clamp_to_grid(&self.grid, r, col, n)
            }
            NavDirection::PageNorth => {
                let r = row.saturating_sub(self.disclosure.visible_rows.max(1));
                clamp_to_grid(&self.grid, r, col, n)
            }
        };
        self.selected = Some(new);
        self.keep_selection_visible();
    }
}

fn last_row_for_column(grid: &Grid, col: usize, n: usize) -> usize {
    let mut row = grid.rows.saturating_sub(1);
    while row > 0 && grid::index_of(grid, row, col) >= n {
        row -= 1;
    }
    row
}

/// The rightmost column that still holds an entry in `row` — the last
/// column or two may be partial, so wrapping west from column 0 walks
/// back columns (not rows) until landing on a populated cell.
fn last_col_for_row(grid: &Grid, row: usize, n: usize) -> usize {
    let mut col = grid.columns.saturating_sub(1);
    while col > 0 && grid::index_of(grid, row, col) >= n {
        col -= 1;
    }
    col
}

/// Index of `(row, col)`, or the last valid row in that column if `row` runs
/// past the entries actually present there (a short final column).
fn clamp_to_grid(grid: &Grid, row: usize, col: usize, n: usize) -> usize {
    let idx = grid::index_of(grid, row, col);
    if idx < n {
        idx
    } else {
        grid::index_of(grid, last_row_for_column(grid, col, n), col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CompletionFlags;

    fn cand(name: &str) -> CompletionCandidate {
        CompletionCandidate::new(name, "", CompletionFlags::empty())
    }

    fn make_pager(names: &[&str], width: usize) -> Pager {
        let candidates: Vec<_> = names.iter().map(|n| cand(n)).collect();
        Pager::new(&candidates, "", &AttributeEscapeSet::default(), width, 5)
    }

    #[test]
    fn next_wraps_across_whole_list() {
        let mut p = make_pager(&["a", "b", "c"], 80);
        p.navigate(NavDirection::Next);
        assert_eq!(p.selected_index(), Some(0));
        for _ in 0..3 {
            p.navigate(NavDirection::Next);
        }
        assert_eq!(p.selected_index(), Some(1));
    }

    #[test]
    fn prev_from_unselected_starts_at_last() {
        let mut p = make_pager(&["a", "b", "c"], 80);
        p.navigate(NavDirection::Prev);
        assert_eq!(p.selected_index(), Some(2));
    }

    #[test]
    fn east_west_roundtrip_within_row() {
        let mut p = make_pager(&["a", "b", "c", "d", "e", "f"], 5);
        assert_eq!(p.grid().columns, 1);
        p.navigate(NavDirection::Next);
        p.navigate(NavDirection::East);
        p.navigate(NavDirection::West);
        assert!(p.selected_index().is_some());
    }

    #[test]
    fn search_filters_and_resets_selection() {
        let mut p = make_pager(&["alpha", "beta", "gamma"], 80);
        p.set_search("al");
        assert_eq!(p.entries().len(), 1);
        assert!(p.selected_index().is_none());
    }

    #[test]
    fn deselect_clears_selection() {
        let mut p = make_pager(&["a", "b"], 80);
        p.navigate(NavDirection::Next);
        assert!(p.selected_index().is_some());
        p.deselect();
        assert!(p.selected_index().is_none());
    }

    /// §8 scenario 4: 19 equal-width (10-column) items laid out at a width
    /// that resolves to a 4-row x 5-column grid (the last column short by
    /// one). `next, west, east, next, next` must visit 0, 15, 0, 1, 2.
    #[test]
    fn scenario_four_pager_navigation() {
        let names: Vec<String> = (0..19).map(|i| format!("item{i:06}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut p = make_pager(&refs, 65);
        assert_eq!(p.grid().rows, 4);
        assert_eq!(p.grid().columns, 5);

        p.navigate(NavDirection::Next);
        assert_eq!(p.selected_index(), Some(0));
        p.navigate(NavDirection::West);
        assert_eq!(p.selected_index(), Some(15));
        p.navigate(NavDirection::East);
        assert_eq!(p.selected_index(), Some(0));
        p.navigate(NavDirection::Next);
        assert_eq!(p.selected_index(), Some(1));
        p.navigate(NavDirection::Next);
        assert_eq!(p.selected_index(), Some(2));
    }

    #[test]
    fn resize_keeps_a_valid_selection() {
        let mut p = make_pager(&["a", "b", "c", "d", "e", "f", "g", "h"], 80);
        p.navigate(NavDirection::Next);
        p.navigate(NavDirection::Next);
        p.resize(10);
        assert!(p.selected_index().unwrap() < p.entries().len());
    }
}
