//! Column grid layout for the pager (§4.5).

use crate::entry::PagerEntry;

const MAX_COLUMNS: usize = 6;
const COLUMN_SEP_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub columns: usize,
    pub rows: usize,
    pub column_widths: Vec<usize>,
}

fn total_width(column_widths: &[usize]) -> usize {
    if column_widths.is_empty() {
        return 0;
    }
    column_widths.iter().sum::<usize>() + (column_widths.len() - 1) * COLUMN_SEP_WIDTH
}

/// Column widths for `columns` columns, `rows` rows, entries addressed
/// column-major (`index = column * rows + row`).
fn column_widths_for(entries: &[PagerEntry], columns: usize, rows: usize) -> Vec<usize> {
    let mut widths = vec![0usize; columns];
    for (idx, e) in entries.iter().enumerate() {
        let col = idx / rows;
        widths[col] = widths[col].max(e.preferred_width);
    }
    widths
}

/// Try column counts from `min(6, n)` down to 1, picking the largest one
/// whose grid fits `term_width`. `C = 1` always succeeds.
pub fn layout(entries: &[PagerEntry], term_width: usize) -> Grid {
    let n = entries.len();
    if n == 0 {
        return Grid {
            columns: 0,
            rows: 0,
            column_widths: Vec::new(),
        };
    }
    let max_c = MAX_COLUMNS.min(n);
    for columns in (1..=max_c).rev() {
        let rows = n.div_ceil(columns);
        // `rows` may not actually need `columns` columns to hold `n` entries
        // (e.g. n=19, columns=6 -> rows=4, but 4 rows only fill 5 columns),
        // which would leave a dead trailing column. Skip straight to the
        // column count `rows` actually produces.
        if columns > 1 && n.div_ceil(n.div_ceil(columns)) < columns {
            continue;
        }
        let widths = column_widths_for(entries, columns, rows);
        if total_width(&widths) <= term_width {
            return Grid {
                columns,
                rows,
                column_widths: widths,
            };
        }
    }
    let rows = n;
    let widths = column_widths_for(entries, 1, rows);
    Grid {
        columns: 1,
        rows,
        column_widths: widths,
    }
}

/// Column-major index of `(row, col)`.
pub fn index_of(grid: &Grid, row: usize, col: usize) -> usize {
    col * grid.rows + row
}

/// `(row, col)` of a column-major `index`.
pub fn coords_of(grid: &Grid, index: usize) -> (usize, usize) {
    (index % grid.rows.max(1), index / grid.rows.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CompletionFlags;

    fn entries_of_width(n: usize, w: usize) -> Vec<PagerEntry> {
        (0..n)
            .map(|i| PagerEntry {
                completions: vec![format!("c{i}")],
                description: String::new(),
                flags: CompletionFlags::empty(),
                completion_width: w,
                description_width: 0,
                preferred_width: w,
            })
            .collect()
    }

    #[test]
    fn single_column_always_fits() {
        let entries = entries_of_width(20, 50);
        let grid = layout(&entries, 10);
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.rows, 20);
    }

    #[test]
    fn wide_terminal_uses_multiple_columns() {
        let entries = entries_of_width(12, 5);
        let grid = layout(&entries, 80);
        assert!(grid.columns > 1);
        assert!(grid.columns * grid.rows >= entries.len());
        let used = grid.column_widths.iter().sum::<usize>() + (grid.columns - 1) * COLUMN_SEP_WIDTH;
        assert!(used <= 80);
    }

    #[test]
    fn index_and_coords_roundtrip() {
        let grid = Grid {
            columns: 4,
            rows: 3,
            column_widths: vec![5; 4],
        };
        for idx in 0..12 {
            let (row, col) = coords_of(&grid, idx);
            assert_eq!(index_of(&grid, row, col), idx);
        }
    }
}
