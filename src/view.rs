use serde::Serialize;

use crate::grid::Grid;

/// One visible row plus its absolute position in the grid. Row-targeted
/// operations always address rows by absolute index, never page-local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRow {
    pub index: usize,
    pub cells: Vec<String>,
}

/// A derived page window over the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub index: usize,
    pub total_pages: usize,
    pub rows: Vec<VisibleRow>,
}

/// `max(1, ceil(rows / page_size))`. Zero rows still yields one page so
/// pagination controls never divide by zero.
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    debug_assert!(page_size > 0);
    row_count.div_ceil(page_size).max(1)
}

/// Pure projection of the visible row slice for `page_index`. The index is
/// clamped to the last page, so a projection after rows were deleted never
/// renders an empty window while data remains.
pub fn project(grid: &Grid, page_index: usize, page_size: usize) -> Page {
    let total = total_pages(grid.row_count(), page_size);
    let index = page_index.min(total - 1);
    let start = index * page_size;
    let rows = grid
        .rows()
        .enumerate()
        .skip(start)
        .take(page_size)
        .map(|(index, row)| VisibleRow {
            index,
            cells: row.clone(),
        })
        .collect();
    Page {
        index,
        total_pages: total,
        rows,
    }
}

/// Cell edit focus state machine.
///
/// At most one cell is in edit mode globally. Edits are staged in a draft
/// and only land in the grid on confirm; cancel discards the draft and
/// nothing reaches the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditFocus {
    #[default]
    Viewing,
    Editing {
        row: usize,
        col: usize,
        draft: Option<String>,
    },
}

/// A confirmed edit: the cell the draft belongs to, if any was staged, and
/// where focus moved next.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub row: usize,
    pub col: usize,
    pub value: Option<String>,
}

impl EditFocus {
    /// Click on a cell: enter edit mode there, dropping any unconfirmed
    /// draft on the previously focused cell.
    pub fn click(&mut self, row: usize, col: usize) {
        *self = EditFocus::Editing {
            row,
            col,
            draft: None,
        };
    }

    /// Stage text for the focused cell. No-op while viewing.
    pub fn stage(&mut self, text: String) {
        if let EditFocus::Editing { draft, .. } = self {
            *draft = Some(text);
        }
    }

    /// Enter/Tab: yield the staged edit (if editing) and advance focus to
    /// the next cell in row-major order, wrapping to the next row. Past the
    /// last cell focus returns to viewing.
    pub fn confirm(&mut self, row_count: usize, col_count: usize) -> Option<Commit> {
        let EditFocus::Editing { row, col, draft } = std::mem::take(self) else {
            return None;
        };
        let commit = Commit {
            row,
            col,
            value: draft,
        };
        let (mut next_row, mut next_col) = (row, col + 1);
        if next_col >= col_count {
            next_col = 0;
            next_row += 1;
        }
        if next_row < row_count {
            *self = EditFocus::Editing {
                row: next_row,
                col: next_col,
                draft: None,
            };
        }
        Some(commit)
    }

    /// Escape/blur: back to viewing, staged draft discarded.
    pub fn cancel(&mut self) {
        *self = EditFocus::Viewing;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditFocus::Editing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> Grid {
        Grid::from_rows(
            (0..rows)
                .map(|r| (0..cols).map(|c| format!("{r}:{c}")).collect())
                .collect(),
            cols,
        )
    }

    #[test]
    fn total_pages_never_zero() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn page_two_of_twenty_five_rows() {
        let g = grid(25, 2);
        let page = project(&g, 2, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0].index, 20);
        assert_eq!(page.rows[4].index, 24);
    }

    #[test]
    fn pages_partition_the_grid() {
        let g = grid(23, 1);
        let mut seen = Vec::new();
        for p in 0..total_pages(g.row_count(), 7) {
            for row in project(&g, p, 7).rows {
                seen.push(row.index);
            }
        }
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let g = grid(5, 1);
        let page = project(&g, 42, 10);
        assert_eq!(page.index, 0);
        assert_eq!(page.rows.len(), 5);
    }

    #[test]
    fn confirm_advances_row_major_and_wraps() {
        let mut focus = EditFocus::Viewing;
        focus.click(0, 1);
        focus.stage("v".into());
        let commit = focus.confirm(2, 2).unwrap();
        assert_eq!(commit, Commit { row: 0, col: 1, value: Some("v".into()) });
        // Wrapped to start of next row.
        assert_eq!(
            focus,
            EditFocus::Editing { row: 1, col: 0, draft: None }
        );
        // Past the last cell: back to viewing.
        focus.click(1, 1);
        focus.confirm(2, 2).unwrap();
        assert_eq!(focus, EditFocus::Viewing);
    }

    #[test]
    fn cancel_discards_draft() {
        let mut focus = EditFocus::Viewing;
        focus.click(0, 0);
        focus.stage("discarded".into());
        focus.cancel();
        assert_eq!(focus, EditFocus::Viewing);
        assert!(focus.confirm(1, 1).is_none());
    }
}
