use serde::Serialize;

use crate::clipboard::{Clipboard, Payload, PayloadKind};
use crate::column::{ColumnId, Columns};
use crate::error::EditError;
use crate::grid::Grid;
use crate::history::History;
use crate::loader::Dataset;
use crate::view::{self, Page};

/// Default rows-per-page when a dataset is loaded.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Headline numbers for the stats panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub rows: usize,
    pub columns: usize,
    pub non_empty_cells: usize,
}

/// The edit engine: single owner of column registry, grid, history,
/// clipboard and pagination, and the only writer to any of them.
///
/// Every externally triggered action is one method call here, applied as
/// one indivisible step: preconditions are checked before anything mutates,
/// so a rejected operation leaves no partial structural edit behind. The
/// registry and the grid are always changed together, which is what keeps
/// every row's length equal to the column count at all observable points.
///
/// Operations the design defines as silent no-ops (undo on empty history,
/// paste with a mismatched kind, move onto the same position) return
/// `Ok(false)` rather than an error.
#[derive(Debug)]
pub struct Editor {
    columns: Columns,
    grid: Grid,
    history: History,
    clipboard: Clipboard,
    original: Option<Dataset>,
    page: usize,
    page_size: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Editor {
            columns: Columns::new(),
            grid: Grid::new(),
            history: History::new(),
            clipboard: Clipboard::new(),
            original: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    // ---- accessors -----------------------------------------------------

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clipboard_kind(&self) -> Option<PayloadKind> {
        self.clipboard.kind()
    }

    /// Current visible page, derived fresh from the grid.
    pub fn visible_page(&self) -> Page {
        view::project(&self.grid, self.page, self.page_size)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            rows: self.grid.row_count(),
            columns: self.columns.len(),
            non_empty_cells: self.grid.non_empty_cells(),
        }
    }

    // ---- dataset lifecycle ---------------------------------------------

    /// Replace all state with a freshly ingested dataset: one column per
    /// header cell with fresh ids, remaining rows as the grid. History,
    /// clipboard and pagination reset. The dataset is retained so
    /// `reset` can restore it later.
    pub fn load(&mut self, dataset: Dataset) {
        self.columns = Columns::from_names(dataset.header.clone());
        self.grid = Grid::from_rows(dataset.rows.clone(), self.columns.len());
        self.history.clear();
        self.clipboard.clear();
        self.page = 0;
        self.original = Some(dataset);
    }

    /// Install a persisted snapshot wholesale, e.g. from the snapshot
    /// store. History, clipboard and pagination reset; the grid is
    /// re-normalized against the registry so a snapshot written by an
    /// older build can never come back misaligned.
    pub fn restore(&mut self, columns: Columns, grid: Grid) {
        let width = columns.len();
        let rows: Vec<Vec<String>> = grid.rows().cloned().collect();
        self.columns = columns;
        self.grid = Grid::from_rows(rows, width);
        self.history.clear();
        self.clipboard.clear();
        self.page = 0;
    }

    /// Discard all edits and restore the originally loaded dataset
    /// wholesale. No-op when nothing was ever loaded.
    pub fn reset(&mut self) -> bool {
        match self.original.clone() {
            Some(dataset) => {
                self.load(dataset);
                true
            }
            None => false,
        }
    }

    // ---- column operations ---------------------------------------------

    /// Insert a column (default position: end) together with an aligned
    /// empty cell in every row.
    pub fn add_column(
        &mut self,
        name: &str,
        position: Option<usize>,
    ) -> Result<ColumnId, EditError> {
        let position = position.unwrap_or(self.columns.len()).min(self.columns.len());
        let id = self.columns.insert_at(position, name)?;
        self.grid.insert_column_at(position);
        Ok(id)
    }

    /// Remove a column and its cells everywhere, pushing the pre-delete
    /// state so a single undo can restore it exactly.
    pub fn delete_column(&mut self, position: usize) -> Result<(), EditError> {
        if position >= self.columns.len() {
            return Err(EditError::IndexOutOfRange);
        }
        self.history.push(self.columns.clone(), self.grid.clone());
        self.columns.remove_at(position)?;
        self.grid.remove_column_at(position);
        Ok(())
    }

    pub fn rename_column(&mut self, id: ColumnId, new_name: &str) -> Result<(), EditError> {
        self.columns.rename(id, new_name)
    }

    pub fn resize_column(&mut self, id: ColumnId, new_width: u32) -> Result<(), EditError> {
        self.columns.resize(id, new_width)
    }

    /// Reorder registry and every grid row identically. Same position or
    /// out-of-range target: no-op, `Ok(false)`.
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<bool, EditError> {
        if !self.columns.move_to(from, to) {
            return Ok(false);
        }
        self.grid.move_column(from, to);
        Ok(true)
    }

    /// Pop one history entry and replace columns and grid wholesale.
    /// `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.columns = snapshot.columns;
                self.grid = snapshot.grid;
                true
            }
            None => false,
        }
    }

    // ---- row and cell operations ---------------------------------------

    pub fn add_row(&mut self) {
        self.grid.append_row(self.columns.len());
    }

    pub fn delete_row(&mut self, index: usize) -> Result<(), EditError> {
        self.grid.remove_row_at(index)?;
        Ok(())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), EditError> {
        self.grid.set_cell(row, col, value)
    }

    // ---- clipboard operations ------------------------------------------

    /// Copy a cell into the clipboard slot. Returns the plain-text
    /// rendering for a best-effort system clipboard write.
    pub fn copy_cell(&mut self, row: usize, col: usize) -> Result<String, EditError> {
        let value = self
            .grid
            .get(row, col)
            .ok_or(EditError::IndexOutOfRange)?
            .to_string();
        let payload = Payload::Cell(value);
        let text = payload.as_plain_text();
        self.clipboard.set(payload);
        Ok(text)
    }

    /// Cut = copy, then blank the cell.
    pub fn cut_cell(&mut self, row: usize, col: usize) -> Result<String, EditError> {
        let text = self.copy_cell(row, col)?;
        self.grid.set_cell(row, col, String::new())?;
        Ok(text)
    }

    pub fn copy_row(&mut self, index: usize) -> Result<String, EditError> {
        let values = self
            .grid
            .row(index)
            .ok_or(EditError::IndexOutOfRange)?
            .to_vec();
        let payload = Payload::Row(values);
        let text = payload.as_plain_text();
        self.clipboard.set(payload);
        Ok(text)
    }

    /// Cut = copy, then remove the row.
    pub fn cut_row(&mut self, index: usize) -> Result<String, EditError> {
        let text = self.copy_row(index)?;
        self.grid.remove_row_at(index)?;
        Ok(text)
    }

    pub fn copy_column(&mut self, position: usize) -> Result<String, EditError> {
        if position >= self.columns.len() {
            return Err(EditError::IndexOutOfRange);
        }
        let values = self.grid.column_values(position).unwrap_or_default();
        let payload = Payload::Column(values);
        let text = payload.as_plain_text();
        self.clipboard.set(payload);
        Ok(text)
    }

    /// Cut = copy, then a full column delete (with its history push).
    pub fn cut_column(&mut self, position: usize) -> Result<String, EditError> {
        let text = self.copy_column(position)?;
        self.delete_column(position)?;
        Ok(text)
    }

    /// Paste onto a cell. Kind mismatch or empty clipboard: no-op.
    pub fn paste_cell(&mut self, row: usize, col: usize) -> Result<bool, EditError> {
        if self.grid.get(row, col).is_none() {
            return Err(EditError::IndexOutOfRange);
        }
        let Some(Payload::Cell(value)) = self.clipboard.get() else {
            return Ok(false);
        };
        let value = value.clone();
        self.grid.set_cell(row, col, value)?;
        Ok(true)
    }

    /// Paste onto a row, padded/truncated to the current column count so a
    /// payload taken before a structural change cannot misalign the grid.
    pub fn paste_row(&mut self, index: usize) -> Result<bool, EditError> {
        if self.grid.row(index).is_none() {
            return Err(EditError::IndexOutOfRange);
        }
        let Some(Payload::Row(values)) = self.clipboard.get() else {
            return Ok(false);
        };
        let values = values.clone();
        self.grid.set_row(index, &values, self.columns.len())?;
        Ok(true)
    }

    /// Paste onto a column, padded to the current row count.
    pub fn paste_column(&mut self, position: usize) -> Result<bool, EditError> {
        if position >= self.columns.len() {
            return Err(EditError::IndexOutOfRange);
        }
        let Some(Payload::Column(values)) = self.clipboard.get() else {
            return Ok(false);
        };
        let values = values.clone();
        self.grid.set_column(position, &values)?;
        Ok(true)
    }

    // ---- pagination -----------------------------------------------------

    /// Select a page, clamped to the last page.
    pub fn set_page(&mut self, page: usize) {
        let last = view::total_pages(self.grid.row_count(), self.page_size) - 1;
        self.page = page.min(last);
    }

    /// Change rows-per-page; the window snaps back to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), EditError> {
        if page_size == 0 {
            return Err(EditError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    /// Alignment invariant: every grid row is exactly as long as the
    /// column registry.
    pub fn is_aligned(&self) -> bool {
        self.grid.rows().all(|r| r.len() == self.columns.len())
    }
}
