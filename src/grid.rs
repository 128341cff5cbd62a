use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Row-major matrix of cell values. Empty string is the canonical empty
/// cell, never a null.
///
/// Invariant: every row has exactly the column registry's length. The grid
/// itself cannot see the registry, so all structural column operations here
/// are called by the edit engine in the same step as the registry change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid(Vec<Vec<String>>);

impl Grid {
    pub fn new() -> Self {
        Grid(Vec::new())
    }

    /// Build a grid from parsed body rows, padding or truncating each row to
    /// `column_count` so ragged input can never break alignment.
    pub fn from_rows(rows: Vec<Vec<String>>, column_count: usize) -> Self {
        Grid(
            rows.into_iter()
                .map(|mut row| {
                    row.resize(column_count, String::new());
                    row
                })
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> std::slice::Iter<'_, Vec<String>> {
        self.0.iter()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.0.get(index).map(|r| r.as_slice())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.0.get(row).and_then(|r| r.get(col)).map(|s| s.as_str())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), EditError> {
        let cell = self
            .0
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(EditError::IndexOutOfRange)?;
        *cell = value;
        Ok(())
    }

    /// Insert an empty cell at `position` in every row. `position` is
    /// clamped exactly like the registry's insert so both sides land in the
    /// same place.
    pub fn insert_column_at(&mut self, position: usize) {
        for row in &mut self.0 {
            let position = position.min(row.len());
            row.insert(position, String::new());
        }
    }

    pub fn remove_column_at(&mut self, position: usize) {
        for row in &mut self.0 {
            if position < row.len() {
                row.remove(position);
            }
        }
    }

    pub fn move_column(&mut self, from: usize, to: usize) {
        for row in &mut self.0 {
            if from < row.len() && to < row.len() {
                let cell = row.remove(from);
                row.insert(to, cell);
            }
        }
    }

    /// Values of one column top to bottom, used by column copy.
    pub fn column_values(&self, position: usize) -> Option<Vec<String>> {
        if self.0.iter().any(|r| position >= r.len()) || self.0.is_empty() {
            return None;
        }
        Some(self.0.iter().map(|r| r[position].clone()).collect())
    }

    /// Overwrite one column from `values`, padding with empty strings when
    /// the payload is shorter than the grid.
    pub fn set_column(&mut self, position: usize, values: &[String]) -> Result<(), EditError> {
        if self.0.iter().any(|r| position >= r.len()) {
            return Err(EditError::IndexOutOfRange);
        }
        for (i, row) in self.0.iter_mut().enumerate() {
            row[position] = values.get(i).cloned().unwrap_or_default();
        }
        Ok(())
    }

    /// Overwrite one row from `values`, padded or truncated to the current
    /// column count so a stale payload cannot change the row's length.
    pub fn set_row(&mut self, index: usize, values: &[String], column_count: usize) -> Result<(), EditError> {
        let row = self.0.get_mut(index).ok_or(EditError::IndexOutOfRange)?;
        let mut new_row: Vec<String> = values.to_vec();
        new_row.resize(column_count, String::new());
        *row = new_row;
        Ok(())
    }

    pub fn append_row(&mut self, column_count: usize) {
        self.0.push(vec![String::new(); column_count]);
    }

    pub fn remove_row_at(&mut self, index: usize) -> Result<Vec<String>, EditError> {
        if index >= self.0.len() {
            return Err(EditError::IndexOutOfRange);
        }
        Ok(self.0.remove(index))
    }

    pub fn non_empty_cells(&self) -> usize {
        self.0
            .iter()
            .map(|r| r.iter().filter(|c| !c.is_empty()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x2() -> Grid {
        Grid::from_rows(
            vec![
                vec!["a".into(), "b".into()],
                vec!["c".into(), "d".into()],
                vec!["e".into(), "f".into()],
            ],
            2,
        )
    }

    #[test]
    fn from_rows_normalizes_ragged_input() {
        let g = Grid::from_rows(vec![vec!["a".into()], vec!["b".into(), "c".into(), "d".into()]], 2);
        assert!(g.rows().all(|r| r.len() == 2));
        assert_eq!(g.get(0, 1), Some(""));
        assert_eq!(g.get(1, 1), Some("c"));
    }

    #[test]
    fn set_cell_bounds() {
        let mut g = grid_3x2();
        g.set_cell(1, 1, "x".into()).unwrap();
        assert_eq!(g.get(1, 1), Some("x"));
        assert_eq!(g.set_cell(3, 0, "x".into()), Err(EditError::IndexOutOfRange));
        assert_eq!(g.set_cell(0, 2, "x".into()), Err(EditError::IndexOutOfRange));
    }

    #[test]
    fn column_insert_remove_move_keep_rows_aligned() {
        let mut g = grid_3x2();
        g.insert_column_at(1);
        assert!(g.rows().all(|r| r.len() == 3));
        assert_eq!(g.row(0).unwrap(), ["a", "", "b"]);
        g.move_column(0, 2);
        assert_eq!(g.row(0).unwrap(), ["", "b", "a"]);
        g.remove_column_at(1);
        assert_eq!(g.row(0).unwrap(), ["", "a"]);
        assert!(g.rows().all(|r| r.len() == 2));
    }

    #[test]
    fn row_paste_pads_and_truncates() {
        let mut g = grid_3x2();
        g.set_row(0, &["x".into()], 2).unwrap();
        assert_eq!(g.row(0).unwrap(), ["x", ""]);
        g.set_row(1, &["1".into(), "2".into(), "3".into()], 2).unwrap();
        assert_eq!(g.row(1).unwrap(), ["1", "2"]);
    }

    #[test]
    fn column_paste_pads_short_payload() {
        let mut g = grid_3x2();
        g.set_column(0, &["x".into()]).unwrap();
        assert_eq!(g.get(0, 0), Some("x"));
        assert_eq!(g.get(1, 0), Some(""));
        assert_eq!(g.get(2, 0), Some(""));
    }

    #[test]
    fn non_empty_cell_count() {
        let mut g = grid_3x2();
        assert_eq!(g.non_empty_cells(), 6);
        g.set_cell(0, 0, String::new()).unwrap();
        assert_eq!(g.non_empty_cells(), 5);
    }
}
