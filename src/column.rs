use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EditError;

/// Narrowest a column can be resized to, in display units.
pub const MIN_WIDTH: u32 = 60;

/// Width assigned to freshly created columns.
pub const DEFAULT_WIDTH: u32 = 150;

/// Opaque, stable column identifier.
///
/// Assigned once at creation and never reassigned; it is the only safe
/// cross-reference to a column across reorders. Positions are not stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnId(Uuid);

impl ColumnId {
    fn fresh() -> Self {
        ColumnId(Uuid::new_v4())
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ColumnId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ColumnId(Uuid::parse_str(s)?))
    }
}

/// A single column descriptor. The display width travels with the
/// descriptor, so structural operations can never leave widths misaligned
/// with names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub width: u32,
}

impl Column {
    fn new(name: String) -> Self {
        Column {
            id: ColumnId::fresh(),
            name,
            width: DEFAULT_WIDTH,
        }
    }
}

/// Ordered sequence of column descriptors.
///
/// Owns column identity independent of position. Every structural change
/// here must be mirrored onto the grid in the same logical step; the edit
/// engine is the only caller that does both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Columns(Vec<Column>);

impl Columns {
    pub fn new() -> Self {
        Columns(Vec::new())
    }

    /// Build a registry from header names, assigning fresh ids and default
    /// widths. Used when a dataset is loaded; replaces any prior registry.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns(names.into_iter().map(|n| Column::new(n.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Column> {
        self.0.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.name.clone()).collect()
    }

    pub fn position_of(&self, id: ColumnId) -> Option<usize> {
        self.0.iter().position(|c| c.id == id)
    }

    /// Insert a new column at `position` (clamped to `[0, len]`) with a
    /// fresh id and default width. Returns the new column's id.
    pub fn insert_at(&mut self, position: usize, name: &str) -> Result<ColumnId, EditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditError::EmptyName);
        }
        let position = position.min(self.0.len());
        let column = Column::new(name.to_string());
        let id = column.id;
        self.0.insert(position, column);
        Ok(id)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Column, EditError> {
        if position >= self.0.len() {
            return Err(EditError::IndexOutOfRange);
        }
        Ok(self.0.remove(position))
    }

    /// Reorder for drag/drop. Moving onto the same position, or with either
    /// position out of range, is a no-op (`false`), not an error.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.0.len() || to >= self.0.len() {
            return false;
        }
        let column = self.0.remove(from);
        self.0.insert(to, column);
        true
    }

    /// Rename by id. The new name must be non-blank and not already used by
    /// another column (case-sensitive exact match).
    pub fn rename(&mut self, id: ColumnId, new_name: &str) -> Result<(), EditError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(EditError::EmptyName);
        }
        if self.0.iter().any(|c| c.id != id && c.name == new_name) {
            return Err(EditError::DuplicateName(new_name.to_string()));
        }
        let column = self
            .0
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EditError::IndexOutOfRange)?;
        column.name = new_name.to_string();
        Ok(())
    }

    /// Resize by id, clamping to the width floor.
    pub fn resize(&mut self, id: ColumnId, new_width: u32) -> Result<(), EditError> {
        let column = self
            .0
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EditError::IndexOutOfRange)?;
        column.width = new_width.max(MIN_WIDTH);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let cols = Columns::from_names(["a", "b", "c"]);
        assert_eq!(cols.len(), 3);
        assert_ne!(cols.get(0).unwrap().id, cols.get(1).unwrap().id);
        assert!(cols.iter().all(|c| c.width == DEFAULT_WIDTH));
    }

    #[test]
    fn insert_clamps_position() {
        let mut cols = Columns::from_names(["a"]);
        cols.insert_at(99, "b").unwrap();
        assert_eq!(cols.get(1).unwrap().name, "b");
        cols.insert_at(0, "c").unwrap();
        assert_eq!(cols.get(0).unwrap().name, "c");
    }

    #[test]
    fn insert_rejects_blank_name() {
        let mut cols = Columns::new();
        assert_eq!(cols.insert_at(0, "   "), Err(EditError::EmptyName));
        assert!(cols.is_empty());
    }

    #[test]
    fn rename_rejects_duplicates_and_blanks() {
        let mut cols = Columns::from_names(["a", "b"]);
        let id = cols.get(1).unwrap().id;
        assert_eq!(
            cols.rename(id, "a"),
            Err(EditError::DuplicateName("a".to_string()))
        );
        assert_eq!(cols.rename(id, ""), Err(EditError::EmptyName));
        // Renaming to its own current name is allowed.
        cols.rename(id, "b").unwrap();
        // Case-sensitive: "A" does not collide with "a".
        cols.rename(id, "A").unwrap();
        assert_eq!(cols.get(1).unwrap().name, "A");
    }

    #[test]
    fn id_survives_rename_resize_and_move() {
        let mut cols = Columns::from_names(["a", "b", "c"]);
        let id = cols.get(0).unwrap().id;
        cols.rename(id, "renamed").unwrap();
        cols.resize(id, 300).unwrap();
        assert!(cols.move_to(0, 2));
        assert_eq!(cols.position_of(id), Some(2));
        assert_eq!(cols.get(2).unwrap().name, "renamed");
        assert_eq!(cols.get(2).unwrap().width, 300);
    }

    #[test]
    fn resize_clamps_to_floor() {
        let mut cols = Columns::from_names(["a"]);
        let id = cols.get(0).unwrap().id;
        cols.resize(id, 10).unwrap();
        assert_eq!(cols.get(0).unwrap().width, MIN_WIDTH);
    }

    #[test]
    fn move_is_noop_on_same_or_out_of_range() {
        let mut cols = Columns::from_names(["a", "b"]);
        let before = cols.clone();
        assert!(!cols.move_to(1, 1));
        assert!(!cols.move_to(5, 0));
        assert!(!cols.move_to(0, 5));
        assert_eq!(cols, before);
    }
}
