use serde::{Deserialize, Serialize};

use crate::column::Columns;
use crate::grid::Grid;

/// Immutable pre-delete snapshot of the full sheet shape. Widths travel
/// inside the column descriptors, so one pair captures everything undo
/// needs to restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub columns: Columns,
    pub grid: Grid,
}

/// LIFO log of snapshots taken before destructive column deletions.
///
/// Undo pops exactly one entry and replaces current state wholesale. There
/// is no redo stack; an undone delete can only be redone by recreating it.
/// Never pruned, never persisted.
#[derive(Debug, Clone, Default)]
pub struct History(Vec<Snapshot>);

impl History {
    pub fn new() -> Self {
        History(Vec::new())
    }

    pub fn push(&mut self, columns: Columns, grid: Grid) {
        self.0.push(Snapshot { columns, grid });
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut history = History::new();
        history.push(Columns::from_names(["a"]), Grid::new());
        history.push(Columns::from_names(["b"]), Grid::new());
        assert_eq!(history.len(), 2);
        assert_eq!(history.pop().unwrap().columns.get(0).unwrap().name, "b");
        assert_eq!(history.pop().unwrap().columns.get(0).unwrap().name, "a");
        assert!(history.pop().is_none());
    }
}
