//! Durable storage of named sheet snapshots.
//!
//! One gzip-compressed bincode file per snapshot, laid out as
//! `<root>/<user>/<id>.bin.gz`. The user key is an opaque correlation key
//! supplied by the identity layer; snapshots of one user are invisible to
//! another.

use bincode::{deserialize_from, serialize_into};
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;
use uuid::Uuid;

use crate::column::Columns;
use crate::grid::Grid;

const SNAPSHOT_EXT: &str = "bin.gz";

/// Full serialized snapshot: metadata plus the sheet state wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSheet {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub columns: Columns,
    pub grid: Grid,
}

/// Listing entry; the sheet body is not deserialized into it.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// File-backed snapshot store rooted at one directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SnapshotStore { root: root.into() }
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join(user)
    }

    fn snapshot_path(&self, user: &str, id: Uuid) -> PathBuf {
        self.user_dir(user).join(format!("{id}.{SNAPSHOT_EXT}"))
    }

    /// Persist the current sheet under `name` for `user`, returning the new
    /// snapshot id.
    pub fn save(
        &self,
        user: &str,
        name: &str,
        columns: &Columns,
        grid: &Grid,
    ) -> std::io::Result<Uuid> {
        let saved = SavedSheet {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
            columns: columns.clone(),
            grid: grid.clone(),
        };

        fs::create_dir_all(self.user_dir(user))?;
        let file = File::create(self.snapshot_path(user, saved.id))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        serialize_into(&mut encoder, &saved)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        encoder.finish()?;

        Ok(saved.id)
    }

    /// All snapshots for `user`, newest first. A user with no directory has
    /// an empty list, not an error.
    pub fn list(&self, user: &str) -> std::io::Result<Vec<SnapshotMeta>> {
        let dir = self.user_dir(user);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut metas = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match read_snapshot(&path) {
                Ok(saved) => metas.push(SnapshotMeta {
                    id: saved.id,
                    name: saved.name,
                    created_at: saved.created_at,
                }),
                Err(e) => {
                    log::warn!("skipping unreadable snapshot {}: {e}", path.display());
                }
            }
        }
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    /// Load one snapshot's sheet state.
    pub fn load(&self, user: &str, id: Uuid) -> std::io::Result<(Columns, Grid)> {
        let saved = read_snapshot(&self.snapshot_path(user, id))?;
        Ok((saved.columns, saved.grid))
    }
}

fn read_snapshot(path: &std::path::Path) -> std::io::Result<SavedSheet> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);
    deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> (Columns, Grid) {
        let columns = Columns::from_names(["A", "B"]);
        let grid = Grid::from_rows(vec![vec!["1".into(), "2".into()]], 2);
        (columns, grid)
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let (columns, grid) = sheet();

        let id = store.save("user-1", "my sheet", &columns, &grid).unwrap();
        let (loaded_columns, loaded_grid) = store.load("user-1", id).unwrap();
        assert_eq!(loaded_columns, columns);
        assert_eq!(loaded_grid, grid);
    }

    #[test]
    fn list_is_scoped_per_user_and_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let (columns, grid) = sheet();

        store.save("alice", "first", &columns, &grid).unwrap();
        store.save("alice", "second", &columns, &grid).unwrap();
        store.save("bob", "other", &columns, &grid).unwrap();

        let alice = store.list("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice[0].created_at >= alice[1].created_at);
        assert_eq!(store.list("bob").unwrap().len(), 1);
        assert!(store.list("nobody").unwrap().is_empty());
    }

    #[test]
    fn load_of_unknown_id_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load("alice", Uuid::new_v4()).is_err());
    }
}
