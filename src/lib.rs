/*!
# Gridsheet

A browser-based CSV grid editor backend, built in Rust.

## Overview

Users upload a CSV, edit it in a grid (cell, row and column operations,
resize, reorder, undo, export) and optionally persist named snapshots tied
to an opaque user key. The in-memory tabular editing model is the heart of
the crate; authentication, durable storage and format conversion are thin
collaborators around it.

## Architecture

### Core Layer
- **Column Registry** - Ordered column descriptors with stable ids,
  independent of position
- **Grid Store** - Row-major cell matrix, kept positionally aligned with
  the registry at all times
- **History Stack** - Pre-delete snapshots enabling single-step undo of
  destructive column operations
- **Clipboard Unit** - Single typed payload slot for cut/copy/paste
- **Edit Engine** - Orchestrates every operation and keeps all of the
  above mutually consistent
- **View Projector** - Pure derivation of the visible page window and the
  cell edit-focus state machine

### Collaborator Layer
- **Loader** - CSV text to header + body rows, enforcing the documented
  limits (15 columns, 5000 rows, 5 MB)
- **Downloader** - Current state to CSV text or a binary spreadsheet
  document
- **Snapshot Store** - Gzip-compressed bincode files, one per named
  snapshot, scoped per user key
- **Session** - Opaque user keys; no authentication logic lives here

### Web Layer (`web` feature)
- axum router with one shared edit engine behind a mutex; each request is
  one atomic engine operation

## Modules

- **column**: column registry (insert, remove, move, rename, resize)
- **grid**: cell matrix and structural mirror operations
- **history**: undo stack
- **clipboard**: typed single-slot clipboard
- **engine**: the edit engine operation catalog
- **view**: pagination projector and edit focus
- **error**: operation error taxonomy
- **loader**: CSV ingestion with limits
- **downloader**: CSV / document export
- **saving**: snapshot persistence
- **session**: opaque user keys
- **app**: routing and handlers
*/

pub mod clipboard;
pub mod column;
pub mod downloader;
pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod loader;
pub mod saving;
pub mod session;
pub mod view;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the core types so callers rarely need the module paths
pub use clipboard::{Clipboard, Payload, PayloadKind};
pub use column::{Column, ColumnId, Columns, DEFAULT_WIDTH, MIN_WIDTH};
pub use engine::{Editor, Stats};
pub use error::EditError;
pub use grid::Grid;
pub use history::{History, Snapshot};
pub use loader::Dataset;
pub use saving::{SavedSheet, SnapshotMeta, SnapshotStore};
pub use session::UserKey;
pub use view::{EditFocus, Page, VisibleRow};
