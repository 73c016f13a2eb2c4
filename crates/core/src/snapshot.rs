//! Best-effort persistence of the row store and selections.
//!
//! A snapshot is one JSON blob stored under [`SNAPSHOT_KEY`]. Loading never fails: a missing,
//! unreadable or incomplete blob is treated as absent. Saving never fails either; errors are
//! logged and the previous blob is left in place.

use crate::error::Result;
use crate::headers::HeaderLetter;
use crate::row::Row;
use crate::store::RowStore;
use crate::view::Selections;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Namespace key of the persisted blob.
pub const SNAPSHOT_KEY: &str = "qtally-dashboard-v1";

/// Persisted form of a store plus the UI selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub headers: Vec<String>,
    #[serde(default)]
    pub header_letters: Vec<HeaderLetter>,
    #[serde(default)]
    pub formula_ignored: usize,
    #[serde(default)]
    pub source_files: Vec<String>,
    #[serde(default)]
    pub q_headers: Vec<String>,
    #[serde(default)]
    pub ui: Selections,
}

impl Snapshot {
    /// Capture the current store and selections.
    #[must_use]
    pub fn capture(store: &RowStore, selections: &Selections) -> Self {
        Snapshot {
            rows: store.rows().to_vec(),
            headers: store.headers().to_vec(),
            header_letters: store.header_letters().to_vec(),
            formula_ignored: store.formula_ignored(),
            source_files: store.source_files().to_vec(),
            q_headers: store.q_headers().to_vec(),
            ui: selections.clone(),
        }
    }

    /// Rebuild the store and selections. Header letters are derived again from the headers.
    #[must_use]
    pub fn into_parts(self) -> (RowStore, Selections) {
        let store = RowStore::new(
            self.rows,
            self.headers,
            self.formula_ignored,
            self.source_files,
        )
        .with_q_headers(self.q_headers);
        (store, self.ui)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a blob, returning `None` unless it carries both `rows` and `headers` arrays and
    /// deserializes cleanly.
    #[must_use]
    pub fn from_json(json: &str) -> Option<Self> {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable snapshot: {}", e);
                return None;
            }
        };

        let has_array = |key: &str| value.get(key).is_some_and(serde_json::Value::is_array);
        if !has_array("rows") || !has_array("headers") {
            tracing::warn!("Ignoring snapshot without rows/headers");
            return None;
        }

        match serde_json::from_value(value) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring malformed snapshot: {}", e);
                None
            }
        }
    }
}

/// Where snapshots live.
pub trait SnapshotStore {
    /// Load the last saved snapshot, if any usable one exists.
    fn load(&self) -> Option<Snapshot>;

    /// Save a snapshot. Failures are logged and swallowed.
    fn save(&self, snapshot: &Snapshot);
}

/// Snapshot store backed by a JSON file named after [`SNAPSHOT_KEY`] in a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileSnapshotStore { dir: dir.into() }
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{SNAPSHOT_KEY}.json"))
    }

    /// Write through a temp file in the same directory, then rename it over the snapshot.
    fn write(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = snapshot.to_json()?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path()).map_err(std::io::Error::from)?;
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<Snapshot> {
        let path = self.path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read snapshot {}: {}", path.display(), e);
                return None;
            }
        };
        Snapshot::from_json(&json)
    }

    fn save(&self, snapshot: &Snapshot) {
        match self.write(snapshot) {
            Ok(()) => tracing::debug!("Saved snapshot to {}", self.path().display()),
            Err(e) => tracing::warn!("Failed to save snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use indexmap::IndexMap;
    use tempfile::tempdir;

    fn store() -> RowStore {
        let mut values = IndexMap::new();
        values.insert("Valor".to_string(), CellValue::text("1.000,50"));
        RowStore::new(
            vec![Row::new("10", "a.xlsx", "Plan1", values)],
            vec!["Valor".to_string()],
            1,
            vec!["a.xlsx".to_string()],
        )
        .with_q_headers(vec!["Codigo".to_string()])
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshotStore::new(dir.path());
        assert!(snapshots.load().is_none());

        let mut selections = Selections::default();
        selections.metric = Some("Valor".to_string());
        snapshots.save(&Snapshot::capture(&store(), &selections));

        let (restored, ui) = snapshots.load().unwrap().into_parts();
        assert_eq!(restored, store());
        assert_eq!(ui, selections);
    }

    #[test]
    fn test_blob_without_rows_is_ignored() {
        assert!(Snapshot::from_json(r#"{"headers": []}"#).is_none());
        assert!(Snapshot::from_json(r#"{"rows": [], "headers": null}"#).is_none());
        assert!(Snapshot::from_json("not json").is_none());
    }

    #[test]
    fn test_minimal_blob_is_accepted() {
        let snapshot = Snapshot::from_json(r#"{"rows": [], "headers": ["A"]}"#).unwrap();
        let (store, ui) = snapshot.into_parts();
        assert!(store.is_empty());
        assert_eq!(store.header_for_letter("A"), Some("A"));
        assert_eq!(ui, Selections::default());
    }

    #[test]
    fn test_save_replaces_previous_blob() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshotStore::new(dir.path());
        snapshots.save(&Snapshot::capture(&store(), &Selections::default()));
        snapshots.save(&Snapshot::capture(&RowStore::empty(), &Selections::default()));

        let (restored, _) = snapshots.load().unwrap().into_parts();
        assert!(restored.is_empty());
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_failed_save_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshotStore::new(dir.path());

        // A non-empty directory squatting on the snapshot path makes the rename fail.
        std::fs::create_dir(snapshots.path()).unwrap();
        std::fs::write(snapshots.path().join("keep"), "x").unwrap();
        snapshots.save(&Snapshot::capture(&store(), &Selections::default()));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(format!("{SNAPSHOT_KEY}.json"))]);
        assert!(snapshots.load().is_none());
    }
}
