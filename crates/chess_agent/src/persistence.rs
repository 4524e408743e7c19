//! Snapshot persistence
//!
//! Training and the shell hand serialized tables to a [`SnapshotSink`]. The
//! file-backed sink writes to a temporary sibling first and renames it over the
//! target, so a crash mid-write never leaves a truncated model behind. Each
//! write gets its own temporary name; concurrent writers never share one, and
//! the last rename wins.
//!
//! # Error Handling
//!
//! - Load failures (missing file, corrupt blob, unknown version) fall back to
//!   an empty table and are logged
//! - Save failures are returned to the caller; training logs them and keeps
//!   going

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AgentResult;
use crate::store::QTable;

/// Default model file name, relative to the working directory
pub const DEFAULT_MODEL_FILE: &str = "chess_rl_model.json";

/// Destination for serialized Q-tables
pub trait SnapshotSink: Send + Sync {
    fn write_snapshot(&self, blob: &[u8]) -> AgentResult<()>;
}

/// Sink that discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn write_snapshot(&self, _blob: &[u8]) -> AgentResult<()> {
        Ok(())
    }
}

/// Snapshot stored in a single JSON file
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the table stored at this path
    pub fn load(&self) -> AgentResult<QTable> {
        let blob = fs::read(&self.path)?;
        QTable::restore(&blob)
    }

    /// Load the stored table, or start empty when it cannot be read
    pub fn load_or_empty(&self) -> QTable {
        if !self.path.exists() {
            info!(
                "[SNAPSHOT] No model found at {:?}. Starting with an empty table.",
                self.path
            );
            return QTable::new();
        }
        match self.load() {
            Ok(table) => {
                let stats = table.stats();
                info!(
                    "[SNAPSHOT] Loaded {} states / {} entries from {:?}",
                    stats.states, stats.entries, self.path
                );
                table
            }
            Err(e) => {
                warn!(
                    "[SNAPSHOT] Failed to load model at {:?}: {}. Starting with an empty table.",
                    self.path, e
                );
                QTable::new()
            }
        }
    }

    /// Fresh temporary sibling, e.g. `model.json.<uuid>.tmp`
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

impl SnapshotSink for FileSnapshot {
    fn write_snapshot(&self, blob: &[u8]) -> AgentResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, blob).and_then(|_| fs::rename(&temp, &self.path)) {
            fs::remove_file(&temp).ok();
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionId;
    use crate::encoder::StateId;
    use tempfile::TempDir;

    fn file_names(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .expect("readable dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = FileSnapshot::new(dir.path().join("model.json"));
        let mut table = QTable::new();
        table.set(&StateId::new("s"), &ActionId::new("e2e4"), 0.25);

        sink.write_snapshot(&table.snapshot().expect("serializes"))
            .expect("writes");
        // Temporary file renamed away
        assert_eq!(file_names(&dir), vec!["model.json".to_string()]);
        assert_eq!(sink.load().expect("loads"), table);
    }

    #[test]
    fn test_temp_names_are_unique() {
        let sink = FileSnapshot::new("model.json");
        assert_ne!(sink.temp_path(), sink.temp_path());
    }

    #[test]
    fn test_creates_missing_parent_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = FileSnapshot::new(dir.path().join("nested").join("model.json"));
        sink.write_snapshot(&QTable::new().snapshot().expect("serializes"))
            .expect("writes");
        assert!(sink.load().expect("loads").is_empty());
    }

    #[test]
    fn test_concurrent_writers_never_fail() {
        //! Two writers hammering the same file; every write lands and the final
        //! file is one of the two complete blobs
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = FileSnapshot::new(dir.path().join("model.json"));

        let mut big = QTable::new();
        for i in 0..5_000 {
            big.set(&StateId::new(format!("state-{i}")), &ActionId::new("e2e4"), i as f64);
        }
        let big_blob = big.snapshot().expect("serializes");
        let empty_blob = QTable::new().snapshot().expect("serializes");

        let failures = std::thread::scope(|scope| {
            let writers: Vec<_> = [&big_blob, &empty_blob]
                .into_iter()
                .map(|blob| {
                    let sink = &sink;
                    scope.spawn(move || {
                        (0..50)
                            .filter(|_| sink.write_snapshot(blob).is_err())
                            .count()
                    })
                })
                .collect();
            writers
                .into_iter()
                .map(|w| w.join().expect("writer thread"))
                .sum::<usize>()
        });

        assert_eq!(failures, 0);
        let last = sink.load().expect("final file is a complete snapshot");
        assert!(last == big || last.is_empty());
        assert_eq!(file_names(&dir), vec!["model.json".to_string()]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = FileSnapshot::new(dir.path().join("absent.json"));
        assert!(sink.load().is_err());
        assert!(sink.load_or_empty().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sink = FileSnapshot::new(dir.path().join("corrupt.json"));
        sink.write_snapshot(b"{ definitely not a snapshot")
            .expect("writes");
        assert!(sink.load().unwrap_err().is_persistence());
        assert!(sink.load_or_empty().is_empty());
    }
}
