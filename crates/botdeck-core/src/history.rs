//! Last-stop timestamps that survive console restarts.
//!
//! The document is a JSON object keyed by absolute bot directory:
//!
//! ```json
//! { "/srv/bots/echo": { "last_stopped": 1700000000.0 } }
//! ```
//!
//! An entry exists only while the last transition seen for that directory
//! was a stop performed by this tool. Loading never fails: a missing or
//! malformed document is an empty history, and a malformed entry is
//! skipped without discarding its neighbours.

use crate::error::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// HistoryRecord / History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Epoch seconds.
    #[serde(rename = "last_stopped", alias = "lastStoppedAt")]
    pub last_stopped_at: f64,
}

impl HistoryRecord {
    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.last_stopped_at.floor();
        let nanos = ((self.last_stopped_at - secs) * 1e9) as u32;
        Utc.timestamp_opt(secs as i64, nanos).single()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: BTreeMap<String, HistoryRecord>,
}

fn key(directory: &Path) -> String {
    directory.to_string_lossy().into_owned()
}

impl History {
    pub fn get(&self, directory: &Path) -> Option<&HistoryRecord> {
        self.entries.get(&key(directory))
    }

    pub fn last_stopped(&self, directory: &Path) -> Option<DateTime<Utc>> {
        self.get(directory).and_then(HistoryRecord::stopped_at)
    }

    /// Upsert the stop time for `directory`.
    pub fn record_stop(&mut self, directory: &Path, at: DateTime<Utc>) {
        let secs = at.timestamp() as f64 + f64::from(at.timestamp_subsec_millis()) / 1000.0;
        self.entries.insert(
            key(directory),
            HistoryRecord {
                last_stopped_at: secs,
            },
        );
    }

    /// Drop the entry for `directory`. Returns true if one was present.
    pub fn clear_on_start(&mut self, directory: &Path) -> bool {
        self.entries.remove(&key(directory)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// File-backed [`History`]. Not held open between calls; concurrent consoles
/// sharing one document are last-writer-wins.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> History {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return History::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "history unreadable, starting empty");
                return History::default();
            }
        };
        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&data) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "history malformed, starting empty");
                return History::default();
            }
        };

        // Entries are decoded one at a time; a bad one is dropped alone.
        let mut entries = BTreeMap::new();
        for (dir, value) in raw {
            match serde_json::from_value::<HistoryRecord>(value) {
                Ok(record) => {
                    entries.insert(dir, record);
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), bot = %dir, error = %e, "skipping malformed history entry");
                }
            }
        }
        History { entries }
    }

    pub fn save(&self, history: &History) -> Result<()> {
        let data = serde_json::to_string_pretty(history)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    /// Load, record a stop for `directory`, save.
    pub fn record_stop(&self, directory: &Path, at: DateTime<Utc>) -> Result<()> {
        let mut history = self.load();
        history.record_stop(directory, at);
        self.save(&history)
    }

    /// Load, clear `directory`, save only if something changed.
    pub fn clear_on_start(&self, directory: &Path) -> Result<()> {
        let mut history = self.load();
        if history.clear_on_start(directory) {
            self.save(&history)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("state.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(HistoryStore::new(&path).load().is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(HistoryStore::new(&path).load().is_empty());
    }

    #[test]
    fn malformed_entry_does_not_drop_valid_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"/srv/bots/a": {"last_stopped": 1700000000.0}, "/srv/bots/b": {}}"#,
        )
        .unwrap();
        let store = HistoryStore::new(&path);

        let history = store.load();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history.last_stopped(Path::new("/srv/bots/a")),
            Some(at(1_700_000_000))
        );

        store
            .record_stop(Path::new("/srv/bots/c"), at(1_700_000_900))
            .unwrap();
        let history = store.load();
        assert_eq!(
            history.last_stopped(Path::new("/srv/bots/a")),
            Some(at(1_700_000_000))
        );
        assert_eq!(
            history.last_stopped(Path::new("/srv/bots/c")),
            Some(at(1_700_000_900))
        );
        assert!(history.get(Path::new("/srv/bots/b")).is_none());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nested/state.json"));
        let mut history = History::default();
        history.record_stop(Path::new("/srv/bots/a"), at(1_700_000_000));
        history.record_stop(Path::new("/srv/bots/b"), at(1_700_000_500));
        store.save(&history).unwrap();
        assert_eq!(store.load(), history);
    }

    #[test]
    fn clear_after_record_removes_entry() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("state.json"));
        let bot = Path::new("/srv/bots/a");
        store.record_stop(bot, at(1_700_000_000)).unwrap();
        assert_eq!(store.load().last_stopped(bot), Some(at(1_700_000_000)));

        store.clear_on_start(bot).unwrap();
        assert!(store.load().get(bot).is_none());
    }

    #[test]
    fn clear_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = HistoryStore::new(&path);
        store.clear_on_start(Path::new("/nowhere")).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn record_stop_upserts() {
        let mut history = History::default();
        let bot = Path::new("/srv/bots/a");
        history.record_stop(bot, at(10));
        history.record_stop(bot, at(20));
        assert_eq!(history.len(), 1);
        assert_eq!(history.last_stopped(bot), Some(at(20)));
    }

    #[test]
    fn reads_legacy_fractional_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"/srv/bots/a": {"last_stopped": 1700000000.5}, "/srv/bots/b": {"lastStoppedAt": 42}}"#,
        )
        .unwrap();
        let history = HistoryStore::new(&path).load();
        let a = history.last_stopped(Path::new("/srv/bots/a")).unwrap();
        assert_eq!(a.timestamp(), 1_700_000_000);
        assert_eq!(a.timestamp_subsec_millis(), 500);
        assert_eq!(history.last_stopped(Path::new("/srv/bots/b")), Some(at(42)));
    }

    #[test]
    fn saved_document_uses_last_stopped_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        HistoryStore::new(&path)
            .record_stop(Path::new("/srv/bots/a"), at(100))
            .unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["/srv/bots/a"]["last_stopped"], serde_json::json!(100.0));
    }
}
