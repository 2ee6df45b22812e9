//! Persisted reader state. Every value is wrapped in an envelope carrying
//! a write timestamp and the app version, one JSON file per key under the
//! platform data directory. Reads never fail the caller: any missing or
//! malformed file degrades to the provided default.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const KEY_PREFIX: &str = "fasmbook";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    /// Seconds since the Unix epoch at write time.
    pub timestamp: u64,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReadingProgress {
    pub chapter_index: usize,
    pub scroll: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Bookmark {
    pub chapter_index: usize,
    pub scroll: usize,
    pub title: String,
}

/// A reader annotation pinned to a scroll position.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Note {
    pub chapter_index: usize,
    pub scroll: usize,
    pub text: String,
}

/// A highlighted code block, anchored by the source line of its opening
/// fence so the mark survives width changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Highlight {
    pub chapter_index: usize,
    pub start_line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SearchHistory {
    pub queries: Vec<String>,
}

impl SearchHistory {
    const MAX: usize = 50;

    pub fn push(&mut self, query: &str) {
        self.queries.retain(|q| q != query);
        self.queries.insert(0, query.to_string());
        self.queries.truncate(Self::MAX);
    }
}

pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "fasmbook", "fasmbook")
            .context("Could not determine data directory")?;
        Ok(Self {
            dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Storage rooted at an explicit directory, for tests and portable use.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.json", KEY_PREFIX, key))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data dir: {}", self.dir.display()))?;
        let envelope = Envelope {
            data: value,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let path = self.key_path(key);
        let content = serde_json::to_string_pretty(&envelope)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write state: {}", path.display()))?;
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = fs::read_to_string(self.key_path(key)).ok()?;
        let envelope: Envelope<T> = serde_json::from_str(&content).ok()?;
        Some(envelope.data)
    }

    pub fn load_or<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.load(key).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_dir(tmp.path());

        let progress = ReadingProgress {
            chapter_index: 3,
            scroll: 42,
        };
        storage.save("progress", &progress).unwrap();

        let loaded: ReadingProgress = storage.load("progress").unwrap();
        assert_eq!(loaded, progress);
    }

    #[test]
    fn test_missing_key_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_dir(tmp.path());
        let progress: ReadingProgress = storage.load_or("progress");
        assert_eq!(progress, ReadingProgress::default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_dir(tmp.path());
        fs::create_dir_all(tmp.path()).unwrap();
        fs::write(storage.key_path("progress"), "{not json").unwrap();
        assert_eq!(
            storage.load_or::<ReadingProgress>("progress"),
            ReadingProgress::default()
        );
    }

    #[test]
    fn test_envelope_carries_version() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_dir(tmp.path());
        storage.save("progress", &ReadingProgress::default()).unwrap();

        let raw = fs::read_to_string(storage.key_path("progress")).unwrap();
        let envelope: Envelope<ReadingProgress> = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope.version, env!("CARGO_PKG_VERSION"));
        assert!(envelope.timestamp > 0);
    }

    #[test]
    fn test_search_history_dedup_and_cap() {
        let mut history = SearchHistory::default();
        history.push("mov");
        history.push("add");
        history.push("mov");
        assert_eq!(history.queries, vec!["mov", "add"]);
    }

    #[test]
    fn test_key_namespacing() {
        let storage = Storage::with_dir("/tmp/x");
        assert!(storage
            .key_path("bookmarks")
            .ends_with("fasmbook.bookmarks.json"));
    }
}
