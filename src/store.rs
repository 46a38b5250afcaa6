//! Key-value store for tasktogo
//!
//! Persists each collection under a fixed key inside a single data
//! directory, one file per key:
//!
//! ```text
//! <data dir>/
//!   tasks.json        # task collection
//!   categories.json   # category collection
//!   priorities.json   # priority collection
//!   settings.json     # flat settings map
//!   theme             # theme scalar (bare string)
//!   backup.json       # secondary snapshot slot
//! ```
//!
//! All JSON writes go through temp-file + rename so a reader never sees a
//! partial file. Concurrent writers from other processes are not
//! coordinated: last writer wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Fixed persisted keys
pub const KEY_TASKS: &str = "tasks";
pub const KEY_CATEGORIES: &str = "categories";
pub const KEY_PRIORITIES: &str = "priorities";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_THEME: &str = "theme";
pub const KEY_BACKUP: &str = "backup";

/// Directory-backed key-value store
#[derive(Debug, Clone)]
pub struct KvStore {
    root: PathBuf,
}

impl KvStore {
    /// Create a store rooted at the given data directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a JSON-valued key
    pub fn path_for(&self, key: &str) -> PathBuf {
        if key == KEY_THEME {
            // The theme is a bare scalar, not JSON.
            self.root.join(key)
        } else {
            self.root.join(format!("{key}.json"))
        }
    }

    /// Read and deserialize a key; `None` when nothing is persisted
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value: T = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Serialize and persist a key atomically
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_atomic(&self.path_for(key), json.as_bytes())
    }

    /// Remove a key; absent keys are not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Read a bare-string scalar (theme)
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(content.trim().to_string()))
    }

    /// Write a bare-string scalar atomically
    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.write_atomic(&self.path_for(key), value.as_bytes())
    }

    /// Write data atomically using temp file + rename
    ///
    /// The file is either fully written or not at all; readers never see a
    /// partial write.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize, serde::Deserialize, PartialEq, Debug)]
    struct Record {
        name: String,
        value: i32,
    }

    #[test]
    fn key_paths() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        assert_eq!(store.path_for(KEY_TASKS), temp.path().join("tasks.json"));
        assert_eq!(store.path_for(KEY_THEME), temp.path().join("theme"));
        assert_eq!(store.path_for(KEY_BACKUP), temp.path().join("backup.json"));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        let read: Option<Vec<Record>> = store.get(KEY_TASKS).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn set_get_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        let data = vec![Record {
            name: "test".to_string(),
            value: 42,
        }];
        store.set(KEY_TASKS, &data).unwrap();

        let read: Vec<Record> = store.get(KEY_TASKS).unwrap().unwrap();
        assert_eq!(read, data);

        // No stray temp file left behind
        assert!(!temp.path().join("tasks.tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        store.set(KEY_SETTINGS, &serde_json::json!({"k": 1})).unwrap();
        store.remove(KEY_SETTINGS).unwrap();
        store.remove(KEY_SETTINGS).unwrap();
        let read: Option<serde_json::Value> = store.get(KEY_SETTINGS).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn theme_scalar_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::open(temp.path()).unwrap();

        assert!(store.get_string(KEY_THEME).unwrap().is_none());
        store.set_string(KEY_THEME, "dark").unwrap();
        assert_eq!(store.get_string(KEY_THEME).unwrap().unwrap(), "dark");
    }
}
