use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::cache_path;
use crate::metadata::error::CacheError;

/// One stored value with its expiration
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheItem {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
    create_time: DateTime<Utc>,
}

/// JSON-file backed key/value store with per-entry expiration.
///
/// The whole file is loaded on open and rewritten after every mutation.
/// A single mutex serializes all access.
pub struct FileCache {
    path: PathBuf,
    data: Mutex<HashMap<String, CacheItem>>,
}

impl FileCache {
    /// Opens the cache namespace `name` under the user cache directory
    pub fn new(name: &str) -> Result<Self, CacheError> {
        Self::open(&cache_path(name))
    }

    /// Opens a cache backed by `path`, creating parent directories.
    ///
    /// An unreadable or corrupt file is treated as an empty cache.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring corrupt cache file {:?}: {}", path, e);
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read cache file {:?}: {}", path, e);
                HashMap::new()
            }
        };

        info!("Opened cache at {:?} with {} entries", path, data.len());

        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the data lock with proper error handling
    fn lock_data(&self) -> Result<MutexGuard<'_, HashMap<String, CacheItem>>, CacheError> {
        self.data.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn save(&self, data: &HashMap<String, CacheItem>) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(data)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Returns the value stored under `key`, or None when absent or expired.
    ///
    /// Expired entries are evicted (and the file rewritten) on lookup.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut data = self.lock_data()?;

        let Some(item) = data.get(key) else {
            debug!("Cache miss: {}", key);
            return Ok(None);
        };

        if item.expires_at <= Utc::now() {
            debug!("Cache entry expired: {}", key);
            data.remove(key);
            self.save(&data)?;
            return Ok(None);
        }

        let value = serde_json::from_value(item.value.clone())?;
        debug!("Cache hit: {}", key);
        Ok(Some(value))
    }

    /// Stores `value` under `key` for `ttl`. A negative ttl stores an
    /// already expired entry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: TimeDelta) -> Result<(), CacheError> {
        let value = serde_json::to_value(value)?;
        let now = Utc::now();

        let mut data = self.lock_data()?;
        data.insert(
            key.to_string(),
            CacheItem {
                value,
                expires_at: now + ttl,
                create_time: now,
            },
        );
        self.save(&data)
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut data = self.lock_data()?;
        data.remove(key);
        self.save(&data)
    }

    /// Removes every entry
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut data = self.lock_data()?;
        data.clear();
        self.save(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_cache(temp_dir: &TempDir) -> FileCache {
        FileCache::open(&temp_dir.path().join("test.json")).unwrap()
    }

    #[test]
    fn set_then_get_returns_value() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        cache
            .set("npm-lodash", &vec!["4.17.21".to_string()], TimeDelta::hours(1))
            .unwrap();

        let value: Option<Vec<String>> = cache.get("npm-lodash").unwrap();
        assert_eq!(value, Some(vec!["4.17.21".to_string()]));
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        let value: Option<String> = cache.get("missing").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn get_returns_none_for_negative_ttl_and_evicts() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);

        cache
            .set("expired", &"value", TimeDelta::hours(-1))
            .unwrap();

        let value: Option<String> = cache.get("expired").unwrap();
        assert_eq!(value, None);

        let reopened = open_cache(&temp_dir);
        assert!(reopened.lock_data().unwrap().is_empty());
    }

    #[test]
    fn entries_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        open_cache(&temp_dir)
            .set("cargo-serde", &42u32, TimeDelta::hours(1))
            .unwrap();

        let value: Option<u32> = open_cache(&temp_dir).get("cargo-serde").unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn delete_and_clear_remove_entries() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);
        cache.set("a", &1u32, TimeDelta::hours(1)).unwrap();
        cache.set("b", &2u32, TimeDelta::hours(1)).unwrap();

        cache.delete("a").unwrap();
        assert_eq!(cache.get::<u32>("a").unwrap(), None);
        assert_eq!(cache.get::<u32>("b").unwrap(), Some(2));

        cache.clear().unwrap();
        assert_eq!(cache.get::<u32>("b").unwrap(), None);
    }

    #[test]
    fn open_treats_corrupt_file_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");
        std::fs::write(&path, "{not json").unwrap();

        let cache = FileCache::open(&path).unwrap();
        assert_eq!(cache.get::<u32>("anything").unwrap(), None);
    }

    #[test]
    fn cache_file_uses_documented_layout() {
        let temp_dir = TempDir::new().unwrap();
        let cache = open_cache(&temp_dir);
        cache.set("go-example.com/mod", &"v", TimeDelta::hours(1)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(cache.path()).unwrap()).unwrap();
        let entry = &raw["go-example.com/mod"];
        assert_eq!(entry["value"], "v");
        assert!(entry["expires_at"].is_string());
        assert!(entry["create_time"].is_string());
    }
}
