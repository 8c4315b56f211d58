use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Configuration for provider response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
}

/// Get the platform-appropriate cache directory for gridfp
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("gridfp/provider-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/gridfp/provider-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Disk-persistent cache of raw provider response bodies, keyed by URL.
///
/// Uses cacache for disk persistence and an in-memory HashMap for fast
/// access. Entries carry no TTL: the provider only serves completed events,
/// whose results never change.
#[derive(Clone)]
pub struct DiskCache {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    cache_path: PathBuf,
}

/// Serializable representation of a cache entry for disk storage
#[derive(serde::Serialize, serde::Deserialize)]
struct DiskCacheEntry {
    fetched_at: DateTime<Utc>,
    body: Vec<u8>,
}

impl DiskCache {
    pub fn new(cache_path: PathBuf) -> Self {
        // Don't pre-load disk cache - entries are loaded on demand
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            cache_path,
        }
    }

    pub fn open_default() -> Self {
        Self::new(get_cache_path())
    }

    /// Remove every cached response, in memory and on disk
    pub fn clear(&self) -> Result<()> {
        self.inner.lock().unwrap().clear();
        match std::fs::remove_dir_all(&self.cache_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove cache directory"),
        }
    }

    /// Look up a cached body: in-memory first, then disk
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let data = self.inner.lock().unwrap();
            if let Some(body) = data.get(key) {
                return Some(body.clone());
            }
        }

        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        let entry: DiskCacheEntry = serde_json::from_slice(&bytes).ok()?;

        // Populate in-memory cache for subsequent hits
        let mut data = self.inner.lock().unwrap();
        data.insert(key.to_string(), entry.body.clone());

        Some(entry.body)
    }

    /// Store a body in memory and on disk (disk errors are not fatal)
    pub fn put(&self, key: &str, body: &[u8]) {
        {
            let mut data = self.inner.lock().unwrap();
            data.insert(key.to_string(), body.to_vec());
        }

        let entry = DiskCacheEntry {
            fetched_at: Utc::now(),
            body: body.to_vec(),
        };
        if let Ok(serialized) = serde_json::to_vec(&entry) {
            let _ = cacache::write_sync(&self.cache_path, key, &serialized);
        }
    }
}
