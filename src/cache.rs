//! Pluggable response caching keyed by request path.
//!
//! The client consults a [`CacheProvider`] before every GET and stores the
//! deserialized result after every successful one. Entries are JSON documents,
//! which keeps the trait object-safe and lets persistent providers write them
//! out unchanged.
//!
//! Three providers ship with the crate:
//!
//! - [`NoCache`] — the default, caches nothing
//! - [`MemoryCache`] — in-process, shared by clones of the client
//! - [`FileCache`] — a JSON file on disk that survives restarts
//!
//! Invalidation is prefix-based only. After creating an issue, for instance,
//! `client.invalidate("repositories/acme/widget/issues")` drops the list and
//! every individual issue under it.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Key-value store for previously fetched results.
///
/// Implementations must be safe to share between concurrent calls; the client
/// does no locking of its own.
///
/// # Examples
///
/// ```
/// use bitbucket_rest::cache::{CacheProvider, MemoryCache};
/// use serde_json::json;
///
/// let cache = MemoryCache::new();
/// cache.set("issues/5", json!({"title": "Crash"}));
/// cache.set("issues/6", json!({"title": "Hang"}));
/// cache.set("users/alice", json!({"username": "alice"}));
///
/// cache.delete_where_starting_with("issues/");
///
/// assert!(cache.get("issues/5").is_none());
/// assert!(cache.get("users/alice").is_some());
/// ```
pub trait CacheProvider: Send + Sync {
    /// Returns the entry stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: Value);

    /// Removes every entry whose key starts with `prefix`.
    fn delete_where_starting_with(&self, prefix: &str);

    /// Returns `false` if the provider never stores anything.
    ///
    /// The client uses this to skip serializing results nobody will read.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// A provider that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheProvider for NoCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value) {}

    fn delete_where_starting_with(&self, _prefix: &str) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// An in-process provider.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CacheProvider for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn delete_where_starting_with(&self, prefix: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| !key.starts_with(prefix));
    }
}

/// A provider persisted as a single JSON document.
///
/// The whole document is loaded when the cache is opened and rewritten after
/// every change. I/O failures are logged and otherwise ignored: a broken cache
/// file degrades to a cold cache, it never fails an API call.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl FileCache {
    /// Opens the cache stored at `path`, starting empty if the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unreadable cache file"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read cache file"
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// The file backing this cache.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) {
        if let Err(e) = write_atomically(&self.path, entries) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to write cache file"
            );
        }
    }
}

fn write_atomically(path: &Path, entries: &BTreeMap<String, Value>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = serde_json::to_vec(entries)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

impl CacheProvider for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        self.persist(&entries);
    }

    fn delete_where_starting_with(&self, prefix: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        if entries.len() != before {
            self.persist(&entries);
        }
    }
}
