//! In-memory cache of rendered documents
//!
//! Entries are keyed by `CacheKey` and guarded by a fingerprint of the raw
//! input, so a reused key with different content is a miss. Expired entries
//! are recomputed; when the cache is full the entry with the oldest
//! timestamp is evicted. Hits do not refresh the timestamp.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::core::util::fingerprint;

/// Entries older than this are recomputed
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached documents
pub const DEFAULT_CAPACITY: usize = 20;

/// Source of "now" for entry timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache key: an explicit string or a file identity
///
/// The two kinds never share a slot, even when their display forms match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Explicit(String),
    /// Path plus modification time; any write to the file changes the key
    File {
        path: PathBuf,
        modified: Option<SystemTime>,
    },
}

impl CacheKey {
    pub fn explicit(key: impl Into<String>) -> Self {
        CacheKey::Explicit(key.into())
    }

    pub fn for_file(path: &Path) -> Self {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        CacheKey::File {
            path: path.to_path_buf(),
            modified,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Explicit(key) => f.write_str(key),
            CacheKey::File { path, modified } => {
                let secs = modified
                    .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs());
                match secs {
                    Some(secs) => write!(f, "{}_{}", path.display(), secs),
                    None => write!(f, "{}", path.display()),
                }
            }
        }
    }
}

struct CacheEntry<T> {
    value: Arc<T>,
    fingerprint: u64,
    inserted_at: Instant,
}

/// Hit and miss counters since construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct RenderCache<T> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<T>>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> Default for RenderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RenderCache<T> {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key` if it is fresh and was rendered
    /// from the same `raw` input; otherwise run `render` and store the result.
    ///
    /// `render` runs outside the lock. Two callers missing on the same key
    /// may both render; the later insert wins.
    pub fn get_or_render<F>(&self, key: &CacheKey, raw: &str, render: F) -> Arc<T>
    where
        F: FnOnce(&str) -> T,
    {
        let print = fingerprint(raw);

        if let Some(value) = self.lookup(key, print) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = %key, "render cache hit");
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %key, "render cache miss");
        let value = Arc::new(render(raw));
        self.insert(key.clone(), print, value.clone());
        value
    }

    fn lookup(&self, key: &CacheKey, print: u64) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.inserted_at);
        (entry.fingerprint == print && age < self.ttl).then(|| entry.value.clone())
    }

    fn insert(&self, key: CacheKey, print: u64, value: Arc<T>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(victim) = oldest {
                tracing::debug!(key = %victim, "render cache evict");
                entries.remove(&victim);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                fingerprint: print,
                inserted_at: self.clock.now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop every entry at once
    #[cfg(any(test, feature = "test-support"))]
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Clock advanced by hand
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: std::sync::Mutex<Duration>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            offset: std::sync::Mutex::new(Duration::ZERO),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}
