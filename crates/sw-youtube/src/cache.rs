//! In-memory resolution cache.
//!
//! Maps a video identifier to the direct audio URL it resolved to, so repeat
//! requests within the TTL skip extraction. Expiry is measured against an
//! injected [`Clock`]. There is no size bound; expired entries are swept by
//! [`ResolutionCache::evict_expired`].

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sw_core::{Clock, SystemClock};

/// Cache key for a video identifier.
pub fn cache_key(video_id: &str) -> String {
    format!("audio_{video_id}")
}

/// A resolved audio source.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub media_url: String,
    pub title: String,
    pub duration_secs: Option<u64>,
    pub resolved_at: Instant,
}

/// Thread-safe TTL cache for resolved audio URLs.
pub struct ResolutionCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResolutionCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Cache backed by the system clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// Look up `key`, returning the entry only while it is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.resolved_at) < self.ttl)
            .map(|entry| entry.value().clone())
    }

    /// Store a freshly resolved source, stamped with the current time.
    pub fn put(
        &self,
        key: impl Into<String>,
        media_url: impl Into<String>,
        title: impl Into<String>,
        duration_secs: Option<u64>,
    ) -> CacheEntry {
        let entry = CacheEntry {
            media_url: media_url.into(),
            title: title.into(),
            duration_secs,
            resolved_at: self.clock.now(),
        };
        self.insert(key, entry.clone());
        entry
    }

    /// Store a prepared entry as-is.
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Drop every entry whose age has reached the TTL.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.resolved_at) < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Evicted expired resolutions");
        }
        removed
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
