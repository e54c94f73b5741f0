//! In-memory TTL cache for filtered search results.
//!
//! Entries expire lazily: an entry older than the TTL is removed when it is
//! next read. There is no background sweeper.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use jobnet_models::JobPosting;
use tracing::debug;

use super::cache_key::CacheKey;

struct CacheEntry {
    data: Vec<JobPosting>,
    created_at: Instant,
}

/// TTL-bounded map from cache key to result set.
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    /// 0 means unbounded
    max_entries: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a result set, evicting it if it has outlived the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<JobPosting>> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Vec<JobPosting>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.created_at) > self.ttl {
            entries.remove(key);
            debug!(key = %key, "Evicted expired cache entry");
            return None;
        }

        Some(entry.data.clone())
    }

    /// Store a result set, replacing any existing entry for the key.
    pub fn set(&self, key: CacheKey, data: Vec<JobPosting>) {
        self.set_at(key, data, Instant::now());
    }

    pub fn set_at(&self, key: CacheKey, data: Vec<JobPosting>, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if self.max_entries > 0 && !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "Evicted oldest cache entry at capacity");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                data,
                created_at: now,
            },
        );
    }

    /// Number of stored entries, expired ones included until read.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
