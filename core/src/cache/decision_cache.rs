//! URL → verdict memo for the gatekeeper.
//!
//! Bounded by an LRU capacity and, optionally, a time-to-live. A hit is only
//! ever the verdict that was inserted; entries are replaced, never edited.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::types::Verdict;

#[derive(Debug, Clone)]
struct CacheEntry {
    verdict: Arc<Verdict>,
    inserted_at: Instant,
}

/// What an [`DecisionCache::insert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheInsert {
    Inserted,
    /// Same verdict already cached; nothing changed.
    Unchanged,
    Replaced,
}

pub struct DecisionCache {
    entries: LruCache<String, CacheEntry>,
    ttl: Option<Duration>,
}

impl DecisionCache {
    pub fn new(capacity: NonZeroUsize, ttl: Option<Duration>) -> Self {
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(cfg.capacity).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity, cfg.ttl_secs.map(Duration::from_secs))
    }

    pub fn lookup(&mut self, key: &str) -> Option<Arc<Verdict>> {
        self.lookup_at(key, Instant::now())
    }

    /// Expired entries are dropped and reported as a miss.
    pub fn lookup_at(&mut self, key: &str, now: Instant) -> Option<Arc<Verdict>> {
        let ttl = self.ttl;
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => is_expired(ttl, entry, now),
        };
        if expired {
            self.entries.pop(key);
            tracing::debug!(target: "phishshield.cache", key, "cache entry expired");
            return None;
        }
        self.entries.get(key).map(|e| e.verdict.clone())
    }

    pub fn insert(&mut self, key: impl Into<String>, verdict: Arc<Verdict>) -> CacheInsert {
        self.insert_at(key, verdict, Instant::now())
    }

    pub fn insert_at(
        &mut self,
        key: impl Into<String>,
        verdict: Arc<Verdict>,
        now: Instant,
    ) -> CacheInsert {
        let key = key.into();
        let outcome = match self.entries.peek(&key) {
            Some(existing) if *existing.verdict == *verdict && !is_expired(self.ttl, existing, now) => {
                return CacheInsert::Unchanged;
            }
            Some(_) => CacheInsert::Replaced,
            None => CacheInsert::Inserted,
        };

        let entry = CacheEntry {
            verdict,
            inserted_at: now,
        };
        if let Some((evicted, _)) = self.entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(target: "phishshield.cache", evicted = %evicted, "cache at capacity, evicted LRU entry");
            }
        }
        outcome
    }

    /// Presence check that does not touch recency or expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

fn is_expired(ttl: Option<Duration>, entry: &CacheEntry, now: Instant) -> bool {
    match ttl {
        Some(ttl) => now.saturating_duration_since(entry.inserted_at) >= ttl,
        None => false,
    }
}
