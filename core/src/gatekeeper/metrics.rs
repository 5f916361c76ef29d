//! Session counters for the gatekeeper.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct GatekeeperStats {
    pub navigations: AtomicU64,
    pub ignored: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    /// Misses that attached to a scoring request already in flight.
    pub inflight_joins: AtomicU64,
    pub scoring_requests: AtomicU64,
    pub scoring_failures: AtomicU64,
    pub redirects: AtomicU64,
    pub superseded: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub navigations: u64,
    pub ignored: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub inflight_joins: u64,
    pub scoring_requests: u64,
    pub scoring_failures: u64,
    pub redirects: u64,
    pub superseded: u64,
}

impl GatekeeperStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_navigation(&self) {
        self.navigations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inflight_join(&self) {
        self.inflight_joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scoring_request(&self) {
        self.scoring_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scoring_failure(&self) {
        self.scoring_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_redirect(&self) {
        self.redirects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            navigations: self.navigations.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            inflight_joins: self.inflight_joins.load(Ordering::Relaxed),
            scoring_requests: self.scoring_requests.load(Ordering::Relaxed),
            scoring_failures: self.scoring_failures.load(Ordering::Relaxed),
            redirects: self.redirects.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
        }
    }

    pub fn report(&self) {
        self.snapshot().report();
    }
}

impl StatsSnapshot {
    pub fn report(&self) {
        tracing::info!(
            target: "phishshield.stats",
            navigations = self.navigations,
            ignored = self.ignored,
            cache_hits = self.cache_hits,
            cache_misses = self.cache_misses,
            inflight_joins = self.inflight_joins,
            scoring_requests = self.scoring_requests,
            scoring_failures = self.scoring_failures,
            redirects = self.redirects,
            superseded = self.superseded,
            "gatekeeper session stats"
        );
    }
}
