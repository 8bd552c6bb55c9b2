// src/stats.rs
//! Run statistics for ct-harvest

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe statistics collector
#[derive(Clone)]
pub struct StatsCollector {
    candidates: Arc<AtomicU64>,
    upstream_failures: Arc<AtomicU64>,
    probed: Arc<AtomicU64>,
    live: Arc<AtomicU64>,
    fresh: Arc<AtomicU64>,
    backfilled: Arc<AtomicU64>,
    insert_conflicts: Arc<AtomicU64>,
    start_time: Instant,
}

/// Snapshot of statistics at a point in time
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub candidates: u64,
    pub upstream_failures: u64,
    pub probed: u64,
    pub live: u64,
    pub fresh: u64,
    pub backfilled: u64,
    pub insert_conflicts: u64,
    pub elapsed_secs: u64,
}

impl StatsCollector {
    /// Create a new StatsCollector
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(AtomicU64::new(0)),
            upstream_failures: Arc::new(AtomicU64::new(0)),
            probed: Arc::new(AtomicU64::new(0)),
            live: Arc::new(AtomicU64::new(0)),
            fresh: Arc::new(AtomicU64::new(0)),
            backfilled: Arc::new(AtomicU64::new(0)),
            insert_conflicts: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn add_candidates(&self, n: u64) {
        self.candidates.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_upstream_failures(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_probed(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_live(&self) {
        self.live.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fresh(&self) {
        self.fresh.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_backfilled(&self) {
        self.backfilled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.insert_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            candidates: self.candidates.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            probed: self.probed.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
            fresh: self.fresh.load(Ordering::Relaxed),
            backfilled: self.backfilled.load(Ordering::Relaxed),
            insert_conflicts: self.insert_conflicts.load(Ordering::Relaxed),
            elapsed_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_stats(&self) -> String {
        let s = self.snapshot();
        format!(
            "{} candidates | {} probed | {} live | {} fresh | {} backfilled | elapsed: {}",
            s.candidates,
            s.probed,
            s.live,
            s.fresh,
            s.backfilled,
            Self::format_elapsed(s.elapsed_secs)
        )
    }

    /// Format elapsed duration
    pub fn format_elapsed(secs: u64) -> String {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
