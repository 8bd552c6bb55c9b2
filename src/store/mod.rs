// src/store/mod.rs
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Domain;
use crate::types::SeenRecord;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistent set of domains that have already been handed out, keyed by
/// fingerprint.
///
/// Any error returned here means the store is unusable and the run must stop.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// True if a record with this domain's fingerprint exists
    async fn contains(&self, domain: &Domain) -> Result<bool>;

    /// Atomically insert a record.
    ///
    /// Returns `false` (not an error) when the fingerprint or domain is
    /// already present.
    async fn insert_if_absent(&self, domain: &Domain) -> Result<bool>;

    /// Up to `n` stored domains chosen uniformly at random
    async fn sample_random(&self, n: usize) -> Result<Vec<Domain>>;

    /// Total number of stored records
    async fn count(&self) -> Result<u64>;

    /// Full record for a domain, if present
    async fn record(&self, domain: &Domain) -> Result<Option<SeenRecord>>;
}
