// src/store/memory.rs
//! In-memory store for tests and throwaway runs

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::FingerprintStore;
use crate::domain::{Domain, Fingerprint};
use crate::types::SeenRecord;

/// Non-persistent store with the same contract as [`super::SqliteStore`]
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Fingerprint, SeenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `domains`
    pub fn with_domains<I>(domains: I) -> Self
    where
        I: IntoIterator<Item = Domain>,
    {
        let now = Utc::now();
        let records = domains
            .into_iter()
            .map(|d| {
                let record = SeenRecord::new(d, now);
                (record.fingerprint.clone(), record)
            })
            .collect();

        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl FingerprintStore for MemoryStore {
    async fn contains(&self, domain: &Domain) -> Result<bool> {
        let records = self.records.lock().await;
        Ok(records.contains_key(&domain.fingerprint()))
    }

    async fn insert_if_absent(&self, domain: &Domain) -> Result<bool> {
        let mut records = self.records.lock().await;
        let fingerprint = domain.fingerprint();

        if records.contains_key(&fingerprint) {
            return Ok(false);
        }

        records.insert(fingerprint, SeenRecord::new(domain.clone(), Utc::now()));
        Ok(true)
    }

    async fn sample_random(&self, n: usize) -> Result<Vec<Domain>> {
        let records = self.records.lock().await;
        let all: Vec<&Domain> = records.values().map(|r| &r.domain).collect();

        let mut rng = rand::thread_rng();
        Ok(all
            .choose_multiple(&mut rng, n)
            .map(|d| (*d).clone())
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.lock().await.len() as u64)
    }

    async fn record(&self, domain: &Domain) -> Result<Option<SeenRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(&domain.fingerprint()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str) -> Domain {
        Domain::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = MemoryStore::new();
        let example = domain("example.com");

        assert!(!store.contains(&example).await.unwrap());
        assert!(store.insert_if_absent(&example).await.unwrap());
        assert!(!store.insert_if_absent(&example).await.unwrap());
        assert!(store.contains(&example).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.record(&example).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_with_domains_and_sampling() {
        let store = MemoryStore::with_domains(vec![
            domain("a.example.com"),
            domain("b.example.com"),
            domain("c.example.com"),
        ]);

        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.sample_random(2).await.unwrap().len(), 2);
        assert_eq!(store.sample_random(10).await.unwrap().len(), 3);
    }
}
