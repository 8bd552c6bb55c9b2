// src/types.rs
use crate::domain::{Domain, Fingerprint};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Candidate domains gathered for a single run
pub type CandidatePool = HashSet<Domain>;

/// A persisted record of a domain that has been handed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRecord {
    pub domain: Domain,
    pub fingerprint: Fingerprint,
    pub first_seen: DateTime<Utc>,
}

impl SeenRecord {
    pub fn new(domain: Domain, first_seen: DateTime<Utc>) -> Self {
        let fingerprint = domain.fingerprint();
        Self {
            domain,
            fingerprint,
            first_seen,
        }
    }
}

/// Where a selected domain came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Newly marked in the store during this run
    Fresh,
    /// Re-sampled from the store to make up a shortfall
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selected {
    pub domain: Domain,
    pub origin: Origin,
}

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Complete,
    Partial { shortfall: usize },
    /// Nothing could be returned at all
    Exhausted,
}

/// Ordered result of one sampling run
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub requested: usize,
    pub selected: Vec<Selected>,
}

impl ScanReport {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            selected: Vec::new(),
        }
    }

    pub fn push(&mut self, domain: Domain, origin: Origin) {
        self.selected.push(Selected { domain, origin });
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.selected.iter().any(|s| &s.domain == domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.selected.iter().map(|s| &s.domain)
    }

    pub fn fresh_count(&self) -> usize {
        self.count_origin(Origin::Fresh)
    }

    pub fn backfilled_count(&self) -> usize {
        self.count_origin(Origin::Backfill)
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.len())
    }

    pub fn status(&self) -> ScanStatus {
        if self.is_empty() {
            ScanStatus::Exhausted
        } else if self.shortfall() > 0 {
            ScanStatus::Partial {
                shortfall: self.shortfall(),
            }
        } else {
            ScanStatus::Complete
        }
    }

    fn count_origin(&self, origin: Origin) -> usize {
        self.selected.iter().filter(|s| s.origin == origin).count()
    }
}
