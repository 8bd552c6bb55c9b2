// src/sampler.rs
//! Selection of fresh domains: store filtering, oversampling, liveness
//! verification and backfill.

use anyhow::Result;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SamplerConfig;
use crate::domain::Domain;
use crate::liveness::LivenessVerifier;
use crate::stats::StatsCollector;
use crate::store::FingerprintStore;
use crate::types::{CandidatePool, Origin, ScanReport};

/// Drives one sampling run against a shared store.
///
/// Holds no per-run state; every call to [`Sampler::run`] starts from the
/// pool it is given and whatever the store currently contains.
pub struct Sampler {
    store: Arc<dyn FingerprintStore>,
    verifier: Arc<dyn LivenessVerifier>,
    config: SamplerConfig,
    stats: StatsCollector,
}

impl Sampler {
    pub fn new(
        store: Arc<dyn FingerprintStore>,
        verifier: Arc<dyn LivenessVerifier>,
        config: SamplerConfig,
        stats: StatsCollector,
    ) -> Self {
        Self {
            store,
            verifier,
            config,
            stats,
        }
    }

    /// Multiplier on the requested count; only verification causes attrition
    pub fn oversample_factor(&self, verify_live: bool) -> usize {
        if verify_live {
            self.config.oversample_factor.max(1)
        } else {
            1
        }
    }

    /// Select up to `requested` domains.
    ///
    /// Fresh domains are inserted into the store before they are added to the
    /// report. A short report is a valid outcome; only store failures are
    /// errors.
    pub async fn run(
        &self,
        pool: CandidatePool,
        requested: usize,
        verify_live: bool,
    ) -> Result<ScanReport> {
        let mut report = ScanReport::new(requested);
        if requested == 0 {
            return Ok(report);
        }

        let factor = self.oversample_factor(verify_live);

        let mut candidates: Vec<Domain> = pool.into_iter().collect();
        candidates.shuffle(&mut rand::thread_rng());

        let potential = self
            .unseen_candidates(candidates, requested.saturating_mul(factor))
            .await?;
        debug!("{} unseen candidates selected for confirmation", potential.len());

        let confirmed = self.confirm(potential, verify_live).await;

        for domain in confirmed {
            if report.len() >= requested {
                break;
            }

            if self.store.insert_if_absent(&domain).await? {
                self.stats.increment_fresh();
                report.push(domain, Origin::Fresh);
            } else {
                // Another run claimed it between the filter and now
                self.stats.increment_conflicts();
                debug!("{} already claimed, skipping", domain);
            }
        }

        if report.shortfall() > 0 {
            if self.config.backfill {
                self.backfill(&mut report, factor, verify_live).await?;
            } else {
                info!("Backfill disabled, returning {} of {}", report.len(), requested);
            }
        }

        info!(
            "Selected {} domains ({} fresh, {} backfilled) of {} requested",
            report.len(),
            report.fresh_count(),
            report.backfilled_count(),
            requested
        );

        Ok(report)
    }

    /// Walk the shuffled candidates, keeping ones the store has not seen and
    /// that carry no junk characters, until `limit` are collected.
    async fn unseen_candidates(&self, candidates: Vec<Domain>, limit: usize) -> Result<Vec<Domain>> {
        let mut potential = Vec::with_capacity(limit.min(candidates.len()));

        for domain in candidates {
            if potential.len() >= limit {
                break;
            }
            if domain.has_disallowed_chars() {
                debug!("Dropping malformed candidate {:?}", domain.as_str());
                continue;
            }
            if self.store.contains(&domain).await? {
                continue;
            }
            potential.push(domain);
        }

        Ok(potential)
    }

    async fn confirm(&self, domains: Vec<Domain>, verify_live: bool) -> Vec<Domain> {
        if verify_live && !domains.is_empty() {
            self.verifier.verify(domains).await
        } else {
            domains
        }
    }

    /// Top up a short report with domains sampled from the store.
    ///
    /// These were handed out by earlier runs, so they are not re-inserted.
    /// They are re-verified whenever verification is on, and never repeat a
    /// domain already in this report.
    async fn backfill(&self, report: &mut ScanReport, factor: usize, verify_live: bool) -> Result<()> {
        let shortfall = report.shortfall();

        // This run's fresh entries are stored too; over-draw by their count
        let draw = shortfall.saturating_mul(factor).saturating_add(report.len());

        let sampled: Vec<Domain> = self
            .store
            .sample_random(draw)
            .await?
            .into_iter()
            .filter(|d| !report.contains(d) && !d.has_disallowed_chars())
            .collect();

        if sampled.is_empty() {
            info!("Store has no domains to backfill {} missing", shortfall);
            return Ok(());
        }

        info!(
            "Only {} new domains available, filling up to {} from the store",
            report.len(),
            shortfall
        );

        let confirmed = self.confirm(sampled, verify_live).await;

        for domain in confirmed.into_iter().take(shortfall) {
            self.stats.increment_backfilled();
            report.push(domain, Origin::Backfill);
        }

        Ok(())
    }
}
