// src/liveness.rs
//! Concurrent HTTP(S) liveness probing

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::LivenessConfig;
use crate::domain::Domain;
use crate::progress::ProgressIndicator;
use crate::stats::StatsCollector;

/// Filters a batch of domains down to the ones that answer
#[async_trait]
pub trait LivenessVerifier: Send + Sync {
    /// Return the subset of `domains` confirmed live, in no particular order
    async fn verify(&self, domains: Vec<Domain>) -> Vec<Domain>;
}

/// URL scheme tried by a probe, in preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub const PREFERENCE: [Scheme; 2] = [Scheme::Https, Scheme::Http];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

/// Probes `https://<domain>/` then `http://<domain>/`; live means a final
/// status of exactly 200.
pub struct HttpVerifier {
    http_client: reqwest::Client,
    attempt_timeout: Duration,
    max_workers: usize,
    stats: StatsCollector,
    progress: ProgressIndicator,
}

impl HttpVerifier {
    pub fn new(
        config: &LivenessConfig,
        user_agent: &str,
        stats: StatsCollector,
        progress: ProgressIndicator,
    ) -> Result<Self> {
        let attempt_timeout = Duration::from_secs(config.timeout_secs);

        let http_client = reqwest::Client::builder()
            // CT-derived hosts routinely serve stale or mismatched certificates
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(config.max_redirects))
            .connect_timeout(attempt_timeout)
            .user_agent(user_agent.to_string())
            .build()
            .context("Failed to build probe HTTP client")?;

        Ok(Self {
            http_client,
            attempt_timeout,
            max_workers: config.max_workers.max(1),
            stats,
            progress,
        })
    }

    /// First scheme that answered 200, if any
    pub async fn probe(&self, domain: &Domain) -> Option<Scheme> {
        for scheme in Scheme::PREFERENCE {
            let url = format!("{}://{}/", scheme.as_str(), domain);

            match self
                .http_client
                .get(&url)
                .timeout(self.attempt_timeout)
                .send()
                .await
            {
                Ok(response) if response.status() == StatusCode::OK => {
                    return Some(scheme);
                }
                Ok(response) => {
                    debug!("{} answered {}", url, response.status());
                }
                Err(e) => {
                    let kind = if e.is_timeout() {
                        "timeout"
                    } else if e.is_redirect() {
                        "redirect"
                    } else if e.is_connect() {
                        "connect"
                    } else {
                        "transport"
                    };
                    debug!("{} failed ({}): {}", url, kind, e);
                }
            }
        }

        None
    }
}

#[async_trait]
impl LivenessVerifier for HttpVerifier {
    async fn verify(&self, domains: Vec<Domain>) -> Vec<Domain> {
        let total = domains.len();
        if total == 0 {
            return Vec::new();
        }

        info!(
            "Checking {} domains for live status (HTTP 200, {} workers)",
            total, self.max_workers
        );

        let checked = AtomicUsize::new(0);
        let live_count = AtomicUsize::new(0);

        let outcomes: Vec<Option<Domain>> = stream::iter(domains)
            .map(|domain| {
                let checked = &checked;
                let live_count = &live_count;
                async move {
                    let hit = self.probe(&domain).await;

                    self.stats.increment_probed();
                    let done = checked.fetch_add(1, Ordering::Relaxed) + 1;
                    let live = match hit {
                        Some(scheme) => {
                            self.stats.increment_live();
                            debug!("{} is live over {}", domain, scheme.as_str());
                            live_count.fetch_add(1, Ordering::Relaxed) + 1
                        }
                        None => live_count.load(Ordering::Relaxed),
                    };
                    self.progress
                        .set_message(format!("probed {}/{} | {} live", done, total, live));

                    hit.map(|_| domain)
                }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let live: Vec<Domain> = outcomes.into_iter().flatten().collect();

        info!("Found {} live domains out of {} checked", live.len(), total);

        live
    }
}
