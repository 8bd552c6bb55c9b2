// src/crtsh/client.rs
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::CrtShEntry;
use crate::config::CrtShConfig;
use crate::domain::{parse_name_field, Domain};

/// HTTP client for the crt.sh certificate search
pub struct CrtShClient {
    base_url: Url,
    http_client: reqwest::Client,
    max_entries: usize,
}

impl CrtShClient {
    /// Create a new crt.sh client
    pub fn new(config: &CrtShConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid crt.sh base URL {:?}", config.base_url))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http_client,
            max_entries: config.max_entries_per_query,
        })
    }

    /// Search URL for every certificate name ending in `.{suffix}`
    pub fn query_url(&self, suffix: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("%.{}", suffix))
            .append_pair("output", "json");
        url
    }

    /// Fetch the raw records for one suffix.
    ///
    /// The whole reply is read and decoded first; only the records kept
    /// afterwards are capped at `max_entries_per_query`.
    pub async fn fetch_entries(&self, suffix: &str) -> Result<Vec<CrtShEntry>> {
        let url = self.query_url(suffix);

        debug!("Querying crt.sh: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to reach crt.sh")?;

        let status = response.status();
        if !status.is_success() {
            // crt.sh answers oversized queries with HTML error pages
            anyhow::bail!("crt.sh returned status {} for suffix {}", status, suffix);
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read crt.sh response body")?;

        let mut entries: Vec<CrtShEntry> = serde_json::from_slice(&body)
            .with_context(|| format!("crt.sh returned a non-JSON reply for suffix {}", suffix))?;

        if entries.len() > self.max_entries {
            debug!(
                "Truncating {} crt.sh entries for {} to {}",
                entries.len(),
                suffix,
                self.max_entries
            );
            entries.truncate(self.max_entries);
        }

        Ok(entries)
    }

    /// Query one suffix and return the normalized, deduplicated names
    pub async fn query(&self, suffix: &str) -> Result<HashSet<Domain>> {
        let entries = self.fetch_entries(suffix).await?;

        let mut domains = HashSet::new();
        let mut rejected = 0usize;

        for entry in &entries {
            let Some(ref names) = entry.name_value else {
                debug!(
                    "crt.sh entry {:?} ({:?}, issuer {:?}) has no name_value",
                    entry.id, entry.common_name, entry.issuer_name
                );
                continue;
            };

            for outcome in parse_name_field(names) {
                match outcome {
                    Ok(domain) => {
                        domains.insert(domain);
                    }
                    Err(_) => rejected += 1,
                }
            }
        }

        debug!(
            "crt.sh {}: {} entries, {} names kept, {} rejected",
            suffix,
            entries.len(),
            domains.len(),
            rejected
        );

        Ok(domains)
    }
}
