// src/crtsh/collector.rs
use std::time::Duration;
use tracing::{info, warn};

use super::client::CrtShClient;
use crate::progress::ProgressIndicator;
use crate::stats::StatsCollector;
use crate::types::CandidatePool;

/// Builds the candidate pool by querying crt.sh once per suffix
pub struct Collector {
    client: CrtShClient,
    delay: Duration,
    stats: StatsCollector,
    progress: ProgressIndicator,
}

impl Collector {
    pub fn new(
        client: CrtShClient,
        delay: Duration,
        stats: StatsCollector,
        progress: ProgressIndicator,
    ) -> Self {
        Self {
            client,
            delay,
            stats,
            progress,
        }
    }

    /// Union of all suffix results.
    ///
    /// A failing suffix is logged and contributes nothing; the remaining
    /// suffixes are still queried.
    pub async fn collect(&self, suffixes: &[String]) -> CandidatePool {
        let mut pool = CandidatePool::new();

        info!("Gathering candidate domains from crt.sh for {} suffixes", suffixes.len());

        for (i, suffix) in suffixes.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.progress
                .set_message(format!("crt.sh .{} ({}/{})", suffix, i + 1, suffixes.len()));

            match self.client.query(suffix).await {
                Ok(found) => {
                    info!("crt.sh .{}: {} names", suffix, found.len());
                    pool.extend(found);
                }
                Err(e) => {
                    self.stats.increment_upstream_failures();
                    warn!("Skipping suffix .{}: {:#}", suffix, e);
                }
            }
        }

        self.stats.add_candidates(pool.len() as u64);
        info!("Total unique candidates fetched: {}", pool.len());

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrtShConfig;
    use crate::domain::Domain;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn collector_for(server: &MockServer, stats: StatsCollector) -> Collector {
        let config = CrtShConfig {
            base_url: format!("{}/", server.uri()),
            request_timeout_secs: 5,
            ..CrtShConfig::default()
        };
        Collector::new(
            CrtShClient::new(&config).unwrap(),
            Duration::ZERO,
            stats,
            ProgressIndicator::new(false),
        )
    }

    #[tokio::test]
    async fn test_collect_unions_and_survives_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "%.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name_value": "a.example.com\nshared.example.org" }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("q", "%.org"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name_value": "*.shared.example.org\nb.example.org" }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("q", "%.net"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("q", "%.io"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let stats = StatsCollector::new();
        let collector = collector_for(&server, stats.clone());
        let suffixes: Vec<String> = ["com", "net", "org", "io"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let pool = collector.collect(&suffixes).await;

        assert_eq!(pool.len(), 3);
        assert!(pool.contains(&Domain::parse("a.example.com").unwrap()));
        assert!(pool.contains(&Domain::parse("shared.example.org").unwrap()));
        assert!(pool.contains(&Domain::parse("b.example.org").unwrap()));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.upstream_failures, 2);
        assert_eq!(snapshot.candidates, 3);
    }

    #[tokio::test]
    async fn test_collect_all_failing_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let collector = collector_for(&server, StatsCollector::new());
        let pool = collector
            .collect(&["com".to_string(), "net".to_string()])
            .await;

        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_collect_unreachable_upstream_is_empty() {
        let config = CrtShConfig {
            // Reserved port on loopback, nothing listens there
            base_url: "http://127.0.0.1:9/".to_string(),
            request_timeout_secs: 2,
            ..CrtShConfig::default()
        };
        let collector = Collector::new(
            CrtShClient::new(&config).unwrap(),
            Duration::ZERO,
            StatsCollector::new(),
            ProgressIndicator::new(false),
        );

        let pool = collector.collect(&["com".to_string()]).await;
        assert!(pool.is_empty());
    }
}
