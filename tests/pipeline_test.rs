// End-to-end tests: crt.sh mock -> collector -> SQLite store -> sampler
use ct_harvest::config::{CrtShConfig, LivenessConfig, SamplerConfig};
use ct_harvest::crtsh::{Collector, CrtShClient};
use ct_harvest::domain::Domain;
use ct_harvest::liveness::HttpVerifier;
use ct_harvest::progress::ProgressIndicator;
use ct_harvest::sampler::Sampler;
use ct_harvest::stats::StatsCollector;
use ct_harvest::store::{FingerprintStore, SqliteStore};
use ct_harvest::types::{CandidatePool, Origin, ScanStatus};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collector_for(server: &MockServer) -> Collector {
    let config = CrtShConfig {
        base_url: format!("{}/", server.uri()),
        request_timeout_secs: 5,
        ..CrtShConfig::default()
    };
    Collector::new(
        CrtShClient::new(&config).unwrap(),
        Duration::ZERO,
        StatsCollector::new(),
        ProgressIndicator::new(false),
    )
}

fn http_verifier() -> Arc<HttpVerifier> {
    let config = LivenessConfig {
        timeout_secs: 2,
        max_workers: 8,
        max_redirects: 5,
    };
    Arc::new(
        HttpVerifier::new(
            &config,
            "ct-harvest-test",
            StatsCollector::new(),
            ProgressIndicator::new(false),
        )
        .unwrap(),
    )
}

fn sampler_for(store: Arc<SqliteStore>, backfill: bool) -> Sampler {
    Sampler::new(
        store,
        http_verifier(),
        SamplerConfig {
            oversample_factor: 3,
            backfill,
        },
        StatsCollector::new(),
    )
}

async fn mount_names(server: &MockServer, suffix: &str, names: &[String]) {
    Mock::given(method("GET"))
        .and(query_param("q", format!("%.{}", suffix)))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name_value": names.join("\n") }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_unverified_runs_are_disjoint_and_persisted() {
    let crtsh = MockServer::start().await;
    let names: Vec<String> = (0..12).map(|i| format!("*.host{}.example.com", i)).collect();
    mount_names(&crtsh, "com", &names).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("seen.db"), 4).await.unwrap());
    let sampler = sampler_for(store.clone(), false);
    let collector = collector_for(&crtsh);
    let suffixes = vec!["com".to_string()];

    let first = sampler
        .run(collector.collect(&suffixes).await, 8, false)
        .await
        .unwrap();
    let second = sampler
        .run(collector.collect(&suffixes).await, 8, false)
        .await
        .unwrap();

    assert_eq!(first.len(), 8);
    assert_eq!(first.status(), ScanStatus::Complete);
    assert_eq!(second.len(), 4);
    assert_eq!(second.status(), ScanStatus::Partial { shortfall: 4 });

    let first_set: HashSet<&Domain> = first.domains().collect();
    for d in second.domains() {
        assert!(!first_set.contains(d), "{} returned twice", d);
    }

    for d in first.domains().chain(second.domains()) {
        assert!(!d.as_str().starts_with('*'));
        assert!(store.contains(d).await.unwrap());
    }
    assert_eq!(store.count().await.unwrap(), 12);
}

#[tokio::test]
async fn test_verified_run_keeps_only_live_hosts() {
    let live_host = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&live_host)
        .await;

    let broken_host = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&broken_host)
        .await;

    let crtsh = MockServer::start().await;
    mount_names(
        &crtsh,
        "test",
        &[
            live_host.address().to_string(),
            broken_host.address().to_string(),
        ],
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("seen.db"), 4).await.unwrap());
    let sampler = sampler_for(store.clone(), true);

    let pool = collector_for(&crtsh).collect(&["test".to_string()]).await;
    assert_eq!(pool.len(), 2);

    let report = sampler.run(pool, 2, true).await.unwrap();

    let live = Domain::parse(&live_host.address().to_string()).unwrap();
    let broken = Domain::parse(&broken_host.address().to_string()).unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.selected[0].domain, live);
    assert_eq!(report.selected[0].origin, Origin::Fresh);
    assert!(store.contains(&live).await.unwrap());
    assert!(!store.contains(&broken).await.unwrap());
}

#[tokio::test]
async fn test_upstream_down_falls_back_to_store() {
    let crtsh = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&crtsh)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("seen.db"), 4).await.unwrap());
    for i in 0..5 {
        let d = Domain::parse(&format!("cached{}.example.org", i)).unwrap();
        store.insert_if_absent(&d).await.unwrap();
    }

    let sampler = sampler_for(store.clone(), true);
    let pool = collector_for(&crtsh)
        .collect(&["com".to_string(), "org".to_string()])
        .await;
    assert!(pool.is_empty());

    let report = sampler.run(pool, 3, false).await.unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.backfilled_count(), 3);
    assert_eq!(store.count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_short_pool_is_topped_up_from_older_records() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("seen.db"), 2).await.unwrap());
    let old: Vec<Domain> = (0..3)
        .map(|i| Domain::parse(&format!("old{}.example.org", i)).unwrap())
        .collect();
    for d in &old {
        store.insert_if_absent(d).await.unwrap();
    }

    let sampler = sampler_for(store.clone(), true);
    let pool: CandidatePool = (0..2)
        .map(|i| Domain::parse(&format!("new{}.example.com", i)).unwrap())
        .collect();

    let report = sampler.run(pool, 5, false).await.unwrap();

    assert_eq!(report.len(), 5);
    assert_eq!(report.fresh_count(), 2);
    assert_eq!(report.backfilled_count(), 3);
    for s in report.selected.iter().filter(|s| s.origin == Origin::Backfill) {
        assert!(old.contains(&s.domain));
    }
    assert_eq!(store.count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_nothing_anywhere_is_exhausted() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&dir.path().join("seen.db"), 1).await.unwrap());
    let sampler = sampler_for(store, true);

    let report = sampler.run(CandidatePool::new(), 5, true).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(report.status(), ScanStatus::Exhausted);
}

#[tokio::test]
async fn test_two_processes_sharing_a_store_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.db");
    let store_a = Arc::new(SqliteStore::open(&path, 2).await.unwrap());
    let store_b = Arc::new(SqliteStore::open(&path, 2).await.unwrap());

    let pool: CandidatePool = (0..40)
        .map(|i| Domain::parse(&format!("n{}.example.net", i)).unwrap())
        .collect();

    let a = sampler_for(store_a, false);
    let b = sampler_for(store_b.clone(), false);

    let (ra, rb) = tokio::join!(a.run(pool.clone(), 25, false), b.run(pool, 25, false));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    let a_set: HashSet<&Domain> = ra.domains().collect();
    assert!(rb.domains().all(|d| !a_set.contains(d)));
    assert_eq!(
        store_b.count().await.unwrap(),
        (ra.len() + rb.len()) as u64
    );
}
