// src/main.rs
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use ct_harvest::cli::Cli;
use ct_harvest::config::{self, Config};
use ct_harvest::crtsh::{Collector, CrtShClient};
use ct_harvest::domain::Domain;
use ct_harvest::liveness::HttpVerifier;
use ct_harvest::output::{artifact, human, json, OutputManager};
use ct_harvest::progress::ProgressIndicator;
use ct_harvest::sampler::Sampler;
use ct_harvest::stats::StatsCollector;
use ct_harvest::store::{FingerprintStore, SqliteStore};
use ct_harvest::types::{CandidatePool, ScanStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate arguments
    cli.validate()?;

    // Load config file; a missing default file just means defaults
    let config_path = Path::new(&cli.config);
    let mut config = if cli.uses_default_config() && !config_path.exists() {
        Config::default()
    } else {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {:?}", config_path))?
    };

    // Apply CLI overrides
    if let Some(ref tlds) = cli.tlds {
        config.crtsh.suffixes = config::parse_suffix_list(tlds);
    }
    if let Some(ref db) = cli.db {
        config.store.path = db.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.directory = dir.clone();
    }
    if cli.no_backfill {
        config.sampler.backfill = false;
    }

    // Initialize logging
    let log_level = cli.log_level().unwrap_or(config.logging.level.as_str());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs share stderr with the spinner, so they are written through it
    let progress = ProgressIndicator::new(cli.should_show_progress());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(progress.clone())
        .init();

    tracing::info!("Starting ct-harvest...");

    // Without the store there is no deduplication, so failing here is fatal
    let store = Arc::new(
        SqliteStore::open(Path::new(&config.store.path), config.store.max_connections).await?,
    );

    // Handle utility commands
    if cli.store_count {
        println!("{}", store.count().await?);
        return Ok(());
    }

    if let Some(ref raw) = cli.lookup {
        let domain = Domain::parse(raw)
            .map_err(|e| anyhow::anyhow!("Invalid domain {:?}: {}", raw, e))?;

        match store.record(&domain).await? {
            Some(record) => println!(
                "{}\t{}\t{}",
                record.domain,
                record.first_seen.to_rfc3339(),
                record.fingerprint
            ),
            None => println!("{} has not been returned yet", domain),
        }
        return Ok(());
    }

    let verify_live = cli.verify_live();
    if verify_live {
        tracing::info!("Live verification enabled: only HTTP 200 domains will be returned");
    } else {
        tracing::info!("Live verification disabled: domains may be offline");
    }

    let stats = StatsCollector::new();

    // Gather candidates
    let pool = if cli.use_cache_only {
        tracing::info!("Using the local store only (no crt.sh fetch)");
        CandidatePool::new()
    } else {
        let client = CrtShClient::new(&config.crtsh)?;
        let collector = Collector::new(
            client,
            Duration::from_millis(config.crtsh.delay_ms),
            stats.clone(),
            progress.clone(),
        );

        let pool = collector.collect(&config.crtsh.suffixes).await;
        if pool.is_empty() {
            tracing::warn!("No candidates fetched from crt.sh, falling back to the local store");
        }
        pool
    };

    let verifier = Arc::new(HttpVerifier::new(
        &config.liveness,
        &config.crtsh.user_agent,
        stats.clone(),
        progress.clone(),
    )?);

    let sampler = Sampler::new(
        store.clone(),
        verifier,
        config.sampler.clone(),
        stats.clone(),
    );

    let report = sampler.run(pool, cli.count, verify_live).await?;
    progress.finish();

    // Present results
    let mut output_manager = OutputManager::new();
    if cli.json {
        output_manager.add_handler(Arc::new(json::JsonOutput::new()));
    } else {
        output_manager.add_handler(Arc::new(human::HumanOutput::new()));
    }
    output_manager.emit_report(&report).await?;

    match report.status() {
        ScanStatus::Complete => {
            tracing::info!("Returned {} domains", report.len());
        }
        ScanStatus::Partial { shortfall } => {
            eprintln!(
                "{}",
                format!(
                    "[!] Only {} of {} requested domains found ({} short). {}",
                    report.len(),
                    report.requested,
                    shortfall,
                    cli.shortfall_hint()
                )
                .yellow()
            );
        }
        ScanStatus::Exhausted => {
            let advisory = if cli.use_cache_only && store.count().await? == 0 {
                "[!] Store is empty. Run once without --use-cache-only to populate it."
            } else if stats.snapshot().candidates == 0 && store.count().await? == 0 {
                "[!] Nothing available: crt.sh returned no candidates and the store is empty. Try again later."
            } else {
                "[!] No domains found. Try increasing --count or adding more --tlds."
            };
            eprintln!("{}", advisory.red());
        }
    }

    if !report.is_empty() && !cli.no_save {
        let dir = Path::new(&config.output.directory);
        match artifact::save_domains(dir, report.domains(), Local::now()).await {
            Ok(path) => eprintln!("{} {}", "[+] Domains saved to:".green(), path.display()),
            Err(e) => tracing::error!("Could not save result file: {:#}", e),
        }
    }

    tracing::info!("Run finished: {}", stats.format_stats());

    if cli.stats {
        let snapshot = stats.snapshot();
        eprintln!("\nRun statistics:");
        eprintln!("  Candidates:       {}", snapshot.candidates);
        eprintln!("  Upstream errors:  {}", snapshot.upstream_failures);
        eprintln!("  Probed:           {}", snapshot.probed);
        eprintln!("  Live:             {}", snapshot.live);
        eprintln!("  Fresh:            {}", snapshot.fresh);
        eprintln!("  Backfilled:       {}", snapshot.backfilled);
        eprintln!("  Insert conflicts: {}", snapshot.insert_conflicts);
        eprintln!(
            "  Elapsed:          {}",
            StatsCollector::format_elapsed(snapshot.elapsed_secs)
        );
    }

    store.close().await;

    Ok(())
}
