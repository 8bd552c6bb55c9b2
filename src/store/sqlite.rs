// src/store/sqlite.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::FingerprintStore;
use crate::domain::Domain;
use crate::types::SeenRecord;

/// SQLite-backed seen-domain store (single file)
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the store file and ensure the schema exists
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self> {
        info!("Opening seen-domain store at {:?}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // Writers from concurrent runs queue on the file lock instead of failing
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open seen-domain store {:?}", path))?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Create the seen_domains table if it is missing
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seen_domains (
                id INTEGER PRIMARY KEY,
                domain TEXT NOT NULL UNIQUE,
                fingerprint TEXT NOT NULL UNIQUE,
                first_seen_ts TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create seen_domains table")?;

        debug!("Store schema ready");

        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FingerprintStore for SqliteStore {
    async fn contains(&self, domain: &Domain) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM seen_domains WHERE fingerprint = ?1 LIMIT 1")
            .bind(domain.fingerprint().as_str())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query seen_domains")?;

        Ok(row.is_some())
    }

    async fn insert_if_absent(&self, domain: &Domain) -> Result<bool> {
        // The UNIQUE constraints decide; OR IGNORE turns a conflict into zero rows
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO seen_domains (domain, fingerprint, first_seen_ts)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(domain.as_str())
        .bind(domain.fingerprint().as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert into seen_domains")?;

        Ok(result.rows_affected() == 1)
    }

    async fn sample_random(&self, n: usize) -> Result<Vec<Domain>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT domain FROM seen_domains ORDER BY RANDOM() LIMIT ?1")
            .bind(i64::try_from(n).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .context("Failed to sample seen_domains")?;

        let mut domains = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.get("domain");
            match Domain::parse(&raw) {
                Ok(domain) => domains.push(domain),
                Err(e) => warn!("Skipping unusable stored domain {:?}: {}", raw, e),
            }
        }

        Ok(domains)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM seen_domains")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count seen_domains")?;

        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn record(&self, domain: &Domain) -> Result<Option<SeenRecord>> {
        let row = sqlx::query(
            "SELECT first_seen_ts FROM seen_domains WHERE fingerprint = ?1 LIMIT 1",
        )
        .bind(domain.fingerprint().as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up seen_domains record")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_ts: String = row.get("first_seen_ts");
        let first_seen = DateTime::parse_from_rfc3339(&raw_ts)
            .with_context(|| format!("Invalid first_seen_ts {:?} for {}", raw_ts, domain))?
            .with_timezone(&Utc);

        Ok(Some(SeenRecord::new(domain.clone(), first_seen)))
    }
}
