// src/output/artifact.rs
//! Timestamped plain-text result file

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::domain::Domain;

/// `YYYYmmdd_HHMMSS_domains.txt`
pub fn result_file_name(at: DateTime<Local>) -> String {
    format!("{}_domains.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Write one domain per line into `dir`, named after the run time.
pub async fn save_domains<'a, I>(dir: &Path, domains: I, at: DateTime<Local>) -> Result<PathBuf>
where
    I: IntoIterator<Item = &'a Domain>,
{
    let mut contents = String::new();
    for domain in domains {
        contents.push_str(domain.as_str());
        contents.push('\n');
    }

    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;

    let path = dir.join(result_file_name(at));
    fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write result file {:?}", path))?;

    info!("Domains saved to {:?}", path);

    Ok(path)
}
