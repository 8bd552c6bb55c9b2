// src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SUFFIXES: &[&str] = &[
    "com", "net", "org", "io", "co", "uk", "de", "fr", "ca", "au", "jp", "cn", "in", "br", "ru",
    "nl", "it", "es", "se", "no", "pl", "be", "ch", "at", "dk", "fi", "cz", "pt", "gr", "nz",
];

#[derive(Debug, Deserialize, Clone)]
pub struct CrtShConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,  // Polite pause between suffix queries
    #[serde(default = "default_max_entries")]
    pub max_entries_per_query: usize,
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
}

fn default_base_url() -> String { "https://crt.sh/".to_string() }
fn default_user_agent() -> String {
    concat!("ct-harvest/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_request_timeout() -> u64 { 20 }
fn default_delay_ms() -> u64 { 1000 }
fn default_max_entries() -> usize { 3000 }
fn default_suffixes() -> Vec<String> {
    DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for CrtShConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            delay_ms: default_delay_ms(),
            max_entries_per_query: default_max_entries(),
            suffixes: default_suffixes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LivenessConfig {
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,  // Applies to each scheme attempt separately
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_probe_timeout() -> u64 { 5 }
fn default_max_workers() -> usize { 20 }
fn default_max_redirects() -> usize { 10 }

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
            max_workers: default_max_workers(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SamplerConfig {
    #[serde(default = "default_oversample_factor")]
    pub oversample_factor: usize,
    #[serde(default = "default_backfill")]
    pub backfill: bool,
}

fn default_oversample_factor() -> usize { 3 }
fn default_backfill() -> bool { true }

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            oversample_factor: default_oversample_factor(),
            backfill: default_backfill(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_store_path() -> String { "ct-harvest.db".to_string() }
fn default_max_connections() -> u32 { 4 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
}

fn default_output_dir() -> String { ".".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub crtsh: CrtShConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

/// Split a comma-separated suffix list: trims, drops leading dots and
/// empties, lowercases, removes repeats while keeping first-seen order.
pub fn parse_suffix_list(raw: &str) -> Vec<String> {
    let mut suffixes: Vec<String> = Vec::new();

    for part in raw.split(',') {
        let suffix = part.trim().trim_start_matches('.').to_lowercase();
        if suffix.is_empty() || suffixes.contains(&suffix) {
            continue;
        }
        suffixes.push(suffix);
    }

    suffixes
}
