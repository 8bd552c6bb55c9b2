// src/cli.rs
use clap::Parser;

/// ct-harvest: fresh domains from Certificate Transparency search
///
/// Pulls candidate names from crt.sh, skips every domain handed out by a
/// previous run, optionally keeps only hosts answering HTTP 200, and prints
/// a new batch each time.
#[derive(Parser, Debug, Clone)]
#[command(name = "ct-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // ===== Selection =====
    /// How many unique domains to return
    #[arg(short = 'n', long = "count", default_value = "25")]
    pub count: usize,

    /// Comma-separated suffixes (TLDs) to query, e.g. "com,net,io"
    #[arg(short = 't', long = "tlds")]
    pub tlds: Option<String>,

    /// Skip crt.sh and sample only from the local store
    #[arg(long = "use-cache-only")]
    pub use_cache_only: bool,

    /// Skip liveness verification (faster, may return offline domains)
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Never top up a short result with previously returned domains
    #[arg(long = "no-backfill")]
    pub no_backfill: bool,

    // ===== Input & Configuration =====
    /// Path to TOML config file
    #[arg(short = 'c', long = "config", default_value = "ct-harvest.toml")]
    pub config: String,

    /// Override the seen-domain store path from config
    #[arg(long = "db")]
    pub db: Option<String>,

    // ===== Output =====
    /// Directory for the timestamped result file
    #[arg(short = 'd', long = "output-dir")]
    pub output_dir: Option<String>,

    /// Do not write the result file
    #[arg(long = "no-save")]
    pub no_save: bool,

    /// Output results in JSONL format to stdout
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Print run statistics when finished
    #[arg(long = "stats")]
    pub stats: bool,

    /// Disable progress indicator
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    // ===== Logging =====
    /// Verbose logging (set log level to debug)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet logging (set log level to warn)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    // ===== Utility Commands =====
    /// Show when a domain was first handed out and exit
    #[arg(long = "lookup", value_name = "DOMAIN")]
    pub lookup: Option<String>,

    /// Print the number of stored domains and exit
    #[arg(long = "store-count")]
    pub store_count: bool,
}

impl Cli {
    /// Validate flag combinations and return errors for invalid usage
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.count == 0 {
            anyhow::bail!("--count must be greater than 0");
        }

        if self.verbose && self.quiet {
            anyhow::bail!("Cannot specify both --verbose and --quiet");
        }

        if self.lookup.is_some() && self.store_count {
            anyhow::bail!("Cannot specify both --lookup and --store-count");
        }

        if let Some(ref tlds) = self.tlds {
            if crate::config::parse_suffix_list(tlds).is_empty() && !self.use_cache_only {
                anyhow::bail!("--tlds did not contain any usable suffix");
            }
        }

        Ok(())
    }

    /// Whether the default config path was left untouched
    pub fn uses_default_config(&self) -> bool {
        self.config == "ct-harvest.toml"
    }

    /// Liveness verification is on unless --no-verify
    pub fn verify_live(&self) -> bool {
        !self.no_verify
    }

    /// Check if progress indicator should be enabled
    pub fn should_show_progress(&self) -> bool {
        !self.no_progress
            && !self.json
            && !self.quiet
            && !self.store_count
            && self.lookup.is_none()
    }

    /// Advice printed when a run returns fewer domains than requested
    pub fn shortfall_hint(&self) -> &'static str {
        if self.use_cache_only {
            "Run without --use-cache-only to fetch new candidates."
        } else if self.verify_live() {
            "Try more --tlds or --no-verify."
        } else {
            "Try more --tlds."
        }
    }

    /// Determine log level override from verbose/quiet flags
    pub fn log_level(&self) -> Option<&str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}
