// src/output/human.rs
//! Human-readable colored terminal output

use crate::output::OutputHandler;
use crate::types::{Origin, Selected};
use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Mutex;

/// One domain per line; backfilled entries are marked `(cached)`
pub struct HumanOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    use_colors: bool,
}

impl HumanOutput {
    /// Create a new HumanOutput that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            use_colors: is_terminal::is_terminal(std::io::stdout()),
        }
    }

    /// Write to an arbitrary sink
    pub fn to_writer(writer: Box<dyn Write + Send>, use_colors: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            use_colors,
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Box<dyn Write + Send>>> {
        self.writer
            .lock()
            .map_err(|_| anyhow::anyhow!("human output writer poisoned"))
    }
}

impl Default for HumanOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for HumanOutput {
    async fn emit(&self, selected: &Selected) -> anyhow::Result<()> {
        let mut writer = self.lock()?;
        let name = selected.domain.as_str();

        match (selected.origin, self.use_colors) {
            (Origin::Fresh, true) => writeln!(writer, "{}", name.green())?,
            (Origin::Backfill, true) => {
                writeln!(writer, "{} {}", name.yellow(), "(cached)".dimmed())?
            }
            (Origin::Fresh, false) => writeln!(writer, "{}", name)?,
            (Origin::Backfill, false) => writeln!(writer, "{} (cached)", name)?,
        }

        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        self.lock()?.flush()?;
        Ok(())
    }
}
