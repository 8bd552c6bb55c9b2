// src/output/json.rs
//! JSON Lines (JSONL) output handler

use crate::output::OutputHandler;
use crate::types::Selected;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON Lines output handler
///
/// Outputs one `{"domain": ..., "origin": ...}` object per line
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Create a new JsonOutput that writes to stdout
    pub fn new() -> Self {
        Self::to_writer(Box::new(io::stdout()))
    }

    /// Write to an arbitrary sink
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for JsonOutput {
    async fn emit(&self, selected: &Selected) -> anyhow::Result<()> {
        let json = serde_json::to_string(selected)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("JSON output writer poisoned"))?;
        writeln!(writer, "{}", json)?;

        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("JSON output writer poisoned"))?;
        writer.flush()?;
        Ok(())
    }
}
