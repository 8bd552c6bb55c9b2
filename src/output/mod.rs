// src/output/mod.rs
//! Result presentation for ct-harvest
//!
//! Handlers print the selected domains; the result file is written
//! separately by [`artifact`].

use crate::types::{ScanReport, Selected};
use async_trait::async_trait;
use std::sync::Arc;

pub mod artifact;
pub mod human;
pub mod json;

/// Trait for output handlers that present selected domains
#[async_trait]
pub trait OutputHandler: Send + Sync {
    /// Emit one selected domain
    async fn emit(&self, selected: &Selected) -> anyhow::Result<()>;

    /// Flush any buffered output
    async fn flush(&self) -> anyhow::Result<()>;
}

/// Manager that dispatches output to multiple handlers
pub struct OutputManager {
    handlers: Vec<Arc<dyn OutputHandler>>,
}

impl OutputManager {
    /// Create a new OutputManager
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add an output handler
    pub fn add_handler(&mut self, handler: Arc<dyn OutputHandler>) {
        self.handlers.push(handler);
    }

    /// Emit every entry of a report, in order, to all handlers.
    ///
    /// A failing handler is logged and skipped; the error is returned only
    /// when it was the sole handler.
    pub async fn emit_report(&self, report: &ScanReport) -> anyhow::Result<()> {
        let mut last_error = None;

        for selected in &report.selected {
            for handler in &self.handlers {
                if let Err(e) = handler.emit(selected).await {
                    tracing::warn!("Output handler error: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(err) = last_error {
            if self.handlers.len() == 1 {
                return Err(err);
            }
        }

        self.flush().await
    }

    /// Flush all handlers
    pub async fn flush(&self) -> anyhow::Result<()> {
        for handler in &self.handlers {
            handler.flush().await?;
        }
        Ok(())
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}
