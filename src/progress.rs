// src/progress.rs
//! Spinner shown on stderr while collecting and probing

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Progress indicator wrapper; a disabled one is a no-op
#[derive(Clone)]
pub struct ProgressIndicator {
    spinner: Option<ProgressBar>,
}

impl ProgressIndicator {
    /// Create a new progress indicator
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { spinner: None };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self {
            spinner: Some(spinner),
        }
    }

    /// Set the status message
    pub fn set_message(&self, msg: impl Into<String>) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(msg.into());
        }
    }

    /// Temporarily hide the spinner to print other output
    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if let Some(ref spinner) = self.spinner {
            spinner.suspend(f)
        } else {
            f()
        }
    }

    /// Finish and clear the progress indicator
    pub fn finish(&self) {
        if let Some(ref spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.spinner.is_some()
    }

    /// Wrap `inner` so every write happens with the spinner hidden
    pub fn wrap_writer<W: Write>(&self, inner: W) -> SuspendingWriter<W> {
        SuspendingWriter {
            progress: self.clone(),
            inner,
        }
    }
}

/// Log sink for the `tracing` subscriber: events go to stderr without
/// tearing the spinner line.
impl<'a> MakeWriter<'a> for ProgressIndicator {
    type Writer = SuspendingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        self.wrap_writer(io::stderr())
    }
}

/// Writer that suspends the spinner around each write
pub struct SuspendingWriter<W> {
    progress: ProgressIndicator,
    inner: W,
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.progress.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.progress.suspend(|| inner.flush())
    }
}
