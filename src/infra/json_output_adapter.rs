use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::EventSinkPort;
use crate::types::CanonicalEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Writes the batch as one pretty-printed JSON array.
///
/// Non-ASCII text (accented venue and city names) is written verbatim.
pub struct JsonOutputAdapter {
    target: OutputTarget,
}

impl JsonOutputAdapter {
    pub fn new(target: OutputTarget) -> Self {
        Self { target }
    }

    pub fn stdout() -> Self {
        Self::new(OutputTarget::Stdout)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(OutputTarget::File(path.into()))
    }

    pub fn render(events: &[CanonicalEvent]) -> Result<String> {
        let mut text = serde_json::to_string_pretty(events)?;
        text.push('\n');
        Ok(text)
    }

    fn write_file(path: &Path, text: &str) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;

        info!("Wrote canonical events to {}", path.display());
        Ok(())
    }
}

impl EventSinkPort for JsonOutputAdapter {
    fn write_events(&self, events: &[CanonicalEvent]) -> Result<()> {
        let text = Self::render(events)?;

        match &self.target {
            OutputTarget::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(text.as_bytes())?;
                handle.flush()?;
                Ok(())
            }
            OutputTarget::File(path) => Self::write_file(path, &text),
        }
    }
}
