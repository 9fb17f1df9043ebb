use anyhow::{Context, Result};
use tracing::info;

use crate::app::ports::EventSinkPort;
use crate::config::Config;
use crate::pipeline::processing::normalize::{EventNormalizer, NormalizeReport, Normalizer};
use crate::types::{CanonicalEvent, RawEventData};

/// Use case for mapping a raw JSON document into canonical events
pub struct NormalizeUseCase {
    normalizer: Box<dyn Normalizer + Send + Sync>,
    output: Box<dyn EventSinkPort>,
}

impl NormalizeUseCase {
    pub fn new(
        normalizer: Box<dyn Normalizer + Send + Sync>,
        output: Box<dyn EventSinkPort>,
    ) -> Self {
        Self { normalizer, output }
    }

    /// Create a use case with the rule-table normalizer built from `config`
    pub fn with_config(config: &Config, output: Box<dyn EventSinkPort>) -> Self {
        Self::new(Box::new(EventNormalizer::new(config)), output)
    }

    /// Parse the whole input as one JSON value. A malformed document is fatal.
    pub fn parse_input(input: &str) -> crate::error::Result<RawEventData> {
        Ok(serde_json::from_str(input)?)
    }

    /// Normalize without writing anything (dry run).
    pub fn normalize_input(&self, input: &str) -> Result<NormalizeReport> {
        let raw = Self::parse_input(input).context("invalid input document")?;
        let report = self
            .normalizer
            .normalize_report(&raw)
            .context("invalid input document")?;
        Ok(report)
    }

    /// Normalize and hand the surviving records to the output sink.
    ///
    /// Nothing is written when the input itself is unusable.
    pub fn run(&self, input: &str) -> Result<NormalizeReport> {
        let report = self.normalize_input(input)?;

        let events: Vec<CanonicalEvent> = report.events().cloned().collect();
        self.output
            .write_events(&events)
            .context("failed to write mapped events")?;
        info!("Wrote {} mapped events ({})", events.len(), report);

        Ok(report)
    }
}
