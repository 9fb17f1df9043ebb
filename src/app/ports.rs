use crate::types::CanonicalEvent;

/// Downstream import sink for canonical events.
pub trait EventSinkPort: Send + Sync {
    /// Receives the complete batch of surviving records, in input order.
    fn write_events(&self, events: &[CanonicalEvent]) -> anyhow::Result<()>;
}
