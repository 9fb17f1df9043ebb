//! Metric recording for the normalizer.
//!
//! Goes through the `metrics` facade only. Nothing is exported unless the
//! embedding process installs a recorder, so these calls are free by default.

/// Metric names used in the system
pub const RECORDS_MAPPED: &str = "event_mapper_records_mapped_total";
pub const RECORDS_DISCARDED: &str = "event_mapper_records_discarded_total";
pub const BATCHES_PROCESSED: &str = "event_mapper_batches_processed_total";
pub const BATCH_SIZE: &str = "event_mapper_batch_size";

pub mod normalize {
    use super::*;

    /// Record that a raw record produced a canonical event
    pub fn record_mapped() {
        ::metrics::counter!(RECORDS_MAPPED).increment(1);
    }

    /// Record that a raw record was dropped, labelled by reason
    pub fn record_discarded(reason: &'static str) {
        ::metrics::counter!(RECORDS_DISCARDED, "reason" => reason).increment(1);
    }

    /// Record that a batch was processed
    pub fn batch_processed(batch_size: usize) {
        ::metrics::histogram!(BATCH_SIZE).record(batch_size as f64);
        ::metrics::counter!(BATCHES_PROCESSED).increment(1);
    }
}
