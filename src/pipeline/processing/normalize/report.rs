use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::CanonicalEvent;

/// Why a single raw record was left out of the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing event name")]
    MissingName,

    #[error("missing start date")]
    MissingDate,

    #[error("unparsable start date: {0:?}")]
    UnparsableDate(String),

    #[error("unexpected value type for {field}")]
    TypeMismatch { field: &'static str },
}

impl DiscardReason {
    /// Stable label used for counters and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            DiscardReason::NotAnObject => "not_an_object",
            DiscardReason::MissingName => "missing_name",
            DiscardReason::MissingDate => "missing_date",
            DiscardReason::UnparsableDate(_) => "unparsable_date",
            DiscardReason::TypeMismatch { .. } => "type_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Mapped(CanonicalEvent),
    Discarded { index: usize, reason: DiscardReason },
}

/// One outcome per input element, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl NormalizeReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn mapped_count(&self) -> usize {
        self.events().count()
    }

    pub fn discarded_count(&self) -> usize {
        self.total() - self.mapped_count()
    }

    pub fn events(&self) -> impl Iterator<Item = &CanonicalEvent> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RecordOutcome::Mapped(event) => Some(event),
            RecordOutcome::Discarded { .. } => None,
        })
    }

    pub fn discards(&self) -> impl Iterator<Item = (usize, &DiscardReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            RecordOutcome::Discarded { index, reason } => Some((*index, reason)),
            RecordOutcome::Mapped(_) => None,
        })
    }

    pub fn discard_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (_, reason) in self.discards() {
            *counts.entry(reason.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn into_events(self) -> Vec<CanonicalEvent> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                RecordOutcome::Mapped(event) => Some(event),
                RecordOutcome::Discarded { .. } => None,
            })
            .collect()
    }

    /// Multi-line human readable breakdown: per-reason tallies, then one
    /// line per discarded record.
    pub fn render_details(&self) -> String {
        let mut text = format!("{}\n", self);
        for (label, count) in self.discard_counts() {
            text.push_str(&format!("  {}: {}\n", label, count));
        }
        for (index, reason) in self.discards() {
            text.push_str(&format!("  record #{}: {}\n", index, reason));
        }
        text
    }
}

impl std::fmt::Display for NormalizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total: {}, mapped: {}, discarded: {}",
            self.total(),
            self.mapped_count(),
            self.discarded_count()
        )
    }
}
