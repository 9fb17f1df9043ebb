//! Declarative fallback chains: for each canonical field, the ordered list of
//! raw keys it may be read from. The first non-blank candidate wins.

use serde_json::{Map, Value};

use crate::constants;

/// A canonical field that is resolved from top-level raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Timestamp,
    /// The location value that is later classified as a place or plain text.
    Location,
    /// Top-level locality, consulted only when the location is not a mapping.
    City,
    Subgenre,
    Description,
    Performers,
    DisplayTime,
    Link,
    Image,
    SourceTag,
    IngestionKind,
    ExternalId,
}

impl Field {
    /// Key under which the resolved value is emitted.
    pub fn canonical_key(&self) -> &'static str {
        match self {
            Field::Name => constants::NOME_EVENTO,
            Field::Timestamp => constants::DATA_ORA,
            Field::Location => constants::VENUE,
            Field::City => constants::CITTA,
            Field::Subgenre => constants::SOTTOGENERE,
            Field::Description => constants::DESCRIZIONE,
            Field::Performers => constants::ARTISTI,
            Field::DisplayTime => constants::ORARIO,
            Field::Link => constants::LINK,
            Field::Image => constants::IMMAGINE,
            Field::SourceTag => constants::FONTE,
            Field::IngestionKind => constants::TIPO_INSERIMENTO,
            Field::ExternalId => constants::EVENT_ID,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub sources: &'static [&'static str],
}

impl FieldRule {
    /// First candidate that is present and not blank.
    pub fn resolve<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        self.sources
            .iter()
            .filter_map(|key| record.get(*key))
            .find(|value| !is_blank(value))
    }
}

/// Candidate keys per field, primary convention first.
#[rustfmt::skip]
pub const RULES: &[FieldRule] = &[
    FieldRule { field: Field::Name, sources: &["name", "nome_evento", "title"] },
    FieldRule { field: Field::Timestamp, sources: &["startDate", "data_ora", "date", "datetime"] },
    FieldRule { field: Field::Location, sources: &["location", "venue"] },
    FieldRule { field: Field::City, sources: &["city", "città", "luogo"] },
    FieldRule { field: Field::Subgenre, sources: &["subgenre", "sottogenere"] },
    FieldRule { field: Field::Description, sources: &["description", "descrizione"] },
    FieldRule { field: Field::Performers, sources: &["artists", "artisti"] },
    FieldRule { field: Field::DisplayTime, sources: &["time", "orario"] },
    FieldRule { field: Field::Link, sources: &["url", "link", "link_biglietti"] },
    FieldRule { field: Field::Image, sources: &["image", "immagine", "copertina"] },
    FieldRule { field: Field::SourceTag, sources: &["fonte", "source"] },
    FieldRule { field: Field::IngestionKind, sources: &["tipo_inserimento"] },
    FieldRule { field: Field::ExternalId, sources: &["event_id", "id"] },
];

/// Look up the rule for a field. Every `Field` variant has exactly one entry in `RULES`.
pub fn rule(field: Field) -> &'static FieldRule {
    RULES
        .iter()
        .find(|rule| rule.field == field)
        .unwrap_or_else(|| unreachable!("no rule registered for {:?}", field))
}

/// Shorthand for `rule(field).resolve(record)`.
pub fn resolve(field: Field, record: &Map<String, Value>) -> Option<&Value> {
    rule(field).resolve(record)
}

/// Absent-equivalent values: `null` and strings that are empty after trimming.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
