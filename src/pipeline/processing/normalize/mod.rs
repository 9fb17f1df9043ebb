use chrono::{Datelike, Local};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub mod dates;
pub mod location;
pub mod report;
pub mod rules;

pub use dates::{DateParser, ParsedTimestamp};
pub use location::{resolve_location, LocationShape, ResolvedLocation};
pub use report::{DiscardReason, NormalizeReport, RecordOutcome};
pub use rules::{Field, FieldRule, RULES};

use crate::config::{Config, Profile};
use crate::error::{MapperError, Result};
use crate::observability::metrics;
use crate::types::{CanonicalEvent, RawEventData};

/// Trait for normalizing raw event records into the canonical import shape
pub trait Normalizer {
    /// Map one raw record, or say why it cannot be mapped.
    fn normalize_record(
        &self,
        raw: &RawEventData,
    ) -> std::result::Result<CanonicalEvent, DiscardReason>;

    /// Map a whole input value (one object or an array of them).
    ///
    /// Record-level defects become `Discarded` outcomes; only an input that is
    /// neither an object nor an array fails the call.
    fn normalize_report(&self, input: &RawEventData) -> Result<NormalizeReport> {
        let records = records_of(input)?;

        let outcomes = records
            .into_iter()
            .enumerate()
            .map(|(index, raw)| match self.normalize_record(raw) {
                Ok(event) => {
                    metrics::normalize::record_mapped();
                    RecordOutcome::Mapped(event)
                }
                Err(reason) => {
                    debug!(index, reason = %reason, "Discarding record");
                    metrics::normalize::record_discarded(reason.label());
                    RecordOutcome::Discarded { index, reason }
                }
            })
            .collect();

        let report = NormalizeReport { outcomes };
        metrics::normalize::batch_processed(report.total());
        info!("Normalized batch: {}", report);
        Ok(report)
    }

    /// Surviving canonical records, in input order.
    fn normalize(&self, input: &RawEventData) -> Result<Vec<CanonicalEvent>> {
        Ok(self.normalize_report(input)?.into_events())
    }
}

/// Treat a single object as a one-element batch.
pub fn records_of(input: &Value) -> Result<Vec<&Value>> {
    match input {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(_) => Ok(vec![input]),
        other => Err(MapperError::InvalidInput(format!(
            "expected a JSON object or an array of objects, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads an optional text value, trimmed. Blank text counts as absent;
/// anything other than a string is a type mismatch for `field`.
pub(crate) fn trimmed_text(
    value: Option<&Value>,
    field: &'static str,
) -> std::result::Result<Option<String>, DiscardReason> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(DiscardReason::TypeMismatch { field }),
    }
}

/// The rule-table driven normalizer.
pub struct EventNormalizer {
    profile: Profile,
    dates: DateParser,
    subgenre_default: String,
    source_default: String,
    ingestion_kind_default: String,
}

impl EventNormalizer {
    pub fn new(config: &Config) -> Self {
        let reference_year = config
            .reference_year
            .unwrap_or_else(|| Local::now().year());

        Self {
            profile: config.profile,
            dates: DateParser::new(config.day_first, reference_year),
            subgenre_default: config.subgenre_default(),
            source_default: config.source_default(),
            ingestion_kind_default: config.ingestion_kind_default(),
        }
    }

    fn resolve_name(record: &Map<String, Value>) -> std::result::Result<String, DiscardReason> {
        trimmed_text(rules::resolve(Field::Name, record), Field::Name.canonical_key())?
            .ok_or(DiscardReason::MissingName)
    }

    fn resolve_timestamp(
        &self,
        record: &Map<String, Value>,
    ) -> std::result::Result<String, DiscardReason> {
        match rules::resolve(Field::Timestamp, record) {
            None => Err(DiscardReason::MissingDate),
            Some(Value::String(text)) => self
                .dates
                .parse(text)
                .map(|parsed| parsed.to_iso8601())
                .ok_or_else(|| DiscardReason::UnparsableDate(text.clone())),
            Some(_) => Err(DiscardReason::TypeMismatch {
                field: Field::Timestamp.canonical_key(),
            }),
        }
    }

    /// Description, performers, display time and image are only mapped by the full profile.
    fn extended(&self, field: Field, record: &Map<String, Value>) -> Option<Value> {
        if self.profile.maps_extended_fields() {
            rules::resolve(field, record).cloned()
        } else {
            None
        }
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Normalizer for EventNormalizer {
    fn normalize_record(
        &self,
        raw: &RawEventData,
    ) -> std::result::Result<CanonicalEvent, DiscardReason> {
        let record = raw.as_object().ok_or(DiscardReason::NotAnObject)?;

        let nome_evento = Self::resolve_name(record)?;
        let data_ora = self.resolve_timestamp(record)?;
        let location = resolve_location(record)?;

        let sottogenere = trimmed_text(
            rules::resolve(Field::Subgenre, record),
            Field::Subgenre.canonical_key(),
        )?
        .unwrap_or_else(|| self.subgenre_default.clone());
        let fonte = rules::resolve(Field::SourceTag, record)
            .cloned()
            .unwrap_or_else(|| Value::String(self.source_default.clone()));
        let tipo_inserimento = rules::resolve(Field::IngestionKind, record)
            .cloned()
            .unwrap_or_else(|| Value::String(self.ingestion_kind_default.clone()));

        Ok(CanonicalEvent {
            nome_evento,
            data_ora,
            venue: location.venue,
            citta: location.city,
            sottogenere,
            descrizione: self.extended(Field::Description, record),
            artisti: self.extended(Field::Performers, record),
            orario: self.extended(Field::DisplayTime, record),
            link: rules::resolve(Field::Link, record).cloned(),
            immagine: self.extended(Field::Image, record),
            fonte,
            tipo_inserimento,
            event_id: rules::resolve(Field::ExternalId, record).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> EventNormalizer {
        let config = Config {
            reference_year: Some(2025),
            ..Config::default()
        };
        EventNormalizer::new(&config)
    }

    #[test]
    fn test_normalize_json_ld_event() {
        let raw = json!({
            "@type": "MusicEvent",
            "name": "  Premiata Forneria Marconi  ",
            "startDate": "2024-09-05T20:00:00",
            "location": {
                "@type": "Place",
                "name": "Teatro X",
                "address": {"@type": "PostalAddress", "addressLocality": "Roma"}
            },
            "description": "50 anni di PFM",
            "url": "https://example.com/pfm",
            "image": "https://example.com/pfm.jpg"
        });

        let event = normalizer().normalize_record(&raw).unwrap();
        assert_eq!(event.nome_evento, "Premiata Forneria Marconi");
        assert_eq!(event.data_ora, "2024-09-05T20:00:00");
        assert_eq!(event.venue.as_deref(), Some("Teatro X"));
        assert_eq!(event.citta.as_deref(), Some("Roma"));
        assert_eq!(event.sottogenere, "Progressive");
        assert_eq!(event.descrizione, Some(json!("50 anni di PFM")));
        assert_eq!(event.link, Some(json!("https://example.com/pfm")));
        assert_eq!(event.immagine, Some(json!("https://example.com/pfm.jpg")));
        assert_eq!(event.fonte, json!("import"));
        assert_eq!(event.tipo_inserimento, json!("scraped"));
        assert_eq!(event.event_id, None);
    }

    #[test]
    fn test_normalize_italian_scraper_event() {
        let raw = json!({
            "nome_evento": "Le Orme in concerto",
            "data_ora": "sabato 5 ottobre 2024, ore 21.00",
            "location": "Club Y",
            "city": "Verona",
            "sottogenere": "Italian Prog",
            "artisti": ["Le Orme"],
            "orario": "21:00",
            "link": "https://example.it/le-orme",
            "fonte": "concerti.it",
            "id": "evt-77"
        });

        let event = normalizer().normalize_record(&raw).unwrap();
        assert_eq!(event.data_ora, "2024-10-05T21:00:00");
        assert_eq!(event.venue.as_deref(), Some("Club Y"));
        assert_eq!(event.citta.as_deref(), Some("Verona"));
        assert_eq!(event.sottogenere, "Italian Prog");
        assert_eq!(event.artisti, Some(json!(["Le Orme"])));
        assert_eq!(event.orario, Some(json!("21:00")));
        assert_eq!(event.fonte, json!("concerti.it"));
        assert_eq!(event.event_id, Some(json!("evt-77")));
    }

    #[test]
    fn test_blank_names_are_discarded() {
        let n = normalizer();
        for raw in [
            json!({"startDate": "2024-09-05"}),
            json!({"name": null, "startDate": "2024-09-05"}),
            json!({"name": "   ", "nome_evento": "\t", "startDate": "2024-09-05"}),
        ] {
            assert_eq!(n.normalize_record(&raw), Err(DiscardReason::MissingName));
        }
    }

    #[test]
    fn test_whitespace_primary_name_falls_back_to_secondary() {
        let raw = json!({"name": "  ", "nome_evento": "Goblin", "startDate": "2024-09-05"});
        let event = normalizer().normalize_record(&raw).unwrap();
        assert_eq!(event.nome_evento, "Goblin");
    }

    #[test]
    fn test_date_failures_are_discarded() {
        let n = normalizer();
        assert_eq!(
            n.normalize_record(&json!({"name": "Area"})),
            Err(DiscardReason::MissingDate)
        );
        assert_eq!(
            n.normalize_record(&json!({"name": "Area", "startDate": "not-a-date"})),
            Err(DiscardReason::UnparsableDate("not-a-date".to_string()))
        );
        assert_eq!(
            n.normalize_record(&json!({"name": "Area", "startDate": 1725566400})),
            Err(DiscardReason::TypeMismatch { field: "data_ora" })
        );
    }

    #[test]
    fn test_non_object_record_is_discarded() {
        assert_eq!(
            normalizer().normalize_record(&json!("just a string")),
            Err(DiscardReason::NotAnObject)
        );
    }

    #[test]
    fn test_non_string_name_is_a_type_mismatch() {
        let raw = json!({"name": 1234, "startDate": "2024-09-05"});
        assert_eq!(
            normalizer().normalize_record(&raw),
            Err(DiscardReason::TypeMismatch { field: "nome_evento" })
        );
    }

    #[test]
    fn test_compact_profile_drops_extended_fields() {
        let config = Config {
            profile: Profile::Compact,
            reference_year: Some(2025),
            ..Config::default()
        };
        let raw = json!({
            "name": "Banco",
            "startDate": "2024-09-05",
            "description": "desc",
            "artists": "Banco del Mutuo Soccorso",
            "time": "21:00",
            "image": "banco.jpg",
            "url": "https://example.com/banco"
        });

        let event = EventNormalizer::new(&config).normalize_record(&raw).unwrap();
        assert_eq!(event.sottogenere, "Prog");
        assert_eq!(event.descrizione, None);
        assert_eq!(event.artisti, None);
        assert_eq!(event.orario, None);
        assert_eq!(event.immagine, None);
        assert_eq!(event.link, Some(json!("https://example.com/banco")));
    }

    #[test]
    fn test_report_keeps_input_order_and_indexes() {
        let input = json!([
            {"name": "A", "startDate": "2024-01-01"},
            {"name": "", "startDate": "2024-01-02"},
            42,
            {"name": "D", "startDate": "2024-01-04"}
        ]);

        let report = normalizer().normalize_report(&input).unwrap();
        assert_eq!(report.total(), 4);
        assert_eq!(report.mapped_count(), 2);
        let discards: Vec<(usize, DiscardReason)> =
            report.discards().map(|(i, r)| (i, r.clone())).collect();
        assert_eq!(
            discards,
            vec![(1, DiscardReason::MissingName), (2, DiscardReason::NotAnObject)]
        );

        let names: Vec<String> = report.into_events().into_iter().map(|e| e.nome_evento).collect();
        assert_eq!(names, vec!["A", "D"]);
    }

    #[test]
    fn test_single_object_is_a_one_element_batch() {
        let events = normalizer()
            .normalize(&json!({"name": "Solo", "startDate": "2024-01-01"}))
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_scalar_input_is_fatal() {
        for input in [json!("hello"), json!(12), json!(null), json!(true)] {
            assert!(matches!(
                normalizer().normalize(&input),
                Err(MapperError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_empty_array_maps_to_empty_output() {
        assert!(normalizer().normalize(&json!([])).unwrap().is_empty());
    }
}
