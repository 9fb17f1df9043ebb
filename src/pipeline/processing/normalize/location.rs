use serde_json::{Map, Value};

use super::report::DiscardReason;
use super::rules::{self, is_blank, Field};
use super::trimmed_text;

/// Keys that may carry the locality inside a nested `address` mapping.
const LOCALITY_KEYS: &[&str] = &["addressLocality", "city"];

/// The location value of a raw record, classified once.
///
/// Feeds disagree on whether a location is a structured place
/// (`{"name": .., "address": {..}}`) or just a venue name.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationShape<'a> {
    Place(&'a Map<String, Value>),
    Text(String),
    Absent,
}

impl<'a> LocationShape<'a> {
    /// Numbers, booleans and arrays are neither a place nor a venue name.
    pub fn classify(record: &'a Map<String, Value>) -> Result<Self, DiscardReason> {
        match rules::resolve(Field::Location, record) {
            Some(Value::Object(place)) => Ok(LocationShape::Place(place)),
            Some(Value::String(text)) => Ok(LocationShape::Text(text.clone())),
            Some(_) => Err(DiscardReason::TypeMismatch {
                field: Field::Location.canonical_key(),
            }),
            None => Ok(LocationShape::Absent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub venue: Option<String>,
    pub city: Option<String>,
}

pub fn resolve_location(record: &Map<String, Value>) -> Result<ResolvedLocation, DiscardReason> {
    match LocationShape::classify(record)? {
        LocationShape::Place(place) => {
            let venue = trimmed_text(place.get("name"), Field::Location.canonical_key())?;
            let city = match place.get("address") {
                Some(Value::Object(address)) => {
                    let locality = LOCALITY_KEYS
                        .iter()
                        .filter_map(|key| address.get(*key))
                        .find(|value| !is_blank(value));
                    trimmed_text(locality, Field::City.canonical_key())?
                }
                _ => trimmed_text(place.get("city"), Field::City.canonical_key())?,
            };
            Ok(ResolvedLocation { venue, city })
        }
        // Never blank: blank strings classify as Absent.
        LocationShape::Text(text) => Ok(ResolvedLocation {
            venue: Some(text.trim().to_string()),
            city: top_level_city(record)?,
        }),
        LocationShape::Absent => Ok(ResolvedLocation {
            venue: None,
            city: top_level_city(record)?,
        }),
    }
}

fn top_level_city(record: &Map<String, Value>) -> Result<Option<String>, DiscardReason> {
    trimmed_text(rules::resolve(Field::City, record), Field::City.canonical_key())
}
