use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw event data as produced by external scrapers/feeds. No key set is guaranteed.
pub type RawEventData = Value;

/// Canonical event record in the shape the import sink expects.
///
/// Field order is the emission order. Optional fields that resolved to
/// nothing are skipped on serialization, so the output never carries
/// `null` or `""` markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub nome_evento: String,
    pub data_ora: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(rename = "città", default, skip_serializing_if = "Option::is_none")]
    pub citta: Option<String>,
    pub sottogenere: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descrizione: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artisti: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orario: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immagine: Option<Value>,
    pub fonte: Value,
    pub tipo_inserimento: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Value>,
}
