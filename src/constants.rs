/// Canonical field names as expected by the import sink.
/// The order here is the order fields are emitted in.
pub const NOME_EVENTO: &str = "nome_evento";
pub const DATA_ORA: &str = "data_ora";
pub const VENUE: &str = "venue";
pub const CITTA: &str = "città";
pub const SOTTOGENERE: &str = "sottogenere";
pub const DESCRIZIONE: &str = "descrizione";
pub const ARTISTI: &str = "artisti";
pub const ORARIO: &str = "orario";
pub const LINK: &str = "link";
pub const IMMAGINE: &str = "immagine";
pub const FONTE: &str = "fonte";
pub const TIPO_INSERIMENTO: &str = "tipo_inserimento";
pub const EVENT_ID: &str = "event_id";

// Profile names (used in CLI and config)
pub const FULL_PROFILE: &str = "full";
pub const COMPACT_PROFILE: &str = "compact";

// Fixed defaults injected when no source value is present
pub const DEFAULT_SUBGENRE_FULL: &str = "Progressive";
pub const DEFAULT_SUBGENRE_COMPACT: &str = "Prog";
pub const DEFAULT_SOURCE: &str = "import";
pub const DEFAULT_INGESTION_KIND: &str = "scraped";
