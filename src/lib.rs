pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod types;

// Application use cases and their infrastructure adapters
pub mod app;
pub mod infra;

pub use pipeline::normalize::{EventNormalizer, NormalizeReport, Normalizer};
pub use types::CanonicalEvent;
