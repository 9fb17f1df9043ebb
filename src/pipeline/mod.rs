// Data processing pipeline: raw event records in, canonical records out

pub mod processing;

// Re-export key types and functions from each stage
pub use processing::normalize;
