//! Class observation reporting: ingestion, scoring, classification and rollups.

pub mod catalog;
pub mod config;
pub mod error;
mod normalizer;
pub mod observations;
pub mod schema;
pub mod sources;
pub mod telemetry;
