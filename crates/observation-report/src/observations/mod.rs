//! Observation scoring and reporting.
//!
//! Rows flow one way: raw table → typed [`ObservationRecord`]s → enriched
//! observations (points, classification, period, program) → filtered
//! selection → rollups and views.

pub mod classify;
pub mod cutoffs;
mod dataset;
pub mod domain;
mod filter;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scoring;

pub use classify::{classification_label, classify};
pub use cutoffs::{resolve_period, CutoffPeriod, CutoffTable};
pub use dataset::ObservationDataset;
pub use domain::{
    Area, Cell, Classification, ObservationRecord, QualitativeFeedback, NO_PERIOD, RUBRIC_ITEMS,
};
pub use filter::{ObservationFilter, RoleScope, Selection};
pub use parser::{parse_records, ParsedObservations};
pub use pipeline::{enrich, enrich_all, EnrichedObservation};
pub use scoring::{points_for, score_response};

use crate::schema::SchemaError;
use crate::sources::{SourceError, Table};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A required column is missing; `preview` holds the first rows as read.
    #[error("{error}")]
    Shape { error: SchemaError, preview: Table },
    #[error("source '{0}' has no rows")]
    EmptySource(String),
    #[error("source '{table}' has no usable rows ({skipped} skipped for missing timestamp, service, or teacher)")]
    NoUsableRows { table: String, skipped: usize },
    #[error("no observation at source row {0}")]
    UnknownObservation(usize),
}

impl ReportError {
    pub fn preview(&self) -> Option<&Table> {
        match self {
            Self::Shape { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// Errors caused by the content of a source rather than by reading it.
    pub fn is_data_shape(&self) -> bool {
        matches!(
            self,
            Self::Shape { .. } | Self::EmptySource(_) | Self::NoUsableRows { .. }
        )
    }
}
