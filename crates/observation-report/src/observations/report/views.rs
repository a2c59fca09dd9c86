use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{Area, Cell, Classification, QualitativeFeedback};
use super::super::filter::{ObservationFilter, RoleScope};
use super::super::pipeline::EnrichedObservation;
use super::areas::AreaBreakdown;
use super::distribution::ClassificationShare;
use super::summary::{PeriodSummary, ServiceSummary, TeacherSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    NoResults,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::NoResults => "No observations match the selected filters",
        }
    }
}

/// One line of the per-observation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRow {
    /// Source row; also the address used by the detail view.
    pub row: usize,
    pub timestamp: String,
    pub observed_on: Option<NaiveDate>,
    pub teacher: String,
    pub service: String,
    pub program_id: String,
    pub program_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer: Option<String>,
    pub period: String,
    pub total_points: f64,
    pub answered: usize,
    pub classification: Option<Classification>,
    pub classification_label: &'static str,
}

impl From<&EnrichedObservation> for ObservationRow {
    fn from(observation: &EnrichedObservation) -> Self {
        let record = &observation.record;
        Self {
            row: record.row,
            timestamp: record.timestamp.clone(),
            observed_on: record.observed_at.map(|dt| dt.date()),
            teacher: record.teacher.clone(),
            service: record.service.clone(),
            program_id: observation.program.id.clone(),
            program_name: observation.program.name.clone(),
            group: record.group.clone(),
            observation_type: record.observation_type.clone(),
            observer: record.observer.clone(),
            period: observation.period.clone(),
            total_points: observation.total_points,
            answered: observation.answered,
            classification: observation.classification,
            classification_label: observation
                .classification
                .map(Classification::label)
                .unwrap_or(""),
        }
    }
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationReport {
    pub filter: ObservationFilter,
    pub scope: RoleScope,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub rubric_items: usize,
    pub status: ReportStatus,
    pub status_label: &'static str,
    pub observations: Vec<ObservationRow>,
    pub services: Vec<ServiceSummary>,
    pub teachers: Vec<TeacherSummary>,
    pub periods: Vec<PeriodSummary>,
    pub observation_classes: Vec<ClassificationShare>,
    pub teacher_classes: Vec<ClassificationShare>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramOption {
    pub id: String,
    pub name: String,
}

/// Values the interactive filters can take, already narrowed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub periods: Vec<String>,
    pub programs: Vec<ProgramOption>,
    pub observation_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherDetail {
    pub teacher: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TeacherSummary>,
    pub observations: Vec<ObservationRow>,
    pub areas: Vec<AreaBreakdown>,
}

/// A single rubric answer as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    pub position: usize,
    pub item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
    pub response: String,
    pub points: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservationDetail {
    pub observation: ObservationRow,
    pub feedback: QualitativeFeedback,
    pub areas: Vec<AreaBreakdown>,
    pub items: Vec<ItemScore>,
}

impl ObservationDetail {
    pub(crate) fn build(
        observation: &EnrichedObservation,
        rubric_items: &[String],
        areas: Vec<AreaBreakdown>,
    ) -> Self {
        let items = observation
            .record
            .responses
            .iter()
            .zip(&observation.points)
            .enumerate()
            .map(|(position, (cell, points))| ItemScore {
                position,
                item: rubric_items
                    .get(position)
                    .cloned()
                    .unwrap_or_else(|| format!("Item {}", position + 1)),
                area: Area::for_item(position),
                response: response_text(cell),
                points: *points,
            })
            .collect();

        Self {
            observation: ObservationRow::from(observation),
            feedback: observation.record.feedback.clone(),
            areas,
            items,
        }
    }
}

fn response_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => value.to_string(),
        Cell::Date(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        Cell::Text(value) => value.clone(),
        Cell::Empty => String::new(),
    }
}
